use anyhow::{bail, Result};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Csv,
}

impl ReportFormat {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            other => bail!("unknown report format {:?} (expected json or csv)", other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Fixed seed for reproducible snapshots. None draws a fresh one.
    pub seed: Option<u64>,
    pub format: ReportFormat,
    pub out_path: Option<PathBuf>,
    pub top_n: usize,
    pub enabled_only: bool,
    pub trials: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            format: ReportFormat::Json,
            out_path: None,
            top_n: 5,
            enabled_only: false,
            trials: 200,
        }
    }
}

fn flag(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable numbers fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let format = match lookup("REPORT_FORMAT") {
            Some(raw) => ReportFormat::parse(&raw)?,
            None => defaults.format,
        };
        Ok(Self {
            seed: lookup("SEED").and_then(|v| v.trim().parse().ok()),
            format,
            out_path: lookup("REPORT_OUT")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            top_n: lookup("TOP_N").and_then(|v| v.trim().parse().ok()).unwrap_or(defaults.top_n),
            enabled_only: lookup("ENABLED_ONLY").map(|v| flag(&v)).unwrap_or(defaults.enabled_only),
            trials: lookup("TRIALS").and_then(|v| v.trim().parse().ok()).unwrap_or(defaults.trials),
        })
    }
}
