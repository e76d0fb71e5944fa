//! A complete generated snapshot: records, summary, and replay metadata.

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use crate::config::ReportFormat;
use crate::generator::{generate_for_catalog, RegionMetrics};
use crate::logging::ts_now;
use crate::region::RegionCatalog;
use crate::summary::{enabled_only, SnapshotSummary};

pub const CSV_COLUMNS: [&str; 13] = [
    "region_id",
    "name",
    "total_orders",
    "confirmed",
    "cancelled",
    "delivered",
    "returned",
    "average_order_value",
    "per_order_shipping_cost",
    "revenue",
    "shipping_cost",
    "avg_delivery_days",
    "status",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub generated_at: String,
    pub seed: u64,
    /// Set when disabled regions were dropped from `records`.
    #[serde(default)]
    pub enabled_only: bool,
    /// SHA-256 (hex) over the full record set the seed generates. Replaying
    /// `seed` reproduces it whether or not this snapshot is filtered.
    pub digest: String,
    /// SHA-256 (hex) over the `records` actually carried here.
    pub content_digest: String,
    pub summary: SnapshotSummary,
    pub records: Vec<RegionMetrics>,
}

/// A seed from OS entropy, recorded in the snapshot so the run can be replayed.
pub fn fresh_seed() -> u64 {
    rand::thread_rng().gen()
}

pub fn records_digest(records: &[RegionMetrics]) -> Result<String> {
    let bytes = serde_json::to_vec(records).context("serialize records for digest")?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

impl Snapshot {
    pub fn generate(catalog: &RegionCatalog, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let records = generate_for_catalog(catalog, &mut rng);
        Self::from_records(seed, records)
    }

    pub fn from_records(seed: u64, records: Vec<RegionMetrics>) -> Result<Self> {
        let digest = records_digest(&records)?;
        let summary = SnapshotSummary::from_records(&records);
        Ok(Self {
            generated_at: ts_now(),
            seed,
            enabled_only: false,
            content_digest: digest.clone(),
            digest,
            summary,
            records,
        })
    }

    /// Disabled regions dropped, summary and content digest recomputed.
    /// Seed and generation digest are kept so the view can be replayed.
    pub fn enabled_view(&self) -> Result<Self> {
        let mut view = Self::from_records(self.seed, enabled_only(&self.records))?;
        view.generated_at = self.generated_at.clone();
        view.enabled_only = true;
        view.digest = self.digest.clone();
        Ok(view)
    }

    /// Check that the digests agree with the carried records.
    pub fn verify_digest(&self) -> Result<()> {
        let actual = records_digest(&self.records)?;
        if actual != self.content_digest {
            bail!(
                "content digest mismatch: recorded {} computed {}",
                self.content_digest,
                actual
            );
        }
        if !self.enabled_only && self.digest != self.content_digest {
            bail!("unfiltered snapshot has digest {} but content digest {}", self.digest, actual);
        }
        Ok(())
    }

    /// Regenerate from the recorded seed and check this snapshot against it.
    pub fn verify_replay(&self, catalog: &RegionCatalog) -> Result<()> {
        let replay = Self::generate(catalog, self.seed)?;
        if replay.digest != self.digest {
            bail!("seed {} replays to digest {}, recorded {}", self.seed, replay.digest, self.digest);
        }
        let expected = if self.enabled_only {
            enabled_only(&replay.records)
        } else {
            replay.records
        };
        if expected != self.records {
            bail!("records differ from seed {} replay", self.seed);
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialize snapshot")
    }

    /// Parse and reject snapshots whose records no longer match their digest.
    pub fn from_json(raw: &str) -> Result<Self> {
        let snap: Snapshot = serde_json::from_str(raw).context("parse snapshot json")?;
        snap.verify_digest()?;
        Ok(snap)
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str(&CSV_COLUMNS.join(","));
        out.push('\n');
        for m in &self.records {
            let row = [
                csv_field(&m.region_id),
                csv_field(&m.name),
                m.total_orders.to_string(),
                m.confirmed.to_string(),
                m.cancelled.to_string(),
                m.delivered.to_string(),
                m.returned.to_string(),
                m.average_order_value.to_string(),
                m.per_order_shipping_cost.to_string(),
                m.revenue.to_string(),
                m.shipping_cost.to_string(),
                format!("{:.1}", m.avg_delivery_days),
                m.status.as_str().to_string(),
            ];
            out.push_str(&row.join(","));
            out.push('\n');
        }
        out
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => self.to_json(),
            ReportFormat::Csv => Ok(self.to_csv()),
        }
    }

    /// Write the rendered report, creating parent directories. Returns bytes written.
    pub fn write_to(&self, path: &Path, format: ReportFormat) -> Result<usize> {
        let body = self.render(format)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(path, &body).with_context(|| format!("write {}", path.display()))?;
        Ok(body.len())
    }
}

fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}
