//! Generates many snapshots from consecutive seeds and reports how the
//! drawn statistics settle. Prints one CSV row per trial on stdout.

use anyhow::{bail, Result};
use serde_json::json;

use ecoma_metrics::config::Config;
use ecoma_metrics::generator::{RegionMetrics, ENABLED_PROBABILITY};
use ecoma_metrics::logging::{log, log_violation, obj, v_num, Domain, Level};
use ecoma_metrics::region::RegionCatalog;
use ecoma_metrics::snapshot::Snapshot;
use ecoma_metrics::verify::check_snapshot;

/// Verify one trial, logging the violation with its seed when it fails.
fn trial_passes(catalog: &RegionCatalog, seed: u64, records: &[RegionMetrics]) -> bool {
    match check_snapshot(catalog, records) {
        Ok(()) => true,
        Err(violation) => {
            log_violation(&violation.region_id, &format!("seed {}: {}", seed, violation.msg));
            false
        }
    }
}

fn main() -> Result<()> {
    let cfg = Config::from_env()?;
    let base_seed = cfg.seed.unwrap_or(42);
    let catalog = RegionCatalog::wilayas();

    let mut regions = 0u64;
    let mut enabled = 0u64;
    let mut violations = 0u64;

    println!("seed,regions,enabled,total_orders,revenue,confirmation_rate,delivery_rate,digest");
    for i in 0..cfg.trials as u64 {
        let seed = base_seed.wrapping_add(i);
        let snap = Snapshot::generate(&catalog, seed)?;
        if !trial_passes(&catalog, seed, &snap.records) {
            violations += 1;
        }
        let s = &snap.summary;
        regions += s.regions as u64;
        enabled += s.enabled_regions as u64;
        println!(
            "{},{},{},{},{},{:.4},{:.4},{}",
            seed,
            s.regions,
            s.enabled_regions,
            s.total_orders,
            s.revenue,
            s.confirmation_rate,
            s.delivery_rate,
            &snap.digest[..12]
        );
    }

    let share = if regions == 0 { 0.0 } else { enabled as f64 / regions as f64 };
    log(
        Level::Info,
        Domain::Generator,
        "trials_summary",
        obj(&[
            ("trials", json!(cfg.trials)),
            ("base_seed", json!(base_seed)),
            ("enabled_share", v_num(share)),
            ("expected_share", v_num(ENABLED_PROBABILITY)),
            ("violations", json!(violations)),
        ]),
    );
    if violations > 0 {
        bail!("{} of {} trials failed verification", violations, cfg.trials);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_trial_passes() {
        let catalog = RegionCatalog::wilayas();
        let snap = Snapshot::generate(&catalog, 3).unwrap();
        assert!(trial_passes(&catalog, 3, &snap.records));
    }

    #[test]
    fn broken_trial_is_reported() {
        let catalog = RegionCatalog::wilayas();
        let mut snap = Snapshot::generate(&catalog, 3).unwrap();
        snap.records[2].cancelled += 1;
        assert!(!trial_passes(&catalog, 3, &snap.records));
    }
}
