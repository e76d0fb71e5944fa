use anyhow::{bail, Result};
use serde_json::json;

use ecoma_metrics::config::Config;
use ecoma_metrics::logging::{
    log, log_export, log_ranking, log_snapshot_summary, log_violation, obj, v_str, Domain, Level,
    ProfileScope,
};
use ecoma_metrics::region::RegionCatalog;
use ecoma_metrics::snapshot::{fresh_seed, Snapshot};
use ecoma_metrics::summary::{top_by_orders, top_by_revenue};
use ecoma_metrics::verify::check_snapshot;

fn main() -> Result<()> {
    let cfg = Config::from_env()?;
    let catalog = RegionCatalog::wilayas();
    log(
        Level::Info,
        Domain::Catalog,
        "catalog_loaded",
        obj(&[
            ("regions", json!(catalog.len())),
            ("high_volume", json!(catalog.high_volume().count())),
        ]),
    );

    let seed = cfg.seed.unwrap_or_else(fresh_seed);
    let snapshot = {
        let _scope = ProfileScope::new("generate_snapshot");
        Snapshot::generate(&catalog, seed)?
    };

    if let Err(violation) = check_snapshot(&catalog, &snapshot.records) {
        log_violation(&violation.region_id, &violation.msg);
        bail!("generated snapshot failed verification: {}", violation);
    }

    log_snapshot_summary(snapshot.seed, &snapshot.digest, &snapshot.summary);
    let by_revenue: Vec<(&str, u64)> = top_by_revenue(&snapshot.records, cfg.top_n)
        .into_iter()
        .map(|m| (m.region_id.as_str(), m.revenue))
        .collect();
    log_ranking("revenue", &by_revenue);
    let by_orders: Vec<(&str, u64)> = top_by_orders(&snapshot.records, cfg.top_n)
        .into_iter()
        .map(|m| (m.region_id.as_str(), m.total_orders as u64))
        .collect();
    log_ranking("orders", &by_orders);

    let report = if cfg.enabled_only {
        snapshot.enabled_view()?
    } else {
        snapshot
    };

    match &cfg.out_path {
        Some(path) => {
            let bytes = report.write_to(path, cfg.format)?;
            log_export(cfg.format.as_str(), &path.to_string_lossy(), bytes);
        }
        None => {
            let body = report.render(cfg.format)?;
            println!("{}", body);
            log_export(cfg.format.as_str(), "stdout", body.len());
        }
    }

    log(
        Level::Info,
        Domain::System,
        "done",
        obj(&[("msg", v_str("snapshot report complete"))]),
    );
    Ok(())
}
