use std::collections::HashSet;
use std::fmt;

use crate::generator::{
    order_range, RegionMetrics, AVERAGE_ORDER_VALUE, DELIVERY_DAYS, SHIPPING_COST_PER_ORDER,
};
use crate::region::RegionCatalog;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    pub region_id: String,
    pub msg: String,
}

impl InvariantViolation {
    fn new(region_id: &str, msg: impl Into<String>) -> Self {
        Self {
            region_id: region_id.to_string(),
            msg: msg.into(),
        }
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region {}: {}", self.region_id, self.msg)
    }
}

impl std::error::Error for InvariantViolation {}

pub fn assert_partitions(m: &RegionMetrics) -> Result<(), InvariantViolation> {
    if m.confirmed as u64 + m.cancelled as u64 != m.total_orders as u64 {
        return Err(InvariantViolation::new(
            &m.region_id,
            "confirmed + cancelled != total_orders",
        ));
    }
    if m.delivered as u64 + m.returned as u64 != m.confirmed as u64 {
        return Err(InvariantViolation::new(
            &m.region_id,
            "delivered + returned != confirmed",
        ));
    }
    Ok(())
}

pub fn assert_financials(m: &RegionMetrics) -> Result<(), InvariantViolation> {
    let (aov_lo, aov_hi) = AVERAGE_ORDER_VALUE;
    if m.average_order_value < aov_lo || m.average_order_value > aov_hi {
        return Err(InvariantViolation::new(&m.region_id, "average order value out of range"));
    }
    let (ship_lo, ship_hi) = SHIPPING_COST_PER_ORDER;
    if m.per_order_shipping_cost < ship_lo || m.per_order_shipping_cost > ship_hi {
        return Err(InvariantViolation::new(&m.region_id, "shipping cost per order out of range"));
    }
    if m.revenue != m.delivered as u64 * m.average_order_value as u64 {
        return Err(InvariantViolation::new(
            &m.region_id,
            "revenue != delivered * average_order_value",
        ));
    }
    if m.shipping_cost != m.total_orders as u64 * m.per_order_shipping_cost as u64 {
        return Err(InvariantViolation::new(
            &m.region_id,
            "shipping_cost != total_orders * per_order_shipping_cost",
        ));
    }
    Ok(())
}

pub fn assert_delivery_days(m: &RegionMetrics) -> Result<(), InvariantViolation> {
    let (lo, hi) = DELIVERY_DAYS;
    if m.avg_delivery_days.is_nan() || m.avg_delivery_days < lo || m.avg_delivery_days > hi {
        return Err(InvariantViolation::new(&m.region_id, "avg_delivery_days out of range"));
    }
    Ok(())
}

pub fn assert_order_volume(m: &RegionMetrics, high_volume: bool) -> Result<(), InvariantViolation> {
    let (lo, hi) = order_range(high_volume);
    if m.total_orders < lo || m.total_orders >= hi {
        return Err(InvariantViolation::new(
            &m.region_id,
            format!("total_orders {} outside [{}, {})", m.total_orders, lo, hi),
        ));
    }
    Ok(())
}

/// Record-local checks. Volume class is not known here; see `check_snapshot`.
pub fn check_record(m: &RegionMetrics) -> Result<(), InvariantViolation> {
    assert_partitions(m)?;
    assert_financials(m)?;
    assert_delivery_days(m)?;
    Ok(())
}

/// Full snapshot check against the catalog it was generated from.
pub fn check_snapshot(
    catalog: &RegionCatalog,
    records: &[RegionMetrics],
) -> Result<(), InvariantViolation> {
    if records.len() != catalog.len() {
        return Err(InvariantViolation::new(
            "*",
            format!("{} records for {} regions", records.len(), catalog.len()),
        ));
    }
    let mut seen = HashSet::with_capacity(records.len());
    for (region, m) in catalog.iter().zip(records) {
        // checked before position so a repeated id is reported as such
        if !seen.insert(m.region_id.as_str()) {
            return Err(InvariantViolation::new(&m.region_id, "duplicate region id"));
        }
        if m.region_id != region.code {
            return Err(InvariantViolation::new(
                &m.region_id,
                format!("expected region {} at this position", region.code),
            ));
        }
        check_record(m)?;
        assert_order_volume(m, region.high_volume)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{generate_for_catalog, RegionStatus};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample() -> RegionMetrics {
        RegionMetrics {
            region_id: "16".to_string(),
            name: "Alger".to_string(),
            total_orders: 300,
            confirmed: 240,
            cancelled: 60,
            delivered: 200,
            returned: 40,
            average_order_value: 3000,
            per_order_shipping_cost: 450,
            revenue: 600_000,
            shipping_cost: 135_000,
            avg_delivery_days: 2.5,
            status: RegionStatus::Enabled,
        }
    }

    #[test]
    fn accepts_consistent_record() {
        assert!(check_record(&sample()).is_ok());
        assert!(assert_order_volume(&sample(), true).is_ok());
    }

    #[test]
    fn rejects_broken_partition() {
        let mut m = sample();
        m.cancelled += 1;
        assert!(assert_partitions(&m).is_err());
        let mut m = sample();
        m.returned = 0;
        let err = check_record(&m).unwrap_err();
        assert_eq!(err.region_id, "16");
    }

    #[test]
    fn rejects_revenue_drift() {
        let mut m = sample();
        m.revenue += 1;
        assert!(assert_financials(&m).is_err());
    }

    #[test]
    fn rejects_delivery_days_out_of_range() {
        let mut m = sample();
        m.avg_delivery_days = 4.6;
        assert!(assert_delivery_days(&m).is_err());
        m.avg_delivery_days = f64::NAN;
        assert!(assert_delivery_days(&m).is_err());
    }

    #[test]
    fn rejects_wrong_volume_class() {
        assert!(assert_order_volume(&sample(), false).is_err());
    }

    #[test]
    fn generated_snapshots_pass() {
        let catalog = RegionCatalog::wilayas();
        for seed in 0..20 {
            let records = generate_for_catalog(&catalog, &mut StdRng::seed_from_u64(seed));
            check_snapshot(&catalog, &records).unwrap();
        }
    }

    #[test]
    fn snapshot_order_mismatch_detected() {
        let catalog = RegionCatalog::wilayas();
        let mut records = generate_for_catalog(&catalog, &mut StdRng::seed_from_u64(3));
        records.swap(0, 1);
        assert!(check_snapshot(&catalog, &records).is_err());
        records.pop();
        assert!(check_snapshot(&catalog, &records).is_err());
    }

    #[test]
    fn repeated_region_id_reported_as_duplicate() {
        let catalog = RegionCatalog::wilayas();
        let mut records = generate_for_catalog(&catalog, &mut StdRng::seed_from_u64(4));
        records[1] = records[0].clone();
        let err = check_snapshot(&catalog, &records).unwrap_err();
        assert_eq!(err.region_id, "01");
        assert_eq!(err.msg, "duplicate region id");
    }
}
