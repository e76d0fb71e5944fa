//! Synthetic per-region order metrics.
//!
//! Every count split is integer-safe: one side is floored from a drawn ratio,
//! the other is derived by subtraction, so `confirmed + cancelled == total_orders`
//! and `delivered + returned == confirmed` hold for every record.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::region::{Region, RegionCatalog};

pub const HIGH_VOLUME_ORDERS: (u32, u32) = (200, 600);
pub const STANDARD_ORDERS: (u32, u32) = (20, 120);
pub const CONFIRMATION_RATIO: (f64, f64) = (0.70, 0.95);
pub const DELIVERY_RATIO: (f64, f64) = (0.80, 0.95);
pub const AVERAGE_ORDER_VALUE: (u32, u32) = (2500, 4500);
pub const SHIPPING_COST_PER_ORDER: (u32, u32) = (400, 500);
pub const DELIVERY_DAYS: (f64, f64) = (1.5, 4.5);
pub const ENABLED_PROBABILITY: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionStatus {
    Enabled,
    Disabled,
}

impl RegionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionStatus::Enabled => "enabled",
            RegionStatus::Disabled => "disabled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionMetrics {
    pub region_id: String,
    pub name: String,
    pub total_orders: u32,
    pub confirmed: u32,
    pub cancelled: u32,
    pub delivered: u32,
    pub returned: u32,
    pub average_order_value: u32,
    pub per_order_shipping_cost: u32,
    pub revenue: u64,
    pub shipping_cost: u64,
    pub avg_delivery_days: f64,
    pub status: RegionStatus,
}

impl RegionMetrics {
    pub fn is_enabled(&self) -> bool {
        self.status == RegionStatus::Enabled
    }

    /// Revenue left after shipping. Can go negative for low-delivery regions.
    pub fn net_revenue(&self) -> i64 {
        self.revenue as i64 - self.shipping_cost as i64
    }
}

/// Split `parent` into `(kept, rest)` with `kept = floor(parent * ratio)`.
pub fn split_by_ratio(parent: u32, ratio: f64) -> (u32, u32) {
    let ratio = ratio.clamp(0.0, 1.0);
    let kept = ((parent as f64) * ratio).floor() as u32;
    let kept = kept.min(parent);
    (kept, parent - kept)
}

pub fn order_range(high_volume: bool) -> (u32, u32) {
    if high_volume {
        HIGH_VOLUME_ORDERS
    } else {
        STANDARD_ORDERS
    }
}

/// Generate one record for `region`.
pub fn generate_region<R: Rng + ?Sized>(region: &Region, rng: &mut R) -> RegionMetrics {
    let (lo, hi) = order_range(region.high_volume);
    let total_orders = rng.gen_range(lo..hi);

    let confirmation_ratio = rng.gen_range(CONFIRMATION_RATIO.0..=CONFIRMATION_RATIO.1);
    let (confirmed, cancelled) = split_by_ratio(total_orders, confirmation_ratio);

    let delivery_ratio = rng.gen_range(DELIVERY_RATIO.0..=DELIVERY_RATIO.1);
    let (delivered, returned) = split_by_ratio(confirmed, delivery_ratio);

    let average_order_value = rng.gen_range(AVERAGE_ORDER_VALUE.0..=AVERAGE_ORDER_VALUE.1);
    let revenue = delivered as u64 * average_order_value as u64;

    let per_order_shipping_cost =
        rng.gen_range(SHIPPING_COST_PER_ORDER.0..=SHIPPING_COST_PER_ORDER.1);
    let shipping_cost = total_orders as u64 * per_order_shipping_cost as u64;

    // one decimal, still inside the drawn bounds
    let days: f64 = rng.gen_range(DELIVERY_DAYS.0..=DELIVERY_DAYS.1);
    let avg_delivery_days = ((days * 10.0).round() / 10.0).clamp(DELIVERY_DAYS.0, DELIVERY_DAYS.1);

    let status = if rng.gen_bool(ENABLED_PROBABILITY) {
        RegionStatus::Enabled
    } else {
        RegionStatus::Disabled
    };

    RegionMetrics {
        region_id: region.code.to_string(),
        name: region.name.to_string(),
        total_orders,
        confirmed,
        cancelled,
        delivered,
        returned,
        average_order_value,
        per_order_shipping_cost,
        revenue,
        shipping_cost,
        avg_delivery_days,
        status,
    }
}

/// One record per region, in input order.
///
/// The slice is not validated: callers must pass distinct region codes.
/// Prefer `generate_for_catalog`, whose catalog guarantees uniqueness.
pub fn generate_region_metrics<R: Rng + ?Sized>(regions: &[Region], rng: &mut R) -> Vec<RegionMetrics> {
    regions.iter().map(|region| generate_region(region, &mut *rng)).collect()
}

/// One record per catalog region, in catalog order. Region ids are unique.
pub fn generate_for_catalog<R: Rng + ?Sized>(catalog: &RegionCatalog, rng: &mut R) -> Vec<RegionMetrics> {
    generate_region_metrics(catalog.regions(), rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pair() -> Vec<Region> {
        vec![Region::new("16", "Alger", true), Region::new("01", "Adrar", false)]
    }

    #[test]
    fn split_is_exact() {
        for parent in [0u32, 1, 7, 119, 599] {
            for ratio in [0.0, 0.70, 0.8333, 0.95, 1.0] {
                let (kept, rest) = split_by_ratio(parent, ratio);
                assert_eq!(kept + rest, parent);
            }
        }
        assert_eq!(split_by_ratio(100, 0.75), (75, 25));
        assert_eq!(split_by_ratio(3, 0.95), (2, 1));
    }

    #[test]
    fn split_clamps_out_of_range_ratio() {
        assert_eq!(split_by_ratio(10, 1.5), (10, 0));
        assert_eq!(split_by_ratio(10, -0.2), (0, 10));
    }

    #[test]
    fn one_record_per_region_in_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let records = generate_region_metrics(&pair(), &mut rng);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].region_id, "16");
        assert_eq!(records[1].region_id, "01");
    }

    #[test]
    fn partitions_hold_across_seeds() {
        let catalog = RegionCatalog::wilayas();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            for m in generate_for_catalog(&catalog, &mut rng) {
                assert_eq!(m.confirmed + m.cancelled, m.total_orders, "{}", m.region_id);
                assert_eq!(m.delivered + m.returned, m.confirmed, "{}", m.region_id);
                assert_eq!(m.revenue, m.delivered as u64 * m.average_order_value as u64);
                assert_eq!(m.shipping_cost, m.total_orders as u64 * m.per_order_shipping_cost as u64);
                assert!(m.avg_delivery_days >= 1.5 && m.avg_delivery_days <= 4.5);
            }
        }
    }

    #[test]
    fn order_ranges_follow_volume_class() {
        let catalog = RegionCatalog::wilayas();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let records = generate_for_catalog(&catalog, &mut rng);
            for (region, m) in catalog.iter().zip(records.iter()) {
                let (lo, hi) = order_range(region.high_volume);
                assert!(m.total_orders >= lo && m.total_orders < hi, "{} -> {}", region.code, m.total_orders);
            }
        }
    }

    #[test]
    fn ratios_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let region = Region::new("31", "Oran", true);
        for _ in 0..500 {
            let m = generate_region(&region, &mut rng);
            let confirmation = m.confirmed as f64 / m.total_orders as f64;
            assert!(confirmation <= 0.95 + 1e-9);
            // flooring can only lower the ratio by less than one order
            assert!(confirmation > 0.70 - 1.0 / m.total_orders as f64);
        }
    }

    #[test]
    fn same_seed_same_records() {
        let catalog = RegionCatalog::wilayas();
        let a = generate_for_catalog(&catalog, &mut StdRng::seed_from_u64(42));
        let b = generate_for_catalog(&catalog, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&RegionStatus::Disabled).unwrap();
        assert_eq!(json, "\"disabled\"");
    }

    #[test]
    fn record_uses_camel_case_fields() {
        let mut rng = StdRng::seed_from_u64(1);
        let m = generate_region(&Region::new("09", "Blida", true), &mut rng);
        let value = serde_json::to_value(&m).unwrap();
        assert!(value.get("regionId").is_some());
        assert!(value.get("totalOrders").is_some());
        assert!(value.get("avgDeliveryDays").is_some());
    }
}
