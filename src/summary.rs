//! Snapshot-level KPIs and rankings shown on the dashboard overview.

use serde::{Deserialize, Serialize};

use crate::generator::RegionMetrics;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub regions: usize,
    pub enabled_regions: usize,
    pub total_orders: u64,
    pub confirmed: u64,
    pub cancelled: u64,
    pub delivered: u64,
    pub returned: u64,
    pub revenue: u64,
    pub shipping_cost: u64,
    pub net_revenue: i64,
    pub confirmation_rate: f64,
    pub delivery_rate: f64,
    pub return_rate: f64,
    pub mean_delivery_days: f64,
}

fn rate(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl SnapshotSummary {
    pub fn from_records(records: &[RegionMetrics]) -> Self {
        let mut s = SnapshotSummary {
            regions: records.len(),
            ..Default::default()
        };
        let mut days_sum = 0.0;
        for m in records {
            if m.is_enabled() {
                s.enabled_regions += 1;
            }
            s.total_orders += m.total_orders as u64;
            s.confirmed += m.confirmed as u64;
            s.cancelled += m.cancelled as u64;
            s.delivered += m.delivered as u64;
            s.returned += m.returned as u64;
            s.revenue += m.revenue;
            s.shipping_cost += m.shipping_cost;
            days_sum += m.avg_delivery_days;
        }
        s.net_revenue = s.revenue as i64 - s.shipping_cost as i64;
        s.confirmation_rate = rate(s.confirmed, s.total_orders);
        s.delivery_rate = rate(s.delivered, s.confirmed);
        s.return_rate = rate(s.returned, s.confirmed);
        s.mean_delivery_days = if records.is_empty() {
            0.0
        } else {
            days_sum / records.len() as f64
        };
        s
    }

    pub fn enabled_share(&self) -> f64 {
        rate(self.enabled_regions as u64, self.regions as u64)
    }
}

fn top_by<K: Ord>(records: &[RegionMetrics], n: usize, key: impl Fn(&RegionMetrics) -> K) -> Vec<&RegionMetrics> {
    let mut ranked: Vec<&RegionMetrics> = records.iter().collect();
    // stable sort keeps input order among ties
    ranked.sort_by(|a, b| key(b).cmp(&key(a)));
    ranked.truncate(n);
    ranked
}

pub fn top_by_revenue(records: &[RegionMetrics], n: usize) -> Vec<&RegionMetrics> {
    top_by(records, n, |m| m.revenue)
}

pub fn top_by_orders(records: &[RegionMetrics], n: usize) -> Vec<&RegionMetrics> {
    top_by(records, n, |m| m.total_orders)
}

pub fn enabled_only(records: &[RegionMetrics]) -> Vec<RegionMetrics> {
    records.iter().filter(|m| m.is_enabled()).cloned().collect()
}
