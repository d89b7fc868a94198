//! Per-keyword metric estimate

use serde::{Deserialize, Serialize};

use super::MetricKind;

/// Divide, yielding 0 when the denominator is 0.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Point estimates for a single keyword.
///
/// Always built through [`MetricEstimate::from_counts`], which enforces
/// `clicks <= impressions` and `conversions <= clicks` and derives every rate
/// from the counts, so the derived fields can never drift from them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricEstimate {
    pub impressions: u64,
    pub clicks: u64,
    pub cost: f64,
    pub conversions: u64,
    pub revenue: f64,
    pub ctr: f64,
    pub cvr: f64,
    pub cpc: f64,
    pub cpa: f64,
    pub roas: f64,
}

impl MetricEstimate {
    pub fn from_counts(
        impressions: u64,
        clicks: u64,
        cost: f64,
        conversions: u64,
        revenue: f64,
    ) -> Self {
        let clicks = clicks.min(impressions);
        let conversions = conversions.min(clicks);
        let cost = if cost.is_finite() { cost.max(0.0) } else { 0.0 };
        let revenue = if revenue.is_finite() { revenue.max(0.0) } else { 0.0 };

        Self {
            impressions,
            clicks,
            cost,
            conversions,
            revenue,
            ctr: ratio(clicks as f64, impressions as f64),
            cvr: ratio(conversions as f64, clicks as f64),
            cpc: ratio(cost, clicks as f64),
            cpa: ratio(cost, conversions as f64),
            roas: ratio(revenue, cost),
        }
    }

    /// Value of the named metric as a float.
    pub fn value(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::Impressions => self.impressions as f64,
            MetricKind::Clicks => self.clicks as f64,
            MetricKind::Cost => self.cost,
            MetricKind::Conversions => self.conversions as f64,
            MetricKind::Ctr => self.ctr,
            MetricKind::Cvr => self.cvr,
            MetricKind::Cpc => self.cpc,
            MetricKind::Cpa => self.cpa,
            MetricKind::Revenue => self.revenue,
            MetricKind::Roas => self.roas,
        }
    }

    /// Revenue attributed to a single conversion (0 without conversions).
    pub fn revenue_per_conversion(&self) -> f64 {
        ratio(self.revenue, self.conversions as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_rates() {
        let estimate = MetricEstimate::from_counts(1000, 50, 100.0, 5, 500.0);
        assert!((estimate.ctr - 0.05).abs() < 1e-12);
        assert!((estimate.cvr - 0.10).abs() < 1e-12);
        assert!((estimate.cpc - 2.0).abs() < 1e-12);
        assert!((estimate.cpa - 20.0).abs() < 1e-12);
        assert!((estimate.roas - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_denominators_are_zero() {
        let estimate = MetricEstimate::from_counts(0, 0, 0.0, 0, 0.0);
        assert_eq!(estimate.ctr, 0.0);
        assert_eq!(estimate.cvr, 0.0);
        assert_eq!(estimate.cpc, 0.0);
        assert_eq!(estimate.cpa, 0.0);
        assert_eq!(estimate.roas, 0.0);
    }

    #[test]
    fn test_counts_are_clamped() {
        let estimate = MetricEstimate::from_counts(10, 20, 5.0, 30, 0.0);
        assert_eq!(estimate.clicks, 10);
        assert_eq!(estimate.conversions, 10);
        assert!(estimate.ctr <= 1.0);
        assert!(estimate.cvr <= 1.0);
    }

    #[test]
    fn test_negative_money_clamped() {
        let estimate = MetricEstimate::from_counts(10, 1, -4.0, 0, f64::NAN);
        assert_eq!(estimate.cost, 0.0);
        assert_eq!(estimate.revenue, 0.0);
    }

    #[test]
    fn test_value_lookup() {
        let estimate = MetricEstimate::from_counts(1000, 50, 100.0, 5, 500.0);
        assert_eq!(estimate.value(MetricKind::Impressions), 1000.0);
        assert_eq!(estimate.value(MetricKind::Revenue), 500.0);
        assert_eq!(estimate.revenue_per_conversion(), 100.0);
    }
}
