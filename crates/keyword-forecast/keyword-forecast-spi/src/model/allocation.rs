//! Budget allocation outcome

use serde::{Deserialize, Serialize};

use super::MetricEstimate;

/// Estimates after budget throttling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Adjusted estimates, in input order
    pub estimates: Vec<MetricEstimate>,
    /// min(raw_total_cost, budget) / budget
    pub budget_utilization: f64,
    /// Sum of pre-allocation costs
    pub raw_total_cost: f64,
    /// Factor applied to clicks, cost, and conversions (1.0 when unthrottled)
    pub scale_factor: f64,
}

impl Allocation {
    pub fn is_throttled(&self) -> bool {
        self.scale_factor < 1.0
    }
}
