//! Confidence range model

use serde::{Deserialize, Serialize};

/// Uncertainty band around a point estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceRange {
    /// value × (1 − variance), never below zero
    pub lower_bound: f64,
    /// value × (1 + variance)
    pub upper_bound: f64,
    /// Match-type coefficient, e.g. 0.05 for ±5%
    pub variance_percentage: f64,
}

impl ConfidenceRange {
    pub fn contains(&self, value: f64) -> bool {
        self.lower_bound <= value && value <= self.upper_bound
    }

    pub fn width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }
}
