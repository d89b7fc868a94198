//! Trait for budget-constrained allocation

use crate::error::Result;
use crate::model::{Allocation, MetricEstimate};

/// Fits per-keyword estimates under a campaign budget.
pub trait BudgetAllocator: Send + Sync {
    /// Fails with `InvalidBudget` when `campaign_budget <= 0`.
    fn allocate(&self, estimates: &[MetricEstimate], campaign_budget: f64) -> Result<Allocation>;
}
