//! Contract module containing trait definitions for forecast operations

mod budget_allocator;
mod confidence_bander;
mod metric_estimator;

pub use budget_allocator::BudgetAllocator;
pub use confidence_bander::ConfidenceBander;
pub use metric_estimator::MetricEstimator;
