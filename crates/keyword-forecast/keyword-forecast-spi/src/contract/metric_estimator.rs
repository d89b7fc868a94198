//! Trait for per-keyword metric estimation

use crate::error::Result;
use crate::model::{BiddingConfig, Keyword, MetricEstimate};

/// Produces the point estimate for one keyword.
///
/// Implementations must be deterministic: the same keyword and bidding
/// configuration always yield the same estimate.
pub trait MetricEstimator: Send + Sync {
    fn estimate(&self, keyword: &Keyword, bidding: &BiddingConfig) -> Result<MetricEstimate>;
}
