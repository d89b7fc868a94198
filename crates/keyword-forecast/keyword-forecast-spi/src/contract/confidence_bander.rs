//! Trait for confidence band computation

use crate::model::{ConfidenceRange, MatchType, MetricEstimate, MetricKind};

/// Wraps a point estimate in lower/upper bounds.
///
/// `match_type` is `None` when the caller's label was not a recognized match
/// type; implementations fall back to a default coefficient.
pub trait ConfidenceBander: Send + Sync {
    fn band(&self, value: f64, match_type: Option<MatchType>, metric: MetricKind) -> ConfidenceRange;

    /// Band every metric of an estimate.
    fn band_all(
        &self,
        estimate: &MetricEstimate,
        match_type: Option<MatchType>,
    ) -> Vec<(MetricKind, ConfidenceRange)> {
        MetricKind::ALL
            .iter()
            .map(|&kind| (kind, self.band(estimate.value(kind), match_type, kind)))
            .collect()
    }
}
