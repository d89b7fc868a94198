//! Forecast error types

use thiserror::Error;

/// Errors that can occur while validating or computing a forecast.
///
/// Every user-facing variant is an input-validation failure: nothing is
/// retried and nothing is cached when one is returned. The type is `Clone`
/// so that callers coalesced onto one in-flight computation can all receive
/// its outcome.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Empty keyword list, or every keyword empty after normalization
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Campaign budget is not a positive amount
    #[error("Invalid budget: campaign budget must be positive, got {0}")]
    InvalidBudget(f64),

    /// Bad bidding target or unrecognized strategy identifier
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Ranking or breakdown requested on an unsupported metric name
    #[error("Invalid metric '{0}': expected one of impressions, clicks, cost, conversions, ctr, cvr, cpc, cpa, revenue, roas")]
    InvalidMetric(String),

    /// The caller abandoned the request before the pipeline completed
    #[error("Forecast cancelled before completion")]
    Cancelled,

    /// Engine-side fault that does not stem from the request
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ForecastError {
    /// Whether the error stems from invalid caller input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ForecastError::InvalidRequest(_)
                | ForecastError::InvalidBudget(_)
                | ForecastError::InvalidConfig(_)
                | ForecastError::InvalidMetric(_)
        )
    }
}
