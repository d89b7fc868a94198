//! Keyword Forecast Service Provider Interface
//!
//! Defines the forecasting data model, the error taxonomy, and the traits
//! implemented by estimators, confidence banders, and budget allocators.

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::{BudgetAllocator, ConfidenceBander, MetricEstimator};
pub use error::{ForecastError, Result};
pub use model::{
    normalize_keyword_text, Allocation, BiddingConfig, BiddingStrategy, CampaignForecast,
    CampaignRequest, ConfidenceRange, ForecastResult, ForecastSource, Keyword, KeywordForecast,
    KeywordBreakdown, KeywordInput, MatchType, MatchTypeBreakdown, MetricDistribution, MetricEstimate, MetricKind,
    RankedKeyword,
};
