//! Keyword Forecast Core
//!
//! Core implementations for keyword estimation, confidence banding, budget
//! allocation, campaign aggregation, ranking views, and the single-flight
//! forecast cache, wired together by [`ForecastEngine`].

pub mod aggregation;
pub mod allocation;
pub mod cache;
pub mod cancel;
pub mod confidence;
pub mod engine;
pub mod estimator;
pub mod fingerprint;
pub mod ranking;

// Re-export SPI types for implementations
pub use keyword_forecast_spi::{
    normalize_keyword_text, Allocation, BiddingConfig, BiddingStrategy, BudgetAllocator,
    CampaignForecast, CampaignRequest, ConfidenceBander, ConfidenceRange, ForecastError,
    ForecastResult, ForecastSource, Keyword, KeywordBreakdown, KeywordForecast, KeywordInput, MatchType,
    MatchTypeBreakdown, MetricDistribution, MetricEstimate, MetricEstimator, MetricKind,
    RankedKeyword, Result,
};

// Re-export main types
pub use aggregation::aggregate;
pub use allocation::ProportionalAllocator;
pub use cache::{CacheConfig, CacheStats, ForecastCache};
pub use cancel::CancellationToken;
pub use confidence::{MatchTypeBander, VarianceTable};
pub use engine::ForecastEngine;
pub use estimator::{Competition, EstimatorConfig, HeuristicEstimator, MarketCpc, MatchTypeTable};
pub use fingerprint::{keyword_seed, Fingerprint};
pub use ranking::{
    breakdown_by_keyword, breakdown_by_match_type, distribution, distribution_of, rank_by, top_performers, DEFAULT_TOP_N,
};
