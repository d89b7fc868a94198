//! Keyword Forecast Consumer API
//!
//! Engine configuration, config loading, and the engine builder.
//!
//! This crate provides:
//! - [`EngineConfig`], loadable from JSON and `KWF_*` environment overrides
//! - [`ForecastEngineBuilder`] for wiring default or custom components
//! - Re-exports from SPI and core for convenience

pub mod builder;
pub mod config;

pub use builder::*;
pub use config::*;

// Re-export from core
pub use keyword_forecast_core::{
    aggregate, breakdown_by_keyword, breakdown_by_match_type, distribution, distribution_of, keyword_seed, rank_by,
    top_performers, CacheConfig, CacheStats, CancellationToken, Competition, EstimatorConfig,
    Fingerprint, ForecastCache, ForecastEngine, HeuristicEstimator, MarketCpc, MatchTypeBander,
    MatchTypeTable, ProportionalAllocator, VarianceTable, DEFAULT_TOP_N,
};

// Re-export traits and models from SPI
pub use keyword_forecast_spi::{
    normalize_keyword_text, Allocation, BiddingConfig, BiddingStrategy, BudgetAllocator,
    CampaignForecast, CampaignRequest, ConfidenceBander, ConfidenceRange, ForecastError,
    ForecastResult, ForecastSource, Keyword, KeywordBreakdown, KeywordForecast, KeywordInput, MatchType,
    MatchTypeBreakdown, MetricDistribution, MetricEstimate, MetricEstimator, MetricKind,
    RankedKeyword, Result,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{ConfigError, EngineConfig, ForecastEngineBuilder};
    pub use keyword_forecast_core::{
        breakdown_by_keyword, breakdown_by_match_type, distribution, top_performers, CacheConfig, CancellationToken,
        ForecastEngine,
    };
    pub use keyword_forecast_spi::{
        BiddingConfig, BiddingStrategy, CampaignRequest, ForecastError, ForecastResult,
        KeywordInput, MatchType, MetricKind, Result,
    };
}
