//! Keyword Forecast Facade
//!
//! High-level API for keyword forecasting. Re-exports all public types
//! from the keyword forecast stack for convenient usage.

// Re-export everything from API (which includes SPI and core)
pub use keyword_forecast_api::*;

// Explicit re-exports for documentation
pub use keyword_forecast_api::prelude;

// Re-export core modules for direct access
pub use keyword_forecast_core::{
    aggregation, allocation, cache, cancel, confidence, engine, estimator, fingerprint, ranking,
};

// Re-export SPI traits
pub use keyword_forecast_spi::{BudgetAllocator, ConfidenceBander, ForecastError, MetricEstimator};
