//! Engine builder.

use std::sync::Arc;

use keyword_forecast_core::{
    CacheConfig, EstimatorConfig, ForecastCache, ForecastEngine, HeuristicEstimator,
    MatchTypeBander, ProportionalAllocator, VarianceTable,
};
use keyword_forecast_spi::{BudgetAllocator, ConfidenceBander, MetricEstimator};
use tracing::debug;

use crate::config::{ConfigError, EngineConfig};

/// Builds a [`ForecastEngine`] from an [`EngineConfig`], optionally replacing
/// any of its components.
#[derive(Default)]
pub struct ForecastEngineBuilder {
    config: EngineConfig,
    estimator: Option<Arc<dyn MetricEstimator>>,
    bander: Option<Arc<dyn ConfidenceBander>>,
    allocator: Option<Arc<dyn BudgetAllocator>>,
}

impl ForecastEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn estimator_config(mut self, estimator: EstimatorConfig) -> Self {
        self.config.estimator = estimator;
        self
    }

    pub fn variance(mut self, variance: VarianceTable) -> Self {
        self.config.variance = variance;
        self
    }

    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.config.cache = cache;
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Replace the heuristic estimator.
    pub fn estimator(mut self, estimator: Arc<dyn MetricEstimator>) -> Self {
        self.estimator = Some(estimator);
        self
    }

    /// Replace the variance-table bander.
    pub fn bander(mut self, bander: Arc<dyn ConfidenceBander>) -> Self {
        self.bander = Some(bander);
        self
    }

    /// Replace the proportional allocator.
    pub fn allocator(mut self, allocator: Arc<dyn BudgetAllocator>) -> Self {
        self.allocator = Some(allocator);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn build(self) -> Result<ForecastEngine, ConfigError> {
        self.config.validate()?;
        let config = self.config;

        let estimator: Arc<dyn MetricEstimator> = match self.estimator {
            Some(estimator) => estimator,
            None => Arc::new(HeuristicEstimator::new(config.estimator.clone())?),
        };
        let bander: Arc<dyn ConfidenceBander> = match self.bander {
            Some(bander) => bander,
            None => Arc::new(MatchTypeBander::new(config.variance)),
        };
        let allocator: Arc<dyn BudgetAllocator> = match self.allocator {
            Some(allocator) => allocator,
            None => Arc::new(ProportionalAllocator),
        };

        debug!(
            cache_enabled = config.cache.enabled,
            cache_capacity = config.cache.capacity,
            concurrency = config.concurrency,
            "building forecast engine"
        );

        let engine = ForecastEngine::new(
            estimator,
            bander,
            allocator,
            ForecastCache::new(config.cache)?,
            config.concurrency,
        )?;
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyword_forecast_spi::{BiddingConfig, CampaignRequest, ConfidenceRange, MatchType, MetricKind};

    struct FlatBander;

    impl ConfidenceBander for FlatBander {
        fn band(&self, value: f64, _match_type: Option<MatchType>, _metric: MetricKind) -> ConfidenceRange {
            ConfidenceRange {
                lower_bound: value,
                upper_bound: value,
                variance_percentage: 0.0,
            }
        }
    }

    fn request() -> CampaignRequest {
        CampaignRequest::new(["running shoes"], 100.0, BiddingConfig::default()).unwrap()
    }

    #[test]
    fn test_build_defaults() {
        let engine = ForecastEngineBuilder::new().build().unwrap();
        let result = engine.forecast(&request()).unwrap();
        assert_eq!(result.keywords.len(), 1);
    }

    #[test]
    fn test_custom_bander() {
        let engine = ForecastEngineBuilder::new()
            .bander(Arc::new(FlatBander))
            .build()
            .unwrap();
        let result = engine.forecast(&request()).unwrap();
        let band = result.keywords[0].confidence[&MetricKind::Clicks];
        assert_eq!(band.variance_percentage, 0.0);
    }

    #[test]
    fn test_variance_override() {
        let engine = ForecastEngineBuilder::new()
            .variance(VarianceTable {
                exact: 0.0,
                phrase: 0.1,
                broad: 0.2,
            })
            .build()
            .unwrap();
        let result = engine.forecast(&request()).unwrap();
        assert_eq!(result.keywords[0].confidence[&MetricKind::Cost].variance_percentage, 0.2);
    }

    #[test]
    fn test_disabled_cache() {
        let engine = ForecastEngineBuilder::new()
            .cache(CacheConfig {
                enabled: false,
                ..CacheConfig::default()
            })
            .concurrency(1)
            .build()
            .unwrap();
        engine.forecast(&request()).unwrap();
        assert!(!engine.forecast(&request()).unwrap().cached);
    }

    #[test]
    fn test_invalid_config_fails_build() {
        let err = ForecastEngineBuilder::new()
            .variance(VarianceTable {
                exact: 2.0,
                phrase: 0.03,
                broad: 0.05,
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
