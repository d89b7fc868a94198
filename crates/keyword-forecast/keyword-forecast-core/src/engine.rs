//! Forecast pipeline
//!
//! estimate (per keyword, parallel) → allocate → band → aggregate, memoized
//! through the single-flight [`ForecastCache`].

use std::collections::BTreeMap;
use std::sync::Arc;

use keyword_forecast_spi::{
    BudgetAllocator, CampaignRequest, ConfidenceBander, ForecastError, ForecastResult,
    ForecastSource, Keyword, KeywordForecast, MetricEstimate, MetricEstimator, Result,
};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{info, warn};

use crate::aggregation::aggregate;
use crate::allocation::ProportionalAllocator;
use crate::cache::{CacheConfig, CacheStats, ForecastCache};
use crate::cancel::CancellationToken;
use crate::confidence::MatchTypeBander;
use crate::estimator::HeuristicEstimator;
use crate::fingerprint::Fingerprint;

enum Parallelism {
    Sequential,
    Global,
    Pool(ThreadPool),
}

impl Parallelism {
    /// 0 uses rayon's global pool, 1 runs on the calling thread, N > 1 gets a
    /// dedicated pool of N workers.
    fn with_concurrency(concurrency: usize) -> Result<Self> {
        match concurrency {
            0 => Ok(Parallelism::Global),
            1 => Ok(Parallelism::Sequential),
            threads => ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|index| format!("kwforecast-{}", index))
                .build()
                .map(Parallelism::Pool)
                .map_err(|e| ForecastError::Internal(format!("failed to build worker pool: {}", e))),
        }
    }
}

/// Keyword forecasting engine.
///
/// Components are injected as trait objects so tests and callers can swap the
/// estimation, banding, or allocation policy.
pub struct ForecastEngine {
    estimator: Arc<dyn MetricEstimator>,
    bander: Arc<dyn ConfidenceBander>,
    allocator: Arc<dyn BudgetAllocator>,
    cache: ForecastCache,
    parallelism: Parallelism,
}

impl ForecastEngine {
    pub fn new(
        estimator: Arc<dyn MetricEstimator>,
        bander: Arc<dyn ConfidenceBander>,
        allocator: Arc<dyn BudgetAllocator>,
        cache: ForecastCache,
        concurrency: usize,
    ) -> Result<Self> {
        Ok(Self {
            estimator,
            bander,
            allocator,
            cache,
            parallelism: Parallelism::with_concurrency(concurrency)?,
        })
    }

    /// Heuristic estimator, default variance table, proportional allocation,
    /// default cache, rayon's global pool.
    pub fn with_defaults() -> Result<Self> {
        Self::new(
            Arc::new(HeuristicEstimator::default()),
            Arc::new(MatchTypeBander::default()),
            Arc::new(ProportionalAllocator),
            ForecastCache::new(CacheConfig::default())?,
            0,
        )
    }

    /// Forecast a campaign, serving from the cache when possible.
    pub fn forecast(&self, request: &CampaignRequest) -> Result<ForecastResult> {
        self.forecast_with_cancel(request, &CancellationToken::new())
    }

    /// Like [`forecast`](Self::forecast), checking `token` before each keyword
    /// estimate. A cancelled run returns `ForecastError::Cancelled` and stores nothing.
    /// A caller waiting on an identical in-flight request also stops waiting.
    pub fn forecast_with_cancel(
        &self,
        request: &CampaignRequest,
        token: &CancellationToken,
    ) -> Result<ForecastResult> {
        let fingerprint = Fingerprint::of(request);
        self.cache
            .get_or_compute_with_cancel(&fingerprint, token, || {
                self.run(request, &fingerprint, token)
            })
    }

    fn run(
        &self,
        request: &CampaignRequest,
        fingerprint: &Fingerprint,
        token: &CancellationToken,
    ) -> Result<ForecastResult> {
        let keywords = request.keywords();
        let raw = self.estimate_all(keywords, request, token)?;

        if token.is_cancelled() {
            return Err(ForecastError::Cancelled);
        }
        let allocation = self.allocator.allocate(&raw, request.campaign_budget())?;
        if allocation.is_throttled() {
            warn!(
                fingerprint = fingerprint.short(),
                raw_total_cost = allocation.raw_total_cost,
                scale_factor = allocation.scale_factor,
                "raw spend exceeds budget, throttling keywords"
            );
        }

        let keyword_forecasts: Vec<KeywordForecast> = keywords
            .iter()
            .zip(&allocation.estimates)
            .map(|(keyword, estimate)| KeywordForecast {
                keyword: keyword.clone(),
                estimate: *estimate,
                confidence: self
                    .bander
                    .band_all(estimate, keyword.banding_match_type())
                    .into_iter()
                    .collect::<BTreeMap<_, _>>(),
            })
            .collect();
        let campaign_forecast = aggregate(&allocation.estimates);

        info!(
            fingerprint = fingerprint.short(),
            keywords = keyword_forecasts.len(),
            total_cost = campaign_forecast.total_cost,
            budget_utilization = allocation.budget_utilization,
            "forecast computed"
        );

        Ok(ForecastResult {
            keywords: keyword_forecasts,
            campaign_forecast,
            budget_utilization: allocation.budget_utilization,
            source: ForecastSource::Computed,
            cached: false,
            fingerprint: fingerprint.to_string(),
        })
    }

    fn estimate_all(
        &self,
        keywords: &[Keyword],
        request: &CampaignRequest,
        token: &CancellationToken,
    ) -> Result<Vec<MetricEstimate>> {
        let estimate = |keyword: &Keyword| {
            if token.is_cancelled() {
                return Err(ForecastError::Cancelled);
            }
            self.estimator.estimate(keyword, request.bidding())
        };

        match &self.parallelism {
            _ if keywords.len() <= 1 => keywords.iter().map(estimate).collect(),
            Parallelism::Sequential => keywords.iter().map(estimate).collect(),
            Parallelism::Global => keywords.par_iter().map(estimate).collect(),
            Parallelism::Pool(pool) => pool.install(|| keywords.par_iter().map(estimate).collect()),
        }
    }

    pub fn fingerprint(&self, request: &CampaignRequest) -> Fingerprint {
        Fingerprint::of(request)
    }

    pub fn cache(&self) -> &ForecastCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop the cached forecast for `request`, if any.
    pub fn invalidate(&self, request: &CampaignRequest) -> bool {
        self.cache.invalidate(&Fingerprint::of(request))
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn purge_expired(&self) -> usize {
        self.cache.purge_expired()
    }
}

impl std::fmt::Debug for ForecastEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastEngine")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyword_forecast_spi::{BiddingConfig, BiddingStrategy, MatchType, MetricKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn manual(max_cpc: f64) -> BiddingConfig {
        BiddingConfig::new(BiddingStrategy::ManualCpc).with_target(max_cpc)
    }

    /// Fixed estimate per keyword, counting calls
    struct FixedEstimator {
        calls: AtomicUsize,
        cost: f64,
    }

    impl FixedEstimator {
        fn new(cost: f64) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                cost,
            }
        }
    }

    impl MetricEstimator for FixedEstimator {
        fn estimate(&self, keyword: &Keyword, _bidding: &BiddingConfig) -> Result<MetricEstimate> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if keyword.text() == "bad" {
                return Err(ForecastError::InvalidRequest("bad keyword".to_string()));
            }
            Ok(MetricEstimate::from_counts(1000, 100, self.cost, 10, 1000.0))
        }
    }

    fn engine_with(estimator: Arc<FixedEstimator>, concurrency: usize) -> ForecastEngine {
        ForecastEngine::new(
            estimator,
            Arc::new(MatchTypeBander::default()),
            Arc::new(ProportionalAllocator),
            ForecastCache::new(CacheConfig::default()).unwrap(),
            concurrency,
        )
        .unwrap()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let engine = ForecastEngine::with_defaults().unwrap();
        let request =
            CampaignRequest::new(["running shoes", "trail shoes"], 100.0, manual(2.5)).unwrap();

        let result = engine.forecast(&request).unwrap();
        assert_eq!(result.keywords.len(), 2);
        assert!(result.campaign_forecast.total_cost <= 100.0 + 1e-9);
        assert!((0.0..=1.0).contains(&result.budget_utilization));
        assert_eq!(result.source, ForecastSource::Computed);
        assert!(!result.cached);
        assert_eq!(result.fingerprint, engine.fingerprint(&request).to_string());
    }

    #[test]
    fn test_second_call_is_cached_and_identical() {
        let engine = ForecastEngine::with_defaults().unwrap();
        let first = CampaignRequest::new(["running shoes", "trail shoes"], 100.0, manual(2.5)).unwrap();
        let reordered = CampaignRequest::new(["trail shoes", "running shoes"], 100.0, manual(2.5)).unwrap();

        let a = engine.forecast(&first).unwrap();
        let b = engine.forecast(&reordered).unwrap();
        assert!(b.cached);
        assert_eq!(b.source, ForecastSource::Cache);
        assert_eq!(a.campaign_forecast, b.campaign_forecast);
        assert_eq!(a.keywords, b.keywords);
        assert_eq!(engine.cache_stats().hits, 1);
    }

    #[test]
    fn test_totals_are_sums_of_keywords() {
        let engine = ForecastEngine::with_defaults().unwrap();
        let request = CampaignRequest::new(
            ["[running shoes]", "\"trail shoes\"", "shoes", "boots near me"],
            40.0,
            manual(3.0),
        )
        .unwrap();
        let result = engine.forecast(&request).unwrap();

        let clicks: u64 = result.keywords.iter().map(|k| k.estimate.clicks).sum();
        let cost: f64 = result.keywords.iter().map(|k| k.estimate.cost).sum();
        assert_eq!(result.campaign_forecast.total_clicks, clicks);
        assert!((result.campaign_forecast.total_cost - cost).abs() < 1e-9);
        assert!(result.campaign_forecast.total_cost <= 40.0 + 1e-9);

        for kf in &result.keywords {
            assert!(kf.estimate.clicks <= kf.estimate.impressions);
            assert!(kf.estimate.conversions <= kf.estimate.clicks);
        }
    }

    #[test]
    fn test_confidence_follows_match_type() {
        let engine = ForecastEngine::with_defaults().unwrap();
        let request = CampaignRequest::new(["[shoes]", "boots"], 500.0, manual(2.0)).unwrap();
        let result = engine.forecast(&request).unwrap();

        let exact = result.keyword("shoes").unwrap();
        assert_eq!(exact.keyword.match_type(), MatchType::Exact);
        let band = exact.confidence[&MetricKind::Clicks];
        assert_eq!(band.variance_percentage, 0.01);
        assert!((band.upper_bound - exact.estimate.clicks as f64 * 1.01).abs() < 1e-9);

        let broad = result.keyword("boots").unwrap();
        assert_eq!(broad.confidence[&MetricKind::Cost].variance_percentage, 0.05);
        assert_eq!(broad.confidence.len(), MetricKind::ALL.len());
    }

    #[test]
    fn test_throttling_with_injected_estimator() {
        let estimator = Arc::new(FixedEstimator::new(100.0));
        let engine = engine_with(estimator.clone(), 1);
        let request = CampaignRequest::new(["a", "b"], 50.0, manual(1.0)).unwrap();

        let result = engine.forecast(&request).unwrap();
        assert_eq!(estimator.calls.load(Ordering::SeqCst), 2);
        assert!((result.budget_utilization - 1.0).abs() < 1e-12);
        assert!((result.campaign_forecast.total_cost - 50.0).abs() < 1e-9);
        for kf in &result.keywords {
            assert_eq!(kf.estimate.impressions, 1000);
            assert_eq!(kf.estimate.clicks, 25);
        }
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let request = CampaignRequest::new(
            ["running shoes", "trail shoes", "hiking boots", "sandals", "[shoe store]"],
            75.0,
            BiddingConfig::new(BiddingStrategy::TargetCpa).with_target(30.0),
        )
        .unwrap();
        let build = |concurrency| {
            ForecastEngine::new(
                Arc::new(HeuristicEstimator::default()),
                Arc::new(MatchTypeBander::default()),
                Arc::new(ProportionalAllocator),
                ForecastCache::new(CacheConfig::default()).unwrap(),
                concurrency,
            )
            .unwrap()
        };

        let sequential = build(1).forecast(&request).unwrap();
        let pooled = build(4).forecast(&request).unwrap();
        assert_eq!(sequential, pooled);
    }

    #[test]
    fn test_estimator_error_is_not_cached() {
        let estimator = Arc::new(FixedEstimator::new(10.0));
        let engine = engine_with(estimator, 0);
        let request = CampaignRequest::new(["good", "bad"], 50.0, manual(1.0)).unwrap();

        let err = engine.forecast(&request).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidRequest(_)));
        assert!(engine.cache().is_empty());
    }

    #[test]
    fn test_cancelled_forecast() {
        let estimator = Arc::new(FixedEstimator::new(10.0));
        let engine = engine_with(estimator.clone(), 1);
        let request = CampaignRequest::new(["a", "b", "c"], 50.0, manual(1.0)).unwrap();

        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(
            engine.forecast_with_cancel(&request, &token),
            Err(ForecastError::Cancelled)
        );
        assert_eq!(estimator.calls.load(Ordering::SeqCst), 0);
        assert!(engine.cache().is_empty());

        let result = engine.forecast(&request).unwrap();
        assert!(!result.cached);
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let estimator = Arc::new(FixedEstimator::new(10.0));
        let engine = engine_with(estimator.clone(), 1);
        let request = CampaignRequest::new(["a"], 50.0, manual(1.0)).unwrap();

        engine.forecast(&request).unwrap();
        assert!(engine.invalidate(&request));
        assert!(!engine.forecast(&request).unwrap().cached);
        assert_eq!(estimator.calls.load(Ordering::SeqCst), 2);

        engine.clear_cache();
        assert_eq!(engine.cache_stats().entries, 0);
    }
}
