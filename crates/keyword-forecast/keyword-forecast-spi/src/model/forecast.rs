//! Forecast result models

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ConfidenceRange, Keyword, MetricEstimate, MetricKind};

/// Campaign-level totals and weighted averages.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CampaignForecast {
    pub total_impressions: u64,
    pub total_clicks: u64,
    pub total_cost: f64,
    pub total_conversions: u64,
    /// total_clicks / total_impressions
    pub avg_ctr: f64,
    /// total_conversions / total_clicks
    pub avg_cvr: f64,
}

/// One keyword's post-allocation estimate with its confidence bands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordForecast {
    pub keyword: Keyword,
    #[serde(flatten)]
    pub estimate: MetricEstimate,
    pub confidence: BTreeMap<MetricKind, ConfidenceRange>,
}

/// Where a forecast result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastSource {
    Computed,
    Cache,
}

impl ForecastSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastSource::Computed => "computed",
            ForecastSource::Cache => "cache",
        }
    }
}

impl fmt::Display for ForecastSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The complete, immutable answer to a campaign request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub keywords: Vec<KeywordForecast>,
    pub campaign_forecast: CampaignForecast,
    pub budget_utilization: f64,
    pub source: ForecastSource,
    pub cached: bool,
    /// Hex SHA-256 of the normalized request
    pub fingerprint: String,
}

impl ForecastResult {
    /// Copy of this result marked as served from the cache.
    pub fn as_cache_hit(&self) -> Self {
        Self {
            source: ForecastSource::Cache,
            cached: true,
            ..self.clone()
        }
    }

    /// Look up a keyword's forecast by normalized text.
    pub fn keyword(&self, text: &str) -> Option<&KeywordForecast> {
        self.keywords.iter().find(|kf| kf.keyword.text() == text)
    }
}
