//! Derived views over a forecast result

use serde::{Deserialize, Serialize};

use super::{CampaignForecast, Keyword, MatchType, MetricEstimate, MetricKind};

/// One entry of a top-N ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedKeyword {
    /// 1-based position
    pub rank: usize,
    pub keyword: Keyword,
    pub metric: MetricKind,
    pub metric_value: f64,
    pub estimate: MetricEstimate,
}

/// Aggregate of the keywords sharing one match type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchTypeBreakdown {
    pub match_type: MatchType,
    pub keyword_count: usize,
    pub forecast: CampaignForecast,
    /// Percent of campaign impressions
    pub impression_share: f64,
    /// Percent of campaign clicks
    pub click_share: f64,
    /// Percent of campaign cost
    pub cost_share: f64,
    /// Percent of campaign conversions
    pub conversion_share: f64,
}

/// One keyword's share of the campaign totals, in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordBreakdown {
    pub keyword: Keyword,
    pub estimate: MetricEstimate,
    pub impression_share: f64,
    pub click_share: f64,
    pub cost_share: f64,
    pub conversion_share: f64,
}

/// Summary statistics of one metric across keywords with a non-zero value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricDistribution {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub q25: f64,
    pub q75: f64,
}
