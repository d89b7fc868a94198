//! Metric identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// The fields of a [`MetricEstimate`](super::MetricEstimate) that can be
/// ranked, banded, or summarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Impressions,
    Clicks,
    Cost,
    Conversions,
    Ctr,
    Cvr,
    Cpc,
    Cpa,
    Revenue,
    Roas,
}

impl MetricKind {
    pub const ALL: [MetricKind; 10] = [
        MetricKind::Impressions,
        MetricKind::Clicks,
        MetricKind::Cost,
        MetricKind::Conversions,
        MetricKind::Ctr,
        MetricKind::Cvr,
        MetricKind::Cpc,
        MetricKind::Cpa,
        MetricKind::Revenue,
        MetricKind::Roas,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Impressions => "impressions",
            MetricKind::Clicks => "clicks",
            MetricKind::Cost => "cost",
            MetricKind::Conversions => "conversions",
            MetricKind::Ctr => "ctr",
            MetricKind::Cvr => "cvr",
            MetricKind::Cpc => "cpc",
            MetricKind::Cpa => "cpa",
            MetricKind::Revenue => "revenue",
            MetricKind::Roas => "roas",
        }
    }

    /// Rates bounded to [0, 1].
    pub fn is_rate(&self) -> bool {
        matches!(self, MetricKind::Ctr | MetricKind::Cvr)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        MetricKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| ForecastError::InvalidMetric(s.to_string()))
    }
}
