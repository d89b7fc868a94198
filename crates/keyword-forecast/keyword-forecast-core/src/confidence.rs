//! Confidence band implementations
//!
//! Bands are symmetric around the point estimate, with a width set by the
//! keyword's match type: broader matching means less certain estimates.

use keyword_forecast_spi::{ConfidenceBander, ConfidenceRange, ForecastError, MatchType, MetricKind, Result};
use serde::{Deserialize, Serialize};

/// Match type to variance coefficient mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarianceTable {
    pub exact: f64,
    pub phrase: f64,
    pub broad: f64,
}

impl Default for VarianceTable {
    fn default() -> Self {
        Self {
            exact: 0.01,
            phrase: 0.03,
            broad: 0.05,
        }
    }
}

impl VarianceTable {
    /// Coefficient for a match type; unknown match types use phrase's.
    pub fn coefficient(&self, match_type: Option<MatchType>) -> f64 {
        match match_type {
            Some(MatchType::Exact) => self.exact,
            Some(MatchType::Broad) => self.broad,
            Some(MatchType::Phrase) | None => self.phrase,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("exact", self.exact), ("phrase", self.phrase), ("broad", self.broad)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ForecastError::InvalidConfig(format!(
                    "variance coefficient for {} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Bander driven by a [`VarianceTable`].
#[derive(Debug, Clone, Default)]
pub struct MatchTypeBander {
    table: VarianceTable,
}

impl MatchTypeBander {
    pub fn new(table: VarianceTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &VarianceTable {
        &self.table
    }

    /// Band a value for a free-form match-type label.
    pub fn band_label(&self, value: f64, match_type: &str, metric: MetricKind) -> ConfidenceRange {
        self.band(value, MatchType::from_label(match_type), metric)
    }
}

impl ConfidenceBander for MatchTypeBander {
    fn band(&self, value: f64, match_type: Option<MatchType>, _metric: MetricKind) -> ConfidenceRange {
        let variance = self.table.coefficient(match_type);
        ConfidenceRange {
            lower_bound: (value * (1.0 - variance)).max(0.0),
            upper_bound: value * (1.0 + variance),
            variance_percentage: variance,
        }
    }
}
