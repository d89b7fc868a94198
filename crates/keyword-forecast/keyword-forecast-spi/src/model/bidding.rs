//! Bidding configuration model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// Bidding strategy identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiddingStrategy {
    /// Advertiser-set maximum CPC (target is the max CPC, optional)
    ManualCpc,
    /// Target cost per acquisition (target required)
    TargetCpa,
    /// Target return on ad spend in percent, e.g. 400 = 400% (target required)
    TargetRoas,
    /// Spend the budget for the most clicks (target is a CPC ceiling, optional)
    MaximizeClicks,
    /// Target impression share in percent, (0, 100] (target required)
    #[serde(alias = "target_impression_share")]
    ImpressionShare,
}

impl Default for BiddingStrategy {
    fn default() -> Self {
        BiddingStrategy::ManualCpc
    }
}

impl BiddingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BiddingStrategy::ManualCpc => "manual_cpc",
            BiddingStrategy::TargetCpa => "target_cpa",
            BiddingStrategy::TargetRoas => "target_roas",
            BiddingStrategy::MaximizeClicks => "maximize_clicks",
            BiddingStrategy::ImpressionShare => "impression_share",
        }
    }

    /// Whether the strategy is meaningless without a numeric target.
    pub fn requires_target(&self) -> bool {
        matches!(
            self,
            BiddingStrategy::TargetCpa
                | BiddingStrategy::TargetRoas
                | BiddingStrategy::ImpressionShare
        )
    }
}

impl fmt::Display for BiddingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BiddingStrategy {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual_cpc" => Ok(BiddingStrategy::ManualCpc),
            "target_cpa" => Ok(BiddingStrategy::TargetCpa),
            "target_roas" => Ok(BiddingStrategy::TargetRoas),
            "maximize_clicks" => Ok(BiddingStrategy::MaximizeClicks),
            "impression_share" | "target_impression_share" => Ok(BiddingStrategy::ImpressionShare),
            other => Err(ForecastError::InvalidConfig(format!(
                "unsupported bidding strategy '{}'",
                other
            ))),
        }
    }
}

/// Bidding and targeting parameters of a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiddingConfig {
    pub strategy: BiddingStrategy,
    /// Max CPC, target CPA, target ROAS %, or impression-share %, per strategy
    #[serde(default)]
    pub target: Option<f64>,
    #[serde(default = "default_geo")]
    pub geo: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_geo() -> String {
    "US".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for BiddingConfig {
    fn default() -> Self {
        Self {
            strategy: BiddingStrategy::default(),
            target: None,
            geo: default_geo(),
            language: default_language(),
        }
    }
}

impl BiddingConfig {
    pub fn new(strategy: BiddingStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn with_target(mut self, target: f64) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_geo(mut self, geo: impl Into<String>) -> Self {
        self.geo = geo.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Geo and language codes in the canonical form used for hashing and lookups.
    pub fn normalized(&self) -> Self {
        Self {
            strategy: self.strategy,
            target: self.target,
            geo: self.geo.trim().to_ascii_uppercase(),
            language: self.language.trim().to_ascii_lowercase(),
        }
    }

    /// Check the numeric target against the strategy.
    pub fn validate(&self) -> Result<()> {
        match self.target {
            Some(target) if !target.is_finite() || target <= 0.0 => {
                return Err(ForecastError::InvalidConfig(format!(
                    "{} target must be a positive number, got {}",
                    self.strategy, target
                )));
            }
            None if self.strategy.requires_target() => {
                return Err(ForecastError::InvalidConfig(format!(
                    "{} requires a target value",
                    self.strategy
                )));
            }
            _ => {}
        }

        if let (BiddingStrategy::ImpressionShare, Some(share)) = (self.strategy, self.target) {
            if share > 100.0 {
                return Err(ForecastError::InvalidConfig(format!(
                    "impression share target is a percentage in (0, 100], got {}",
                    share
                )));
            }
        }

        Ok(())
    }
}
