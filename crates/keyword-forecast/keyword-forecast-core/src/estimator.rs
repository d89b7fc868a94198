//! Heuristic metric estimator
//!
//! Turns keyword text and bidding parameters into a daily point estimate:
//!
//! 1. monthly volume from text shape (length band, modifier words, long tail)
//! 2. daily auctions = monthly / 30 × match-type × geo × language multipliers
//! 3. impressions = auctions × participation (or impression-share target)
//! 4. CTR and CVR from base rates with a per-word specificity uplift
//! 5. CPC from the bidding strategy and a competition-banded market CPC
//! 6. clicks, conversions, cost, and revenue from the above
//!
//! Volume, CTR, and CVR each take one multiplicative jitter drawn from an RNG
//! seeded by [`keyword_seed`], so estimates are reproducible.

use std::collections::BTreeMap;

use keyword_forecast_spi::{
    BiddingConfig, BiddingStrategy, ForecastError, Keyword, MatchType, MetricEstimate,
    MetricEstimator, Result,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fingerprint::keyword_seed;

const DAYS_PER_MONTH: f64 = 30.0;

/// A value per match type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchTypeTable {
    pub exact: f64,
    pub phrase: f64,
    pub broad: f64,
}

impl MatchTypeTable {
    pub fn get(&self, match_type: MatchType) -> f64 {
        match match_type {
            MatchType::Exact => self.exact,
            MatchType::Phrase => self.phrase,
            MatchType::Broad => self.broad,
        }
    }
}

/// Auction competition level inferred from keyword shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Competition {
    Low,
    Medium,
    High,
}

impl Competition {
    /// Short single words are contested; three or more words are long tail.
    pub fn of(keyword: &Keyword) -> Self {
        let words = keyword.word_count();
        if words == 1 && keyword.text().chars().count() <= 6 {
            Competition::High
        } else if words >= 3 {
            Competition::Low
        } else {
            Competition::Medium
        }
    }
}

/// Market CPC per competition level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketCpc {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl MarketCpc {
    pub fn get(&self, competition: Competition) -> f64 {
        match competition {
            Competition::Low => self.low,
            Competition::Medium => self.medium,
            Competition::High => self.high,
        }
    }
}

/// Tunables of [`HeuristicEstimator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Monthly searches for texts of 1..=N characters (index 0 is 1 char)
    pub length_volume: Vec<f64>,
    /// Monthly searches for texts longer than `length_volume` covers
    pub long_text_volume: f64,
    pub high_volume_words: Vec<String>,
    pub high_volume_multiplier: f64,
    pub business_terms: Vec<String>,
    pub business_multiplier: f64,
    pub two_word_factor: f64,
    pub multi_word_factor: f64,
    pub match_volume: MatchTypeTable,
    /// Relative CPC change per match type, e.g. 0.10 = +10%
    pub match_cpc_impact: MatchTypeTable,
    pub geo_multipliers: BTreeMap<String, f64>,
    pub default_geo_multiplier: f64,
    pub language_multipliers: BTreeMap<String, f64>,
    pub default_language_multiplier: f64,
    /// Share of auctions that turn into impressions
    pub participation_rate: f64,
    pub market_cpc: MarketCpc,
    pub base_ctr: f64,
    pub ctr_word_uplift: f64,
    pub max_ctr: f64,
    pub base_cvr: f64,
    pub cvr_word_uplift: f64,
    pub max_cvr: f64,
    /// Half-width of the multiplicative jitter, 0 disables it
    pub jitter: f64,
    pub avg_order_value: f64,
    /// Maximize-clicks bids this fraction of market CPC
    pub maximize_clicks_discount: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        let words = |list: &[&str]| list.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        let table = |list: &[(&str, f64)]| {
            list.iter()
                .map(|(code, value)| (code.to_string(), *value))
                .collect::<BTreeMap<_, _>>()
        };

        Self {
            length_volume: vec![
                500_000.0, 200_000.0, 100_000.0, 80_000.0, 60_000.0, 40_000.0, 25_000.0,
                15_000.0, 10_000.0, 8_000.0,
            ],
            long_text_volume: 5_000.0,
            high_volume_words: words(&[
                "near", "me", "best", "cheap", "affordable", "local", "reviews", "services",
                "company", "business",
            ]),
            high_volume_multiplier: 2.0,
            business_terms: words(&["service", "company", "business", "professional", "expert", "specialist"]),
            business_multiplier: 1.5,
            two_word_factor: 0.7,
            multi_word_factor: 0.3,
            match_volume: MatchTypeTable {
                exact: 0.6,
                phrase: 0.8,
                broad: 1.2,
            },
            match_cpc_impact: MatchTypeTable {
                exact: 0.10,
                phrase: 0.0,
                broad: -0.10,
            },
            geo_multipliers: table(&[
                ("US", 1.0),
                ("CA", 0.15),
                ("UK", 0.12),
                ("GB", 0.12),
                ("DE", 0.10),
                ("AU", 0.08),
                ("FR", 0.08),
                ("IT", 0.06),
                ("ES", 0.05),
                ("EU", 0.25),
            ]),
            default_geo_multiplier: 0.05,
            language_multipliers: table(&[
                ("en", 1.0),
                ("es", 0.6),
                ("fr", 0.5),
                ("de", 0.5),
                ("it", 0.4),
            ]),
            default_language_multiplier: 0.5,
            participation_rate: 0.8,
            market_cpc: MarketCpc {
                low: 1.20,
                medium: 2.00,
                high: 3.50,
            },
            base_ctr: 0.035,
            ctr_word_uplift: 0.10,
            max_ctr: 0.30,
            base_cvr: 0.03,
            cvr_word_uplift: 0.15,
            max_cvr: 0.25,
            jitter: 0.10,
            avg_order_value: 100.0,
            maximize_clicks_discount: 0.9,
        }
    }
}

impl EstimatorConfig {
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(ForecastError::InvalidConfig(reason));

        if !(0.0..1.0).contains(&self.jitter) {
            return invalid(format!("jitter must be within [0, 1), got {}", self.jitter));
        }
        for (name, rate) in [
            ("participation_rate", self.participation_rate),
            ("base_ctr", self.base_ctr),
            ("max_ctr", self.max_ctr),
            ("base_cvr", self.base_cvr),
            ("max_cvr", self.max_cvr),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return invalid(format!("{} must be within [0, 1], got {}", name, rate));
            }
        }
        let multipliers = self
            .length_volume
            .iter()
            .chain(self.geo_multipliers.values())
            .chain(self.language_multipliers.values())
            .chain([
                &self.long_text_volume,
                &self.default_geo_multiplier,
                &self.default_language_multiplier,
                &self.avg_order_value,
                &self.market_cpc.low,
                &self.market_cpc.medium,
                &self.market_cpc.high,
            ]);
        for value in multipliers {
            if !value.is_finite() || *value < 0.0 {
                return invalid(format!("estimator values must be non-negative, got {}", value));
            }
        }
        for match_type in MatchType::ALL {
            if self.match_volume.get(match_type) < 0.0 || self.match_cpc_impact.get(match_type) <= -1.0 {
                return invalid(format!("invalid {} match-type modifiers", match_type));
            }
        }
        Ok(())
    }

    fn geo_multiplier(&self, geo: &str) -> f64 {
        self.geo_multipliers
            .get(geo)
            .copied()
            .unwrap_or(self.default_geo_multiplier)
    }

    fn language_multiplier(&self, language: &str) -> f64 {
        self.language_multipliers
            .get(language)
            .copied()
            .unwrap_or(self.default_language_multiplier)
    }
}

/// Deterministic formula-based estimator.
#[derive(Debug, Clone, Default)]
pub struct HeuristicEstimator {
    config: EstimatorConfig,
}

impl HeuristicEstimator {
    pub fn new(config: EstimatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimated monthly searches before match-type and targeting multipliers.
    pub fn monthly_volume(&self, keyword: &Keyword) -> f64 {
        let config = &self.config;
        let text = keyword.text();
        let words: Vec<&str> = text.split(' ').collect();

        let mut volume = config
            .length_volume
            .get(text.chars().count().saturating_sub(1))
            .copied()
            .unwrap_or(config.long_text_volume);

        if words
            .iter()
            .any(|word| config.high_volume_words.iter().any(|hv| hv == word))
        {
            volume *= config.high_volume_multiplier;
        }
        if words
            .iter()
            .any(|word| config.business_terms.iter().any(|term| word.contains(term.as_str())))
        {
            volume *= config.business_multiplier;
        }

        match words.len() {
            1 => volume,
            2 => volume * config.two_word_factor,
            _ => volume * config.multi_word_factor,
        }
    }

    /// Market CPC adjusted for the keyword's match type.
    pub fn market_cpc(&self, keyword: &Keyword) -> f64 {
        let base = self.config.market_cpc.get(Competition::of(keyword));
        base * (1.0 + self.config.match_cpc_impact.get(keyword.match_type()))
    }

    fn specificity(&self, keyword: &Keyword, base: f64, uplift: f64, max: f64) -> f64 {
        let extra_words = keyword.word_count().saturating_sub(1) as f64;
        (base * (1.0 + uplift * extra_words)).min(max)
    }

    fn cpc(&self, keyword: &Keyword, bidding: &BiddingConfig, cvr: f64) -> Result<f64> {
        let market = self.market_cpc(keyword);
        let cpc = match bidding.strategy {
            BiddingStrategy::ManualCpc => bidding.target.map_or(market, |max_cpc| market.min(max_cpc)),
            BiddingStrategy::TargetCpa => required_target(bidding)? * cvr,
            BiddingStrategy::TargetRoas => {
                let roas = required_target(bidding)? / 100.0;
                self.config.avg_order_value / roas * cvr
            }
            BiddingStrategy::MaximizeClicks => {
                let bid = market * self.config.maximize_clicks_discount;
                bidding.target.map_or(bid, |ceiling| bid.min(ceiling))
            }
            BiddingStrategy::ImpressionShare => {
                market * impression_share_multiplier(required_target(bidding)?)
            }
        };
        Ok(cpc.max(0.0))
    }
}

fn required_target(bidding: &BiddingConfig) -> Result<f64> {
    bidding.target.ok_or_else(|| {
        ForecastError::InvalidConfig(format!("{} requires a target value", bidding.strategy))
    })
}

/// Bid premium needed to win a given impression share (percent).
fn impression_share_multiplier(share: f64) -> f64 {
    match share {
        s if s >= 90.0 => 1.8,
        s if s >= 70.0 => 1.5,
        s if s >= 50.0 => 1.2,
        _ => 1.0,
    }
}

impl MetricEstimator for HeuristicEstimator {
    fn estimate(&self, keyword: &Keyword, bidding: &BiddingConfig) -> Result<MetricEstimate> {
        if keyword.text().trim().is_empty() {
            return Err(ForecastError::InvalidRequest("keyword text is empty".to_string()));
        }
        let bidding = bidding.normalized();
        bidding.validate()?;

        let config = &self.config;
        let mut rng = StdRng::seed_from_u64(keyword_seed(keyword, &bidding));
        let mut jitter = || {
            if config.jitter > 0.0 {
                rng.gen_range((1.0 - config.jitter)..=(1.0 + config.jitter))
            } else {
                1.0
            }
        };
        let volume_jitter = jitter();
        let ctr_jitter = jitter();
        let cvr_jitter = jitter();

        let auctions = self.monthly_volume(keyword) / DAYS_PER_MONTH
            * config.match_volume.get(keyword.match_type())
            * config.geo_multiplier(&bidding.geo)
            * config.language_multiplier(&bidding.language)
            * volume_jitter;
        let participation = match bidding.strategy {
            BiddingStrategy::ImpressionShare => required_target(&bidding)? / 100.0,
            _ => config.participation_rate,
        };
        let impressions = (auctions * participation).max(0.0).floor() as u64;

        let ctr = (self.specificity(keyword, config.base_ctr, config.ctr_word_uplift, config.max_ctr)
            * ctr_jitter)
            .clamp(0.0, 1.0);
        let cvr = (self.specificity(keyword, config.base_cvr, config.cvr_word_uplift, config.max_cvr)
            * cvr_jitter)
            .clamp(0.0, 1.0);
        let cpc = self.cpc(keyword, &bidding, cvr)?;

        let clicks = (impressions as f64 * ctr).floor() as u64;
        let conversions = (clicks as f64 * cvr).floor() as u64;
        let cost = clicks as f64 * cpc;
        let revenue = conversions as f64 * config.avg_order_value;
        if !cpc.is_finite() || !cost.is_finite() {
            return Err(ForecastError::InvalidConfig(format!(
                "{} target {:?} puts the cost of '{}' out of range",
                bidding.strategy,
                bidding.target,
                keyword.text()
            )));
        }

        debug!(
            keyword = keyword.text(),
            match_type = %keyword.match_type(),
            impressions,
            clicks,
            conversions,
            cpc,
            "estimated keyword"
        );

        Ok(MetricEstimate::from_counts(impressions, clicks, cost, conversions, revenue))
    }
}
