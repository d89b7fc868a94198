//! Campaign request model

use std::collections::HashSet;

use serde::Serialize;

use super::{BiddingConfig, Keyword, KeywordInput};
use crate::error::{ForecastError, Result};

/// A validated unit of forecasting work.
///
/// Construction normalizes and de-duplicates keywords and validates the
/// budget and bidding configuration, so a `CampaignRequest` that exists is
/// always fit to enter the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignRequest {
    keywords: Vec<Keyword>,
    campaign_budget: f64,
    bidding: BiddingConfig,
}

impl CampaignRequest {
    /// Build a request from keyword strings in advertiser notation.
    pub fn new<I, S>(keywords: I, campaign_budget: f64, bidding: BiddingConfig) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let inputs: Vec<KeywordInput> = keywords
            .into_iter()
            .map(|raw| KeywordInput::Text(raw.as_ref().to_string()))
            .collect();
        Self::from_inputs(&inputs, campaign_budget, bidding)
    }

    /// Build a request from mixed keyword inputs.
    pub fn from_inputs(
        inputs: &[KeywordInput],
        campaign_budget: f64,
        bidding: BiddingConfig,
    ) -> Result<Self> {
        if inputs.is_empty() {
            return Err(ForecastError::InvalidRequest(
                "at least one keyword must be provided".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let keywords: Vec<Keyword> = inputs
            .iter()
            .filter_map(KeywordInput::resolve)
            .filter(|keyword| seen.insert(keyword.text().to_string()))
            .collect();

        if keywords.is_empty() {
            return Err(ForecastError::InvalidRequest(
                "all keywords are empty after normalization".to_string(),
            ));
        }

        if !campaign_budget.is_finite() || campaign_budget <= 0.0 {
            return Err(ForecastError::InvalidBudget(campaign_budget));
        }

        let bidding = bidding.normalized();
        bidding.validate()?;

        Ok(Self {
            keywords,
            campaign_budget,
            bidding,
        })
    }

    /// Keywords in submission order, duplicates merged.
    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn campaign_budget(&self) -> f64 {
        self.campaign_budget
    }

    pub fn bidding(&self) -> &BiddingConfig {
        &self.bidding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BiddingStrategy, MatchType};

    fn manual() -> BiddingConfig {
        BiddingConfig::new(BiddingStrategy::ManualCpc).with_target(2.5)
    }

    #[test]
    fn test_valid_request() {
        let request = CampaignRequest::new(["running shoes", "trail shoes"], 100.0, manual()).unwrap();
        assert_eq!(request.keywords().len(), 2);
        assert_eq!(request.campaign_budget(), 100.0);
        assert_eq!(request.keywords()[0].text(), "running shoes");
    }

    #[test]
    fn test_empty_keyword_list() {
        let empty: Vec<&str> = vec![];
        let err = CampaignRequest::new(empty, 100.0, manual()).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidRequest(_)));
    }

    #[test]
    fn test_all_blank_keywords() {
        let err = CampaignRequest::new(["  ", "", "[]"], 100.0, manual()).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidRequest(_)));
    }

    #[test]
    fn test_blank_keywords_are_dropped() {
        let request = CampaignRequest::new(["", "shoes", "  "], 100.0, manual()).unwrap();
        assert_eq!(request.keywords().len(), 1);
    }

    #[test]
    fn test_duplicates_merge_keeping_first() {
        let request =
            CampaignRequest::new(["[Running Shoes]", "running  shoes", "trail shoes"], 50.0, manual())
                .unwrap();
        assert_eq!(request.keywords().len(), 2);
        assert_eq!(request.keywords()[0].match_type(), MatchType::Exact);
    }

    #[test]
    fn test_non_positive_budget() {
        for budget in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let err = CampaignRequest::new(["shoes"], budget, manual()).unwrap_err();
            assert!(matches!(err, ForecastError::InvalidBudget(_)));
        }
    }

    #[test]
    fn test_invalid_bidding_config() {
        let bidding = BiddingConfig::new(BiddingStrategy::ManualCpc).with_target(-1.0);
        let err = CampaignRequest::new(["shoes"], 100.0, bidding).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidConfig(_)));
    }

    #[test]
    fn test_request_checks_keywords_before_budget() {
        let empty: Vec<&str> = vec![];
        let err = CampaignRequest::new(empty, -1.0, manual()).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidRequest(_)));
    }

    #[test]
    fn test_bidding_codes_normalized() {
        let bidding = manual().with_geo("ca").with_language("FR");
        let request = CampaignRequest::new(["shoes"], 10.0, bidding).unwrap();
        assert_eq!(request.bidding().geo, "CA");
        assert_eq!(request.bidding().language, "fr");
    }
}
