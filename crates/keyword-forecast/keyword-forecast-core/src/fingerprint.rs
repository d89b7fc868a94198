//! Request fingerprints
//!
//! A fingerprint is the SHA-256 of a canonical encoding of the request:
//! keywords sorted by text, the budget, and the normalized bidding config.
//! Keyword input order does not affect it.

use std::fmt;

use keyword_forecast_spi::{BiddingConfig, CampaignRequest, Keyword};
use sha2::{Digest, Sha256};

const FINGERPRINT_VERSION: &[u8] = b"kwf-v1";

/// Stable cache key of a [`CampaignRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(request: &CampaignRequest) -> Self {
        let mut keywords: Vec<&Keyword> = request.keywords().iter().collect();
        keywords.sort_by(|a, b| a.text().cmp(b.text()));

        let mut hasher = Sha256::new();
        hasher.update(FINGERPRINT_VERSION);
        hasher.update((keywords.len() as u64).to_le_bytes());
        for keyword in keywords {
            update_keyword(&mut hasher, keyword);
        }
        hasher.update(request.campaign_budget().to_bits().to_le_bytes());
        update_bidding(&mut hasher, request.bidding());

        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading characters, for logs.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(16)]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Seed for a keyword's deterministic jitter.
pub fn keyword_seed(keyword: &Keyword, bidding: &BiddingConfig) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(FINGERPRINT_VERSION);
    update_keyword(&mut hasher, keyword);
    update_bidding(&mut hasher, &bidding.normalized());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

fn update_str(hasher: &mut Sha256, value: &str) {
    // Length prefix keeps ("ab", "c") distinct from ("a", "bc")
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

fn update_keyword(hasher: &mut Sha256, keyword: &Keyword) {
    update_str(hasher, keyword.text());
    update_str(hasher, keyword.match_type().as_str());
    hasher.update([u8::from(keyword.banding_match_type().is_some())]);
}

fn update_bidding(hasher: &mut Sha256, bidding: &BiddingConfig) {
    update_str(hasher, bidding.strategy.as_str());
    match bidding.target {
        Some(target) => {
            hasher.update([1u8]);
            hasher.update(target.to_bits().to_le_bytes());
        }
        None => hasher.update([0u8]),
    }
    update_str(hasher, &bidding.geo);
    update_str(hasher, &bidding.language);
}
