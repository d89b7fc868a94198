//! Keyword match type model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Keyword matching breadth.
///
/// Match type drives estimate uncertainty (confidence band width) and the
/// volume/CPC modifiers of the estimator. CTR is not ordered by match type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Phrase,
    Broad,
}

impl Default for MatchType {
    fn default() -> Self {
        MatchType::Broad
    }
}

impl MatchType {
    /// All match types, narrowest first.
    pub const ALL: [MatchType; 3] = [MatchType::Exact, MatchType::Phrase, MatchType::Broad];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Phrase => "phrase",
            MatchType::Broad => "broad",
        }
    }

    /// Parse a label, returning `None` for anything unrecognized.
    pub fn from_label(label: &str) -> Option<Self> {
        label.parse().ok()
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(MatchType::Exact),
            "phrase" => Ok(MatchType::Phrase),
            "broad" => Ok(MatchType::Broad),
            other => Err(format!("unknown match type '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_broad() {
        assert_eq!(MatchType::default(), MatchType::Broad);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("EXACT".parse::<MatchType>().unwrap(), MatchType::Exact);
        assert_eq!(" Phrase ".parse::<MatchType>().unwrap(), MatchType::Phrase);
    }

    #[test]
    fn test_unknown_label() {
        assert!("modified_broad".parse::<MatchType>().is_err());
        assert_eq!(MatchType::from_label("modified_broad"), None);
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&MatchType::Phrase).unwrap();
        assert_eq!(json, "\"phrase\"");
        let parsed: MatchType = serde_json::from_str("\"exact\"").unwrap();
        assert_eq!(parsed, MatchType::Exact);
    }

    #[test]
    fn test_display_matches_label() {
        for match_type in MatchType::ALL {
            assert_eq!(match_type.to_string(), match_type.as_str());
        }
    }
}
