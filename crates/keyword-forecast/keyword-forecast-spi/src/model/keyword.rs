//! Keyword model and input notation

use serde::{Deserialize, Serialize};

use super::MatchType;

/// Normalize keyword text: trim, lowercase, collapse internal whitespace.
pub fn normalize_keyword_text(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A normalized, immutable keyword.
///
/// Only constructible through normalization, so it is serialized but never
/// deserialized directly; callers submit [`KeywordInput`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Keyword {
    text: String,
    match_type: MatchType,
    /// False when the caller's match-type label was not recognized
    #[serde(skip)]
    label_recognized: bool,
}

impl Keyword {
    /// Build a keyword from raw text, returning `None` when the text is empty
    /// after normalization.
    pub fn new(text: &str, match_type: MatchType) -> Option<Self> {
        let text = normalize_keyword_text(text);
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text,
            match_type,
            label_recognized: true,
        })
    }

    /// Keyword whose submitted match-type label was not recognized: grouped as
    /// broad, banded with the bander's fallback coefficient.
    pub fn with_unrecognized_label(text: &str) -> Option<Self> {
        Self::new(text, MatchType::default()).map(|keyword| Self {
            label_recognized: false,
            ..keyword
        })
    }

    /// Parse advertiser notation: `[text]` is exact, `"text"` is phrase,
    /// anything else is broad.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if let Some(inner) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            return Self::new(inner, MatchType::Exact);
        }
        if trimmed.len() >= 2 {
            if let Some(inner) = trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
                return Self::new(inner, MatchType::Phrase);
            }
        }
        Self::new(trimmed, MatchType::Broad)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    /// Match type to band with; `None` for unrecognized labels.
    pub fn banding_match_type(&self) -> Option<MatchType> {
        self.label_recognized.then_some(self.match_type)
    }

    pub fn word_count(&self) -> usize {
        self.text.split(' ').count()
    }
}

/// A keyword as submitted by a caller: either notation text or an explicit
/// text / match-type pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeywordInput {
    Text(String),
    Spec {
        text: String,
        #[serde(default)]
        match_type: Option<String>,
    },
}

impl KeywordInput {
    /// Resolve into a keyword. Explicit labels win over notation; labels that
    /// are not a known match type fall back to the default (broad) grouping.
    pub fn resolve(&self) -> Option<Keyword> {
        match self {
            KeywordInput::Text(raw) => Keyword::parse(raw),
            KeywordInput::Spec { text, match_type: None } => Keyword::new(text, MatchType::default()),
            KeywordInput::Spec {
                text,
                match_type: Some(label),
            } => match MatchType::from_label(label) {
                Some(match_type) => Keyword::new(text, match_type),
                None => Keyword::with_unrecognized_label(text),
            },
        }
    }
}

impl From<&str> for KeywordInput {
    fn from(raw: &str) -> Self {
        KeywordInput::Text(raw.to_string())
    }
}

impl From<String> for KeywordInput {
    fn from(raw: String) -> Self {
        KeywordInput::Text(raw)
    }
}
