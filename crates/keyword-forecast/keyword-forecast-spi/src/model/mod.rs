//! Model module containing data structures

mod allocation;
mod bidding;
mod confidence_range;
mod estimate;
mod forecast;
mod keyword;
mod match_type;
mod metric;
mod request;
mod views;

pub use allocation::Allocation;
pub use bidding::{BiddingConfig, BiddingStrategy};
pub use confidence_range::ConfidenceRange;
pub use estimate::MetricEstimate;
pub use forecast::{CampaignForecast, ForecastResult, ForecastSource, KeywordForecast};
pub use keyword::{normalize_keyword_text, Keyword, KeywordInput};
pub use match_type::MatchType;
pub use metric::MetricKind;
pub use request::CampaignRequest;
pub use views::{KeywordBreakdown, MatchTypeBreakdown, MetricDistribution, RankedKeyword};
