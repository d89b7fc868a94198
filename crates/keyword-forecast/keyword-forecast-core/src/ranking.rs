//! Ranked and grouped views over forecast results

use std::collections::BTreeMap;

use keyword_forecast_spi::{
    KeywordBreakdown, KeywordForecast, MatchType, MatchTypeBreakdown, MetricDistribution, MetricKind, RankedKeyword,
    Result,
};

use crate::aggregation::aggregate;

pub const DEFAULT_TOP_N: usize = 10;

/// Top `n` keywords by the named metric (default [`DEFAULT_TOP_N`]).
///
/// Fails with `InvalidMetric` when the name is not a [`MetricKind`].
pub fn top_performers(
    keywords: &[KeywordForecast],
    metric: &str,
    n: Option<usize>,
) -> Result<Vec<RankedKeyword>> {
    let metric: MetricKind = metric.parse()?;
    let mut ranked = rank_by(keywords, metric);
    ranked.truncate(n.unwrap_or(DEFAULT_TOP_N));
    Ok(ranked)
}

/// Every keyword ordered by `metric` descending, ties by keyword text ascending.
pub fn rank_by(keywords: &[KeywordForecast], metric: MetricKind) -> Vec<RankedKeyword> {
    let mut sorted: Vec<&KeywordForecast> = keywords.iter().collect();
    sorted.sort_by(|a, b| {
        b.estimate
            .value(metric)
            .total_cmp(&a.estimate.value(metric))
            .then_with(|| a.keyword.text().cmp(b.keyword.text()))
    });

    sorted
        .into_iter()
        .enumerate()
        .map(|(index, kf)| RankedKeyword {
            rank: index + 1,
            keyword: kf.keyword.clone(),
            metric,
            metric_value: kf.estimate.value(metric),
            estimate: kf.estimate,
        })
        .collect()
}

fn share(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Campaign totals per match type, re-aggregated over each subset.
///
/// Match types without keywords are absent from the map.
pub fn breakdown_by_match_type(
    keywords: &[KeywordForecast],
) -> BTreeMap<MatchType, MatchTypeBreakdown> {
    let campaign = aggregate(keywords.iter().map(|kf| &kf.estimate));

    MatchType::ALL
        .into_iter()
        .filter_map(|match_type| {
            let subset: Vec<&KeywordForecast> = keywords
                .iter()
                .filter(|kf| kf.keyword.match_type() == match_type)
                .collect();
            if subset.is_empty() {
                return None;
            }

            let forecast = aggregate(subset.iter().map(|kf| &kf.estimate));
            let breakdown = MatchTypeBreakdown {
                match_type,
                keyword_count: subset.len(),
                forecast,
                impression_share: share(
                    forecast.total_impressions as f64,
                    campaign.total_impressions as f64,
                ),
                click_share: share(forecast.total_clicks as f64, campaign.total_clicks as f64),
                cost_share: share(forecast.total_cost, campaign.total_cost),
                conversion_share: share(
                    forecast.total_conversions as f64,
                    campaign.total_conversions as f64,
                ),
            };
            Some((match_type, breakdown))
        })
        .collect()
}

/// Each keyword's share of the campaign totals, in input order.
pub fn breakdown_by_keyword(keywords: &[KeywordForecast]) -> Vec<KeywordBreakdown> {
    let campaign = aggregate(keywords.iter().map(|kf| &kf.estimate));

    keywords
        .iter()
        .map(|kf| KeywordBreakdown {
            keyword: kf.keyword.clone(),
            estimate: kf.estimate,
            impression_share: share(
                kf.estimate.impressions as f64,
                campaign.total_impressions as f64,
            ),
            click_share: share(kf.estimate.clicks as f64, campaign.total_clicks as f64),
            cost_share: share(kf.estimate.cost, campaign.total_cost),
            conversion_share: share(
                kf.estimate.conversions as f64,
                campaign.total_conversions as f64,
            ),
        })
        .collect()
}

/// Linear interpolation between closest ranks of a sorted slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
}

fn summarize(mut values: Vec<f64>) -> MetricDistribution {
    if values.is_empty() {
        return MetricDistribution::default();
    }
    values.sort_by(f64::total_cmp);

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

    MetricDistribution {
        count,
        mean,
        median: percentile(&values, 0.5),
        std: variance.sqrt(),
        min: values[0],
        max: values[count - 1],
        q25: percentile(&values, 0.25),
        q75: percentile(&values, 0.75),
    }
}

/// Summary statistics of one metric over keywords where it is non-zero.
pub fn distribution_of(keywords: &[KeywordForecast], metric: &str) -> Result<MetricDistribution> {
    let metric: MetricKind = metric.parse()?;
    Ok(summarize(non_zero_values(keywords, metric)))
}

/// Summary statistics for every metric.
pub fn distribution(keywords: &[KeywordForecast]) -> BTreeMap<MetricKind, MetricDistribution> {
    MetricKind::ALL
        .into_iter()
        .map(|metric| (metric, summarize(non_zero_values(keywords, metric))))
        .collect()
}

fn non_zero_values(keywords: &[KeywordForecast], metric: MetricKind) -> Vec<f64> {
    keywords
        .iter()
        .map(|kf| kf.estimate.value(metric))
        .filter(|value| *value > 0.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyword_forecast_spi::{ForecastError, Keyword, MetricEstimate};

    fn forecast(raw: &str, impressions: u64, clicks: u64, cost: f64, conversions: u64) -> KeywordForecast {
        KeywordForecast {
            keyword: Keyword::parse(raw).unwrap(),
            estimate: MetricEstimate::from_counts(impressions, clicks, cost, conversions, 0.0),
            confidence: BTreeMap::new(),
        }
    }

    fn sample() -> Vec<KeywordForecast> {
        vec![
            forecast("shoes", 1000, 30, 60.0, 3),
            forecast("[running shoes]", 400, 30, 45.0, 2),
            forecast("\"trail shoes\"", 600, 50, 80.0, 5),
            forecast("boots", 200, 10, 0.0, 0),
        ]
    }

    fn texts(ranked: &[RankedKeyword]) -> Vec<&str> {
        ranked.iter().map(|r| r.keyword.text()).collect()
    }

    #[test]
    fn test_top_performers_orders_descending() {
        let ranked = top_performers(&sample(), "clicks", None).unwrap();
        assert_eq!(ranked.len(), 4);
        assert_eq!(ranked[0].keyword.text(), "trail shoes");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].metric, MetricKind::Clicks);
        assert_eq!(ranked[0].metric_value, 50.0);
    }

    #[test]
    fn test_ties_broken_by_text() {
        let ranked = top_performers(&sample(), "clicks", None).unwrap();
        assert_eq!(texts(&ranked), vec!["trail shoes", "running shoes", "shoes", "boots"]);
        let ranks: Vec<usize> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_top_n_truncates() {
        let ranked = top_performers(&sample(), "impressions", Some(2)).unwrap();
        assert_eq!(texts(&ranked), vec!["shoes", "trail shoes"]);
        assert!(top_performers(&sample(), "cost", Some(0)).unwrap().is_empty());
    }

    #[test]
    fn test_ranking_is_repeatable() {
        let data = sample();
        let first = top_performers(&data, "ctr", None).unwrap();
        let second = top_performers(&data, "ctr", None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_metric() {
        let err = top_performers(&sample(), "quality_score", None).unwrap_err();
        assert_eq!(err, ForecastError::InvalidMetric("quality_score".to_string()));
        assert!(distribution_of(&sample(), "nope").is_err());
    }

    #[test]
    fn test_breakdown_groups_by_match_type() {
        let breakdown = breakdown_by_match_type(&sample());
        assert_eq!(breakdown.len(), 3);

        let broad = &breakdown[&MatchType::Broad];
        assert_eq!(broad.keyword_count, 2);
        assert_eq!(broad.forecast.total_impressions, 1200);
        assert_eq!(broad.forecast.total_clicks, 40);
        assert!((broad.forecast.avg_ctr - 40.0 / 1200.0).abs() < 1e-12);

        let exact = &breakdown[&MatchType::Exact];
        assert_eq!(exact.forecast.total_clicks, 30);
        assert!((exact.click_share - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_shares_sum_to_hundred() {
        let breakdown = breakdown_by_match_type(&sample());
        let impressions: f64 = breakdown.values().map(|b| b.impression_share).sum();
        let cost: f64 = breakdown.values().map(|b| b.cost_share).sum();
        assert!((impressions - 100.0).abs() < 1e-9);
        assert!((cost - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_keyword_breakdown_shares() {
        let breakdown = breakdown_by_keyword(&sample());
        let texts: Vec<&str> = breakdown.iter().map(|b| b.keyword.text()).collect();
        assert_eq!(texts, vec!["shoes", "running shoes", "trail shoes", "boots"]);

        // 1000 of 2200 impressions, 60 of 185 cost
        assert!((breakdown[0].impression_share - 1000.0 / 2200.0 * 100.0).abs() < 1e-9);
        assert!((breakdown[0].cost_share - 60.0 / 185.0 * 100.0).abs() < 1e-9);
        assert_eq!(breakdown[3].cost_share, 0.0);

        let clicks: f64 = breakdown.iter().map(|b| b.click_share).sum();
        assert!((clicks - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_keyword_breakdown_of_zero_totals() {
        let idle = vec![forecast("shoes", 0, 0, 0.0, 0)];
        let breakdown = breakdown_by_keyword(&idle);
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].impression_share, 0.0);
        assert_eq!(breakdown[0].conversion_share, 0.0);
        assert!(breakdown_by_keyword(&[]).is_empty());
    }

    #[test]
    fn test_breakdown_omits_empty_types() {
        let only_broad = vec![forecast("shoes", 100, 5, 10.0, 1)];
        let breakdown = breakdown_by_match_type(&only_broad);
        assert_eq!(breakdown.keys().copied().collect::<Vec<_>>(), vec![MatchType::Broad]);
        assert!(breakdown_by_match_type(&[]).is_empty());
    }

    #[test]
    fn test_distribution_skips_zero_values() {
        let dist = distribution_of(&sample(), "cost").unwrap();
        assert_eq!(dist.count, 3);
        assert_eq!(dist.min, 45.0);
        assert_eq!(dist.max, 80.0);
        assert_eq!(dist.median, 60.0);
        assert!((dist.mean - 185.0 / 3.0).abs() < 1e-9);
        assert!((dist.q25 - 52.5).abs() < 1e-9);
        assert!((dist.q75 - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_distribution_std_is_population() {
        let data = vec![
            forecast("a", 2, 0, 0.0, 0),
            forecast("b", 4, 0, 0.0, 0),
            forecast("c", 4, 0, 0.0, 0),
            forecast("d", 4, 0, 0.0, 0),
            forecast("e", 5, 0, 0.0, 0),
            forecast("f", 5, 0, 0.0, 0),
            forecast("g", 7, 0, 0.0, 0),
            forecast("h", 9, 0, 0.0, 0),
        ];
        let dist = distribution_of(&data, "impressions").unwrap();
        assert!((dist.mean - 5.0).abs() < 1e-12);
        assert!((dist.std - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_distribution_covers_every_metric() {
        let all = distribution(&sample());
        assert_eq!(all.len(), MetricKind::ALL.len());
        assert_eq!(all[&MetricKind::Conversions].count, 3);
        assert_eq!(distribution(&[])[&MetricKind::Clicks], MetricDistribution::default());
    }
}
