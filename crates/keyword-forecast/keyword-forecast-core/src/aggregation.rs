//! Campaign-level aggregation

use keyword_forecast_spi::{CampaignForecast, MetricEstimate};

/// Sum per-keyword estimates into campaign totals.
///
/// Averages are weighted: `avg_ctr` is total clicks over total impressions and
/// `avg_cvr` is total conversions over total clicks, never a mean of rates.
pub fn aggregate<'a, I>(estimates: I) -> CampaignForecast
where
    I: IntoIterator<Item = &'a MetricEstimate>,
{
    let mut forecast = estimates
        .into_iter()
        .fold(CampaignForecast::default(), |mut acc, estimate| {
            acc.total_impressions += estimate.impressions;
            acc.total_clicks += estimate.clicks;
            acc.total_cost += estimate.cost;
            acc.total_conversions += estimate.conversions;
            acc
        });

    if forecast.total_impressions > 0 {
        forecast.avg_ctr = forecast.total_clicks as f64 / forecast.total_impressions as f64;
    }
    if forecast.total_clicks > 0 {
        forecast.avg_cvr = forecast.total_conversions as f64 / forecast.total_clicks as f64;
    }
    forecast
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_are_exact_sums() {
        let estimates = [
            MetricEstimate::from_counts(1000, 40, 80.0, 4, 400.0),
            MetricEstimate::from_counts(500, 10, 12.5, 1, 100.0),
        ];
        let forecast = aggregate(&estimates);
        assert_eq!(forecast.total_impressions, 1500);
        assert_eq!(forecast.total_clicks, 50);
        assert_eq!(forecast.total_conversions, 5);
        assert!((forecast.total_cost - 92.5).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_ctr() {
        let estimates = [
            MetricEstimate::from_counts(100, 20, 10.0, 0, 0.0),
            MetricEstimate::from_counts(900, 45, 10.0, 0, 0.0),
        ];
        let forecast = aggregate(&estimates);
        // (20 + 45) / 1000, not mean(0.20, 0.05)
        assert!((forecast.avg_ctr - 0.065).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_cvr() {
        let estimates = [
            MetricEstimate::from_counts(1000, 10, 10.0, 5, 0.0),
            MetricEstimate::from_counts(1000, 90, 10.0, 5, 0.0),
        ];
        assert!((aggregate(&estimates).avg_cvr - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input() {
        let forecast = aggregate(std::iter::empty());
        assert_eq!(forecast, CampaignForecast::default());
    }
}
