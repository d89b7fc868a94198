//! Budget allocation

use keyword_forecast_spi::{Allocation, BudgetAllocator, ForecastError, MetricEstimate, Result};
use tracing::debug;

/// Throttles every keyword by the same factor when the raw spend exceeds the budget.
///
/// Impressions are left untouched; clicks and conversions are scaled and floored,
/// cost is scaled exactly, and revenue follows the scaled conversions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionalAllocator;

impl ProportionalAllocator {
    pub fn new() -> Self {
        Self
    }
}

fn scale(estimate: &MetricEstimate, factor: f64) -> MetricEstimate {
    let clicks = (estimate.clicks as f64 * factor).floor() as u64;
    let conversions = (estimate.conversions as f64 * factor).floor() as u64;
    let revenue = conversions as f64 * estimate.revenue_per_conversion();
    MetricEstimate::from_counts(
        estimate.impressions,
        clicks,
        estimate.cost * factor,
        conversions,
        revenue,
    )
}

impl BudgetAllocator for ProportionalAllocator {
    fn allocate(&self, estimates: &[MetricEstimate], campaign_budget: f64) -> Result<Allocation> {
        if !campaign_budget.is_finite() || campaign_budget <= 0.0 {
            return Err(ForecastError::InvalidBudget(campaign_budget));
        }

        let raw_total_cost: f64 = estimates.iter().map(|e| e.cost).sum();
        if raw_total_cost <= 0.0 {
            return Ok(Allocation {
                estimates: estimates.to_vec(),
                budget_utilization: 0.0,
                raw_total_cost: 0.0,
                scale_factor: 1.0,
            });
        }

        let scale_factor = if raw_total_cost > campaign_budget {
            campaign_budget / raw_total_cost
        } else {
            1.0
        };
        let adjusted = if scale_factor < 1.0 {
            estimates.iter().map(|e| scale(e, scale_factor)).collect()
        } else {
            estimates.to_vec()
        };

        debug!(raw_total_cost, campaign_budget, scale_factor, "allocated budget");

        Ok(Allocation {
            estimates: adjusted,
            budget_utilization: raw_total_cost.min(campaign_budget) / campaign_budget,
            raw_total_cost,
            scale_factor,
        })
    }
}
