//! # kwforecast
//!
//! Command-line interface for the keyword forecasting engine.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use keyword_forecast_facade::{
    breakdown_by_keyword, breakdown_by_match_type, distribution, top_performers, BiddingConfig,
    BiddingStrategy, CampaignRequest, EngineConfig, ForecastEngineBuilder, ForecastResult,
    KeywordBreakdown, MatchType, MatchTypeBreakdown, MetricDistribution, MetricKind, RankedKeyword,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "kwforecast")]
#[command(about = "Keyword performance forecasting CLI", long_about = None)]
struct Cli {
    /// Engine config file (JSON)
    #[arg(short, long, global = true, env = "KWF_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast a campaign
    Forecast {
        /// Keyword; `[text]` for exact, `"text"` for phrase, otherwise broad
        #[arg(short, long = "keyword", required = true)]
        keywords: Vec<String>,

        /// Campaign budget in currency units
        #[arg(short, long)]
        budget: f64,

        /// Bidding strategy (manual_cpc, target_cpa, target_roas, maximize_clicks, impression_share)
        #[arg(short, long, default_value = "manual_cpc")]
        strategy: String,

        /// Strategy target: max CPC, target CPA, target ROAS %, or impression share %
        #[arg(short, long)]
        target: Option<f64>,

        /// Geo code
        #[arg(long, default_value = "US")]
        geo: String,

        /// Language code
        #[arg(long, default_value = "en")]
        language: String,

        /// Include the top N keywords
        #[arg(long)]
        top: Option<usize>,

        /// Metric to rank by
        #[arg(long)]
        rank_by: Option<String>,

        /// Include the match-type breakdown
        #[arg(long)]
        breakdown: bool,

        /// Include each keyword's share of the campaign totals
        #[arg(long)]
        keyword_breakdown: bool,

        /// Include per-metric distribution statistics
        #[arg(long)]
        distribution: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the effective engine configuration
    Config {
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Serialize)]
struct ForecastOutput {
    forecast: ForecastResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_performers: Option<Vec<RankedKeyword>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    breakdown: Option<BTreeMap<MatchType, MatchTypeBreakdown>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keyword_breakdown: Option<Vec<KeywordBreakdown>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    distribution: Option<BTreeMap<MetricKind, MetricDistribution>>,
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kwforecast=info,keyword_forecast_core=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = EngineConfig::load(cli.config.as_deref()).context("failed to load engine config")?;

    match cli.command {
        Commands::Config { pretty } => print_json(&config, pretty),
        Commands::Forecast {
            keywords,
            budget,
            strategy,
            target,
            geo,
            language,
            top,
            rank_by,
            breakdown,
            keyword_breakdown,
            distribution: with_distribution,
            pretty,
        } => {
            let strategy: BiddingStrategy = strategy.parse()?;
            let mut bidding = BiddingConfig::new(strategy).with_geo(geo).with_language(language);
            if let Some(target) = target {
                bidding = bidding.with_target(target);
            }
            let request = CampaignRequest::new(&keywords, budget, bidding)?;

            let default_top_n = config.default_top_n;
            let engine = ForecastEngineBuilder::from_config(config).build()?;
            let result = engine.forecast(&request)?;
            info!(
                keywords = result.keywords.len(),
                total_cost = result.campaign_forecast.total_cost,
                source = %result.source,
                "forecast ready"
            );

            let ranking = match (top, rank_by) {
                (None, None) => None,
                (n, metric) => Some(top_performers(
                    &result.keywords,
                    metric.as_deref().unwrap_or("clicks"),
                    Some(n.unwrap_or(default_top_n)),
                )?),
            };
            let output = ForecastOutput {
                top_performers: ranking,
                breakdown: breakdown.then(|| breakdown_by_match_type(&result.keywords)),
                keyword_breakdown: keyword_breakdown.then(|| breakdown_by_keyword(&result.keywords)),
                distribution: with_distribution.then(|| distribution(&result.keywords)),
                forecast: result,
            };
            print_json(&output, pretty)
        }
    }
}
