//! Equity CLI - Command line interface for equity analytics.
//!
//! Reads price histories and holdings from JSON files and prints results as
//! a JSON envelope on stdout. Logs go to stderr.

use clap::{Parser, Subcommand};
use equity_core::{
    config::AnalyticsConfig,
    indicators::{rsi, sma, TechnicalSnapshot},
    insight::InsightRules,
    portfolio::{HoldingValuation, PortfolioSnapshot},
    risk::calculate_risk_metrics,
    types::PriceSeries,
    ApiResponse, Error,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "equity")]
#[command(about = "Equity analytics CLI - indicators, risk metrics and portfolio insights")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $EQUITY_CORE_CONFIG or the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute SMA and RSI for a price series
    Indicators {
        /// JSON file with a list of price points
        #[arg(short, long)]
        series: PathBuf,
        /// SMA period (defaults to the configured short period)
        #[arg(long)]
        sma: Option<usize>,
        /// RSI period (defaults to the configured period)
        #[arg(long)]
        rsi: Option<usize>,
    },
    /// Calculate risk metrics for a price series
    Risk {
        /// JSON file with a list of price points
        #[arg(short, long)]
        series: PathBuf,
        /// Benchmark series of equal length, for beta
        #[arg(short, long)]
        benchmark: Option<PathBuf>,
    },
    /// Build a portfolio snapshot from holding valuations
    Portfolio {
        /// JSON file with a list of holding valuations
        #[arg(short, long)]
        input: PathBuf,
        /// Number of top and bottom performers to list
        #[arg(long, default_value = "3")]
        top: usize,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let output = match run(cli) {
        Ok(data) => serde_json::to_string_pretty(&ApiResponse::ok(data))?,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            serde_json::to_string_pretty(&ApiResponse::<()>::err(e.to_string()))?
        }
    };

    println!("{}", output);
    Ok(())
}

fn run(cli: Cli) -> equity_core::Result<Value> {
    let config = match &cli.config {
        Some(path) => AnalyticsConfig::load(path)?,
        None => AnalyticsConfig::load_default()?,
    };

    match cli.command {
        Commands::Indicators { series, sma, rsi } => handle_indicators(&config, &series, sma, rsi),
        Commands::Risk { series, benchmark } => handle_risk(&config, &series, benchmark.as_deref()),
        Commands::Portfolio { input, top } => handle_portfolio(&config, &input, top),
        Commands::Config => Ok(serde_json::to_value(&config)?),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> equity_core::Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn handle_indicators(
    config: &AnalyticsConfig,
    path: &Path,
    sma_period: Option<usize>,
    rsi_period: Option<usize>,
) -> equity_core::Result<Value> {
    let series: PriceSeries = read_json(path)?;
    let sma_period = sma_period.unwrap_or(config.indicators.short_sma_period);
    let rsi_period = rsi_period.unwrap_or(config.indicators.rsi_period);

    let sma_values = sma(&series, sma_period)?;
    let rsi_values = match rsi(&series, rsi_period) {
        Ok(values) => Some(values),
        Err(Error::InsufficientData(msg)) => {
            tracing::info!(%msg, "skipping RSI");
            None
        }
        Err(e) => return Err(e),
    };
    let snapshot = TechnicalSnapshot::from_series(&series, &config.indicators)?;

    Ok(json!({
        "points": series.len(),
        "sma_period": sma_period,
        "sma": sma_values,
        "rsi_period": rsi_period,
        "rsi": rsi_values,
        "latest": snapshot,
    }))
}

fn handle_risk(
    config: &AnalyticsConfig,
    path: &Path,
    benchmark: Option<&Path>,
) -> equity_core::Result<Value> {
    let series: PriceSeries = read_json(path)?;
    let benchmark = benchmark.map(read_json::<PriceSeries>).transpose()?;
    let params = config.risk.risk_params()?;

    let metrics = calculate_risk_metrics(&series, benchmark.as_ref(), &params)?;
    Ok(json!({
        "params": params,
        "metrics": metrics,
    }))
}

fn handle_portfolio(
    config: &AnalyticsConfig,
    path: &Path,
    top: usize,
) -> equity_core::Result<Value> {
    let valuations: Vec<HoldingValuation> = read_json(path)?;
    let rules = InsightRules::from_thresholds(&config.insight);
    let snapshot = PortfolioSnapshot::build(&valuations, &rules)?;

    let symbols = |reports: Vec<&equity_core::portfolio::HoldingReport>| -> Vec<String> {
        reports.into_iter().map(|r| r.symbol.clone()).collect()
    };

    Ok(json!({
        "snapshot": snapshot,
        "top_performers": symbols(snapshot.top_performers(top)),
        "underperformers": symbols(snapshot.underperformers(top)),
    }))
}
