//! Equity Core - Time-series analytics for equity portfolios.
//!
//! This crate turns materialized price histories and holding records into
//! structured numeric results:
//!
//! - **Series utilities**: Simple returns, rolling windows, price lookups
//! - **Technical indicators**: SMA, Wilder's RSI
//! - **Risk metrics**: Volatility, Sharpe ratio, max drawdown, beta
//! - **Portfolio aggregation**: Totals, sector allocation, weighted risk, performance windows
//! - **Insights**: Rule-table sentiment, risk tier and recommendation
//!
//! Every computation is a pure function of its inputs. Nothing is cached or
//! persisted between calls.
//!
//! # Example
//!
//! ```rust
//! use equity_core::indicators::sma;
//! use equity_core::types::PriceSeries;
//!
//! let series = PriceSeries::from_closes(0, 86_400, &[10.0, 11.0, 12.0, 13.0]).unwrap();
//! let averages = sma(&series, 2).unwrap();
//!
//! assert_eq!(averages.len(), 3);
//! assert!((averages.values()[0] - 10.5).abs() < 1e-12);
//! ```

pub mod config;
pub mod indicators;
pub mod insight;
pub mod portfolio;
pub mod risk;
pub mod series;
pub mod types;

// Re-export commonly used types
pub use config::AnalyticsConfig;
pub use types::{
    ApiResponse, Holding, IndicatorPoint, IndicatorSeries, Insight, PricePoint, PriceSeries,
    Recommendation, RiskLevel, RiskMetrics, Sentiment,
};

// Re-export main functionality
pub use indicators::{rsi, sma, TechnicalSnapshot};
pub use insight::{generate_insight, InsightInput, PriceAlert};
pub use portfolio::{
    aggregate, calculate_performance, HoldingValuation, MarketSignals, PerformanceWindow,
    PortfolioSnapshot, PortfolioTotals,
};
pub use risk::{beta, calculate_risk_metrics, max_drawdown, sharpe_ratio, RiskParams};
pub use series::{returns, window};

/// Error types for equity-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Degenerate series: {0}")]
    DegenerateSeries(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for equity-core operations.
pub type Result<T> = std::result::Result<T, Error>;
