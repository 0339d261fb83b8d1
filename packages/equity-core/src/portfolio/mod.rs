//! Portfolio aggregation module.
//!
//! Provides totals, sector allocation, value-weighted risk, performance
//! windows and full snapshots. Prices and historical values are supplied by
//! the caller; nothing here fetches or stores data.

mod aggregate;
mod performance;
mod snapshot;

pub use aggregate::{aggregate, HoldingValuation, MarketSignals, PortfolioTotals};
pub use performance::{
    calculate_performance, holding_period_return, standard_windows, PerformanceInput,
    PerformanceWindow, STANDARD_WINDOWS,
};
pub use snapshot::{HoldingReport, PortfolioSnapshot};
