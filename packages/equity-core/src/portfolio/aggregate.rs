//! Portfolio totals, sector allocation and value-weighted risk.

use crate::indicators::TechnicalSnapshot;
use crate::types::{Holding, RiskMetrics};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Market context for a holding supplied alongside its price.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarketSignals {
    /// Net change percentage reported by the quote source.
    /// Falls back to the holding's P&L percentage when absent.
    pub net_change_percent: Option<f64>,
    /// Today's price change percentage
    pub day_change_percent: f64,
    /// Short-period SMA of the holding's price, if available
    pub sma_short: Option<f64>,
}

impl MarketSignals {
    /// Take the short SMA from computed indicator readings.
    pub fn with_technical(mut self, technical: &TechnicalSnapshot) -> Self {
        self.sma_short = technical.sma_short;
        self
    }

    fn validate(&self, symbol: &str) -> Result<()> {
        let fields = [
            ("net change percent", self.net_change_percent),
            ("day change percent", Some(self.day_change_percent)),
            ("short SMA", self.sma_short),
        ];
        for (name, value) in fields {
            if let Some(v) = value.filter(|v| !v.is_finite()) {
                return Err(Error::InvalidInput(format!(
                    "{}: {} must be finite, got {}",
                    symbol, name, v
                )));
            }
        }
        Ok(())
    }
}

fn validate_risk(symbol: &str, risk: &RiskMetrics) -> Result<()> {
    let fields = [
        ("mean return", Some(risk.mean_return)),
        ("std dev", Some(risk.std_dev)),
        ("annualized volatility", Some(risk.annualized_volatility)),
        ("sharpe ratio", Some(risk.sharpe_ratio)),
        ("max drawdown", Some(risk.max_drawdown)),
        ("beta", risk.beta),
    ];
    for (name, value) in fields {
        if let Some(v) = value.filter(|v| !v.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "{}: {} must be finite, got {}",
                symbol, name, v
            )));
        }
    }
    Ok(())
}

/// A holding priced at the current quote, with its risk metrics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HoldingValuation {
    pub holding: Holding,
    pub current_price: f64,
    pub risk: RiskMetrics,
    #[serde(default)]
    pub signals: MarketSignals,
}

impl HoldingValuation {
    pub fn new(holding: Holding, current_price: f64, risk: RiskMetrics) -> Self {
        Self {
            holding,
            current_price,
            risk,
            signals: MarketSignals::default(),
        }
    }

    pub fn with_signals(mut self, signals: MarketSignals) -> Self {
        self.signals = signals;
        self
    }

    pub fn value(&self) -> f64 {
        self.holding.value_at(self.current_price)
    }

    pub fn investment(&self) -> f64 {
        self.holding.investment()
    }

    pub fn pnl(&self) -> f64 {
        self.value() - self.investment()
    }

    pub fn pnl_percent(&self) -> f64 {
        self.holding.pnl_percent_at(self.current_price)
    }

    pub fn net_change_percent(&self) -> f64 {
        self.signals
            .net_change_percent
            .unwrap_or_else(|| self.pnl_percent())
    }

    /// Simple momentum target: current price moved by the net change again.
    pub fn price_target(&self) -> f64 {
        self.current_price * (1.0 + self.net_change_percent() / 100.0)
    }

    fn validate(&self) -> Result<()> {
        self.holding.validate()?;
        if !self.current_price.is_finite() || self.current_price <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "{}: current price must be positive, got {}",
                self.holding.symbol, self.current_price
            )));
        }
        self.signals.validate(&self.holding.symbol)?;
        validate_risk(&self.holding.symbol, &self.risk)
    }
}

/// Portfolio-level figures derived from a set of valuations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioTotals {
    pub total_value: f64,
    pub total_investment: f64,
    pub total_pnl: f64,
    pub pnl_percentage: f64,
    /// Value change attributable to today's move
    pub day_change: f64,
    pub day_change_percent: f64,
    /// Sector -> percentage of total value
    pub sector_allocation: BTreeMap<String, f64>,
    /// Risk metrics weighted by each holding's share of total value
    pub aggregate_risk: RiskMetrics,
}

/// Aggregate holdings into portfolio totals.
///
/// Fails with `InvalidInput` for malformed or duplicate holdings and with
/// `DegenerateSeries` when there is nothing invested.
///
/// # Example
///
/// ```rust
/// use equity_core::portfolio::{aggregate, HoldingValuation};
/// use equity_core::types::{Holding, RiskMetrics};
///
/// let risk = RiskMetrics {
///     mean_return: 0.001,
///     std_dev: 0.02,
///     annualized_volatility: 0.3175,
///     sharpe_ratio: 0.04,
///     max_drawdown: 0.1,
///     beta: None,
/// };
/// let valuations = vec![
///     HoldingValuation::new(Holding::new("INFY", 10.0, 100.0, Some("IT")).unwrap(), 110.0, risk),
///     HoldingValuation::new(Holding::new("HDFCBANK", 5.0, 200.0, Some("Bank")).unwrap(), 190.0, risk),
/// ];
///
/// let totals = aggregate(&valuations).unwrap();
/// assert_eq!(totals.total_value, 2050.0);
/// assert_eq!(totals.total_pnl, 50.0);
/// assert_eq!(totals.pnl_percentage, 2.5);
/// ```
pub fn aggregate(valuations: &[HoldingValuation]) -> Result<PortfolioTotals> {
    let mut seen = HashSet::new();
    for valuation in valuations {
        valuation.validate()?;
        if !seen.insert(valuation.holding.symbol.as_str()) {
            return Err(Error::InvalidInput(format!(
                "duplicate holding: {}",
                valuation.holding.symbol
            )));
        }
    }

    let total_value: f64 = valuations.iter().map(|v| v.value()).sum();
    let total_investment: f64 = valuations.iter().map(|v| v.investment()).sum();

    if total_investment == 0.0 {
        return Err(Error::DegenerateSeries(
            "total investment is zero".to_string(),
        ));
    }
    if total_value == 0.0 {
        return Err(Error::DegenerateSeries("total value is zero".to_string()));
    }

    let total_pnl = total_value - total_investment;
    let day_change: f64 = valuations
        .iter()
        .map(|v| v.value() * v.signals.day_change_percent / 100.0)
        .sum();

    let totals = PortfolioTotals {
        total_value,
        total_investment,
        total_pnl,
        pnl_percentage: total_pnl / total_investment * 100.0,
        day_change,
        day_change_percent: day_change / total_value * 100.0,
        sector_allocation: sector_allocation(valuations, total_value),
        aggregate_risk: weighted_risk(valuations, total_value),
    };

    tracing::debug!(
        holdings = valuations.len(),
        total_value = totals.total_value,
        pnl_percentage = totals.pnl_percentage,
        "aggregated portfolio"
    );

    Ok(totals)
}

fn sector_allocation(valuations: &[HoldingValuation], total_value: f64) -> BTreeMap<String, f64> {
    let mut by_sector: BTreeMap<String, f64> = BTreeMap::new();
    for valuation in valuations {
        *by_sector
            .entry(valuation.holding.sector.clone())
            .or_default() += valuation.value();
    }

    by_sector
        .into_iter()
        .map(|(sector, value)| (sector, value / total_value * 100.0))
        .collect()
}

/// Value-weighted combination of per-holding risk metrics.
///
/// Beta is only reported when every holding carries one.
fn weighted_risk(valuations: &[HoldingValuation], total_value: f64) -> RiskMetrics {
    let weighted = |field: fn(&RiskMetrics) -> f64| -> f64 {
        valuations
            .iter()
            .map(|v| v.value() / total_value * field(&v.risk))
            .sum()
    };

    let beta = valuations
        .iter()
        .map(|v| v.risk.beta.map(|b| v.value() / total_value * b))
        .sum::<Option<f64>>();

    RiskMetrics {
        mean_return: weighted(|r| r.mean_return),
        std_dev: weighted(|r| r.std_dev),
        annualized_volatility: weighted(|r| r.annualized_volatility),
        sharpe_ratio: weighted(|r| r.sharpe_ratio),
        max_drawdown: weighted(|r| r.max_drawdown),
        beta,
    }
}
