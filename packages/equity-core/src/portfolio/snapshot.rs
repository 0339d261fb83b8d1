//! Full portfolio snapshot: totals plus per-holding risk and insight.

use super::aggregate::{aggregate, HoldingValuation, PortfolioTotals};
use crate::insight::{InsightInput, InsightRules};
use crate::types::{Insight, RiskMetrics};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Analysis of one holding within a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HoldingReport {
    pub symbol: String,
    pub sector: String,
    pub current_price: f64,
    pub current_value: f64,
    pub investment: f64,
    pub pnl: f64,
    pub pnl_percent: f64,
    pub net_change_percent: f64,
    /// Share of total portfolio value, in percent
    pub weight_percent: f64,
    pub price_target: f64,
    pub risk: RiskMetrics,
    pub insight: Insight,
}

/// Derived view of a portfolio at one point in time. Never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioSnapshot {
    #[serde(flatten)]
    pub totals: PortfolioTotals,
    pub per_holding: BTreeMap<String, HoldingReport>,
}

impl PortfolioSnapshot {
    /// Aggregate the valuations and classify every holding.
    pub fn build(valuations: &[HoldingValuation], rules: &InsightRules) -> Result<Self> {
        let totals = aggregate(valuations)?;

        let per_holding = valuations
            .iter()
            .map(|v| {
                let insight = rules.generate(&InsightInput {
                    pnl_percent: v.pnl_percent(),
                    net_change_percent: v.net_change_percent(),
                    current_price: v.current_price,
                    sma_short: v.signals.sma_short,
                });
                let report = HoldingReport {
                    symbol: v.holding.symbol.clone(),
                    sector: v.holding.sector.clone(),
                    current_price: v.current_price,
                    current_value: v.value(),
                    investment: v.investment(),
                    pnl: v.pnl(),
                    pnl_percent: v.pnl_percent(),
                    net_change_percent: v.net_change_percent(),
                    weight_percent: v.value() / totals.total_value * 100.0,
                    price_target: v.price_target(),
                    risk: v.risk,
                    insight,
                };
                (report.symbol.clone(), report)
            })
            .collect();

        Ok(Self {
            totals,
            per_holding,
        })
    }

    /// Holdings with the highest net change, best first.
    pub fn top_performers(&self, n: usize) -> Vec<&HoldingReport> {
        let mut reports: Vec<&HoldingReport> = self.per_holding.values().collect();
        reports.sort_by(|a, b| b.net_change_percent.total_cmp(&a.net_change_percent));
        reports.truncate(n);
        reports
    }

    /// Holdings with the lowest net change, worst first.
    pub fn underperformers(&self, n: usize) -> Vec<&HoldingReport> {
        let mut reports: Vec<&HoldingReport> = self.per_holding.values().collect();
        reports.sort_by(|a, b| a.net_change_percent.total_cmp(&b.net_change_percent));
        reports.truncate(n);
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::MarketSignals;
    use crate::types::{Holding, Recommendation, RiskLevel, Sentiment};
    use approx::assert_relative_eq;

    fn risk() -> RiskMetrics {
        RiskMetrics {
            mean_return: 0.0005,
            std_dev: 0.015,
            annualized_volatility: 0.015 * 252.0_f64.sqrt(),
            sharpe_ratio: 0.02,
            max_drawdown: 0.12,
            beta: Some(0.9),
        }
    }

    fn valuation(symbol: &str, avg: f64, price: f64, net_change: f64) -> HoldingValuation {
        HoldingValuation::new(
            Holding::new(symbol, 10.0, avg, Some("IT")).unwrap(),
            price,
            risk(),
        )
        .with_signals(MarketSignals {
            net_change_percent: Some(net_change),
            day_change_percent: 0.0,
            sma_short: Some(avg),
        })
    }

    fn sample() -> Vec<HoldingValuation> {
        vec![
            valuation("INFY", 100.0, 85.0, 12.0),
            valuation("TCS", 100.0, 125.0, 3.0),
            valuation("WIPRO", 100.0, 102.0, -7.0),
            valuation("HCLTECH", 100.0, 101.0, 6.0),
        ]
    }

    #[test]
    fn test_build_snapshot() {
        let snapshot = PortfolioSnapshot::build(&sample(), &InsightRules::default()).unwrap();

        assert_relative_eq!(snapshot.totals.total_value, 4130.0);
        assert_relative_eq!(snapshot.totals.total_investment, 4000.0);
        assert_eq!(snapshot.per_holding.len(), 4);

        let infy = &snapshot.per_holding["INFY"];
        assert_relative_eq!(infy.pnl_percent, -15.0, epsilon = 1e-9);
        assert_eq!(infy.insight.recommendation, Recommendation::AverageDown);
        assert_eq!(infy.insight.risk_level, RiskLevel::High);
        assert_eq!(infy.insight.sentiment, Sentiment::Negative);
        assert_eq!(infy.risk, risk());

        let tcs = &snapshot.per_holding["TCS"];
        assert_eq!(tcs.insight.recommendation, Recommendation::BookProfits);
        assert_eq!(tcs.insight.risk_level, RiskLevel::Low);
        assert_eq!(tcs.insight.sentiment, Sentiment::Positive);
        assert_eq!(tcs.insight.performance_sentiment, Sentiment::Positive);

        let wipro = &snapshot.per_holding["WIPRO"];
        assert_eq!(wipro.insight.recommendation, Recommendation::Hold);
        assert_eq!(wipro.insight.risk_level, RiskLevel::Medium);

        let weights: f64 = snapshot.per_holding.values().map(|r| r.weight_percent).sum();
        assert_relative_eq!(weights, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rankings() {
        let snapshot = PortfolioSnapshot::build(&sample(), &InsightRules::default()).unwrap();

        let top: Vec<&str> = snapshot
            .top_performers(3)
            .iter()
            .map(|r| r.symbol.as_str())
            .collect();
        assert_eq!(top, vec!["INFY", "HCLTECH", "TCS"]);

        let bottom: Vec<&str> = snapshot
            .underperformers(2)
            .iter()
            .map(|r| r.symbol.as_str())
            .collect();
        assert_eq!(bottom, vec!["WIPRO", "TCS"]);

        assert_eq!(snapshot.top_performers(10).len(), 4);
    }

    #[test]
    fn test_snapshot_serializes_flat() {
        let snapshot = PortfolioSnapshot::build(&sample(), &InsightRules::default()).unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();

        assert!(json.get("total_value").is_some());
        assert!(json.get("sector_allocation").is_some());
        assert!(json["per_holding"]["TCS"]["insight"]["recommendation"] == "book_profits");
    }
}
