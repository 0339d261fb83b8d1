//! Rule-based insight generation.
//!
//! Turns per-holding numbers into discrete signals using one ordered rule
//! table per concern:
//!
//! | Concern              | Input                    | Rules (first match wins)                     |
//! |----------------------|--------------------------|----------------------------------------------|
//! | Recommendation       | P&L %                    | `<= -10` average down, `>= 20` book profits, else hold |
//! | Risk tier            | `abs(net change %)`      | `> 10` high, `> 5` medium, else low          |
//! | Performance sentiment| P&L %                    | `> 0` positive, else negative                |
//! | Technical sentiment  | price - short SMA        | `> 0` positive, else negative; neutral without SMA |
//!
//! Thresholds come from [`InsightThresholds`].

mod alerts;
mod rules;

pub use alerts::{triggered_alerts, AlertCondition, PriceAlert};
pub use rules::{Condition, Rule, RuleTable};

use crate::config::InsightThresholds;
use crate::types::{Insight, Recommendation, RiskLevel, Sentiment};
use serde::{Deserialize, Serialize};

/// Numbers an insight is derived from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct InsightInput {
    /// Unrealized P&L percentage since purchase
    pub pnl_percent: f64,
    /// Net price change percentage reported for the holding
    pub net_change_percent: f64,
    pub current_price: f64,
    /// Short SMA, if there was enough history
    pub sma_short: Option<f64>,
}

/// The complete set of rule tables.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightRules {
    pub recommendation: RuleTable<Recommendation>,
    pub risk_tier: RuleTable<RiskLevel>,
    pub performance: RuleTable<Sentiment>,
    pub technical: RuleTable<Sentiment>,
}

impl InsightRules {
    pub fn from_thresholds(thresholds: &InsightThresholds) -> Self {
        Self {
            recommendation: RuleTable::new(
                vec![
                    Rule::new(
                        Condition::AtMost(thresholds.average_down_pnl_percent),
                        Recommendation::AverageDown,
                    ),
                    Rule::new(
                        Condition::AtLeast(thresholds.book_profits_pnl_percent),
                        Recommendation::BookProfits,
                    ),
                ],
                Recommendation::Hold,
            ),
            risk_tier: RuleTable::new(
                vec![
                    Rule::new(
                        Condition::Above(thresholds.high_risk_change_percent),
                        RiskLevel::High,
                    ),
                    Rule::new(
                        Condition::Above(thresholds.medium_risk_change_percent),
                        RiskLevel::Medium,
                    ),
                ],
                RiskLevel::Low,
            ),
            // Exactly zero change counts as negative
            performance: RuleTable::new(
                vec![Rule::new(Condition::Above(0.0), Sentiment::Positive)],
                Sentiment::Negative,
            ),
            technical: RuleTable::new(
                vec![Rule::new(Condition::Above(0.0), Sentiment::Positive)],
                Sentiment::Negative,
            ),
        }
    }

    /// Apply every table to one holding's numbers.
    pub fn generate(&self, input: &InsightInput) -> Insight {
        let sentiment = match input.sma_short {
            Some(avg) => self.technical.evaluate(input.current_price - avg),
            None => Sentiment::Neutral,
        };

        Insight {
            sentiment,
            performance_sentiment: self.performance.evaluate(input.pnl_percent),
            risk_level: self.risk_tier.evaluate(input.net_change_percent.abs()),
            recommendation: self.recommendation.evaluate(input.pnl_percent),
        }
    }
}

impl Default for InsightRules {
    fn default() -> Self {
        Self::from_thresholds(&InsightThresholds::default())
    }
}

/// Generate an insight with the given thresholds.
///
/// # Example
///
/// ```rust
/// use equity_core::config::InsightThresholds;
/// use equity_core::insight::{generate_insight, InsightInput};
/// use equity_core::types::{Recommendation, RiskLevel};
///
/// let input = InsightInput {
///     pnl_percent: -15.0,
///     net_change_percent: 12.0,
///     current_price: 850.0,
///     sma_short: None,
/// };
/// let insight = generate_insight(&input, &InsightThresholds::default());
///
/// assert_eq!(insight.recommendation, Recommendation::AverageDown);
/// assert_eq!(insight.risk_level, RiskLevel::High);
/// ```
pub fn generate_insight(input: &InsightInput, thresholds: &InsightThresholds) -> Insight {
    InsightRules::from_thresholds(thresholds).generate(input)
}
