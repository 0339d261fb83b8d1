//! Price alert evaluation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Side of the target price that fires the alert.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    Above,
    Below,
}

/// A user-defined price threshold for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceAlert {
    pub symbol: String,
    pub target_price: f64,
    pub condition: AlertCondition,
}

impl PriceAlert {
    pub fn new(symbol: &str, target_price: f64, condition: AlertCondition) -> Result<Self> {
        if !target_price.is_finite() || target_price <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "alert target price must be positive, got {}",
                target_price
            )));
        }
        Ok(Self {
            symbol: symbol.trim().to_uppercase(),
            target_price,
            condition,
        })
    }

    /// Whether `price` reaches the target. The target itself counts as reached.
    pub fn is_triggered(&self, price: f64) -> bool {
        match self.condition {
            AlertCondition::Above => price >= self.target_price,
            AlertCondition::Below => price <= self.target_price,
        }
    }
}

/// Alerts whose symbol has a quote that reaches the target.
///
/// Alerts for symbols missing from `quotes` are skipped.
pub fn triggered_alerts<'a>(
    alerts: &'a [PriceAlert],
    quotes: &HashMap<String, f64>,
) -> Vec<&'a PriceAlert> {
    alerts
        .iter()
        .filter(|alert| {
            quotes
                .get(&alert.symbol)
                .is_some_and(|&price| alert.is_triggered(price))
        })
        .collect()
}
