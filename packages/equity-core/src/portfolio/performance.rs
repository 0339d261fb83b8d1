//! Time-windowed portfolio performance.

use crate::series::close_days_ago;
use crate::types::{Holding, PriceSeries};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Weekly, monthly and yearly lookbacks in calendar days.
pub const STANDARD_WINDOWS: [u32; 3] = [7, 30, 365];

/// A holding with its current price and the price `days` ago.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceInput {
    pub holding: Holding,
    pub current_price: f64,
    /// `None` when the price history does not reach back far enough
    pub past_price: Option<f64>,
}

impl PerformanceInput {
    /// Derive current and past prices from a price history.
    pub fn from_series(holding: Holding, series: &PriceSeries, days: u32) -> Result<Self> {
        let current_price = series
            .last()
            .ok_or_else(|| {
                Error::InsufficientData(format!("{}: price history is empty", holding.symbol))
            })?
            .close;

        Ok(Self {
            past_price: close_days_ago(series, days),
            holding,
            current_price,
        })
    }
}

/// Portfolio value change over a trailing window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PerformanceWindow {
    pub days: u32,
    pub start_value: f64,
    pub end_value: f64,
    pub change: f64,
    pub change_percent: f64,
    /// Holdings with enough history to be included
    pub holdings_included: usize,
}

/// Percentage change from `initial_value` to `final_value`.
pub fn holding_period_return(initial_value: f64, final_value: f64) -> Result<f64> {
    if initial_value == 0.0 {
        return Err(Error::DegenerateSeries("initial value is zero".to_string()));
    }
    Ok((final_value - initial_value) / initial_value * 100.0)
}

/// Calculate portfolio performance over the trailing `days`.
///
/// Both ends of the window value the same quantities, so the result is the
/// price effect on the current holdings. Holdings without a past price are
/// left out of both the start and end value.
pub fn calculate_performance(inputs: &[PerformanceInput], days: u32) -> Result<PerformanceWindow> {
    let mut start_value = 0.0;
    let mut end_value = 0.0;
    let mut holdings_included = 0;

    for input in inputs {
        input.holding.validate()?;
        let Some(past_price) = input.past_price else {
            tracing::warn!(
                symbol = %input.holding.symbol,
                days,
                "no price history for performance window, excluding holding"
            );
            continue;
        };
        for price in [input.current_price, past_price] {
            if !price.is_finite() || price <= 0.0 {
                return Err(Error::InvalidInput(format!(
                    "{}: prices must be positive, got {}",
                    input.holding.symbol, price
                )));
            }
        }

        start_value += input.holding.value_at(past_price);
        end_value += input.holding.value_at(input.current_price);
        holdings_included += 1;
    }

    let change_percent = holding_period_return(start_value, end_value).map_err(|_| {
        Error::DegenerateSeries(format!("no holding has a price {} days back", days))
    })?;

    Ok(PerformanceWindow {
        days,
        start_value,
        end_value,
        change: end_value - start_value,
        change_percent,
        holdings_included,
    })
}

/// Weekly, monthly and yearly performance from full price histories.
pub fn standard_windows(holdings: &[(Holding, PriceSeries)]) -> Result<Vec<PerformanceWindow>> {
    STANDARD_WINDOWS
        .iter()
        .map(|&days| {
            let inputs = holdings
                .iter()
                .map(|(holding, series)| PerformanceInput::from_series(holding.clone(), series, days))
                .collect::<Result<Vec<_>>>()?;
            calculate_performance(&inputs, days)
        })
        .collect()
}
