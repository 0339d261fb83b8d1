//! Relative Strength Index (RSI) indicator.

use crate::types::{IndicatorPoint, IndicatorSeries, PriceSeries};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Conventional RSI lookback.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// RSI from smoothed average gain and loss.
/// No losses at all maps to 100 instead of dividing by zero.
#[inline]
fn calculate_rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// Calculate Wilder's Relative Strength Index over closing prices.
///
/// Formula:
/// 1. Price changes are split into gains and losses (both non-negative)
/// 2. The first `period` changes seed the average gain and average loss
/// 3. Each later change updates them with Wilder's smoothing:
///    `avg = (avg * (period - 1) + current) / period`
/// 4. RS = average_gain / average_loss
/// 5. RSI = 100 - (100 / (1 + RS))
///
/// # Arguments
///
/// * `series` - Price series
/// * `period` - Smoothing period (typically [`DEFAULT_RSI_PERIOD`])
///
/// # Returns
///
/// One RSI value (0-100) per price from index `period` onwards, i.e.
/// `len(series) - period` points. Fails with `InsufficientData` when
/// `len(series) <= period`.
///
/// # Example
///
/// ```rust
/// use equity_core::indicators::rsi;
/// use equity_core::types::PriceSeries;
///
/// let prices = [44.0, 44.25, 44.5, 43.75, 44.5, 44.25, 44.5, 44.0, 43.5, 44.0,
///               44.25, 44.0, 43.5, 44.0, 44.5, 44.25, 44.0];
/// let series = PriceSeries::from_closes(0, 86_400, &prices).unwrap();
/// let rsi_values = rsi(&series, 14).unwrap();
///
/// assert_eq!(rsi_values.len(), 3);
/// for value in rsi_values.values() {
///     assert!(value >= 0.0 && value <= 100.0);
/// }
/// ```
pub fn rsi(series: &PriceSeries, period: usize) -> Result<IndicatorSeries> {
    if period == 0 {
        return Err(Error::InvalidInput("RSI period must be positive".to_string()));
    }

    let points = series.points();
    let n = points.len();
    if n <= period {
        return Err(Error::InsufficientData(format!(
            "RSI({}) needs more than {} prices, got {}",
            period, period, n
        )));
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = points
        .windows(2)
        .map(|w| {
            let change = w[1].close - w[0].close;
            if change > 0.0 {
                (change, 0.0)
            } else {
                (0.0, -change)
            }
        })
        .unzip();

    // Seed with the simple average of the first `period` changes
    let mut avg_gain: f64 = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss: f64 = losses[..period].iter().sum::<f64>() / period as f64;

    let mut result = Vec::with_capacity(n - period);
    result.push(IndicatorPoint {
        timestamp: points[period].timestamp,
        value: calculate_rsi_value(avg_gain, avg_loss),
    });

    let smoothing = (period - 1) as f64;
    for i in period..gains.len() {
        avg_gain = (avg_gain * smoothing + gains[i]) / period as f64;
        avg_loss = (avg_loss * smoothing + losses[i]) / period as f64;

        result.push(IndicatorPoint {
            timestamp: points[i + 1].timestamp,
            value: calculate_rsi_value(avg_gain, avg_loss),
        });
    }

    Ok(IndicatorSeries::new(result))
}

/// Momentum zone of an RSI reading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RsiZone {
    Oversold,
    Neutral,
    Overbought,
}

impl RsiZone {
    /// Classify an RSI value. Boundary values are neutral.
    pub fn classify(value: f64, oversold: f64, overbought: f64) -> Self {
        if value < oversold {
            RsiZone::Oversold
        } else if value > overbought {
            RsiZone::Overbought
        } else {
            RsiZone::Neutral
        }
    }
}
