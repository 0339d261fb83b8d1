//! Simple Moving Average (SMA) indicator.

use crate::series::window;
use crate::types::{IndicatorPoint, IndicatorSeries, PriceSeries};
use crate::{Error, Result};

/// Calculate Simple Moving Average of closing prices.
///
/// Each output point is the arithmetic mean of the trailing `period` closes
/// and carries the timestamp of the last close in its window.
///
/// # Arguments
///
/// * `series` - Price series
/// * `period` - Lookback period (must be positive)
///
/// # Returns
///
/// `len(series) - period + 1` points, or an empty series when the history
/// is shorter than `period`.
///
/// # Example
///
/// ```rust
/// use equity_core::indicators::sma;
/// use equity_core::types::PriceSeries;
///
/// let series = PriceSeries::from_closes(0, 86_400, &[10.0, 11.0, 12.0, 11.0, 10.0]).unwrap();
/// let sma_values = sma(&series, 3).unwrap();
///
/// // First window = (10 + 11 + 12) / 3 = 11.0
/// assert!((sma_values.values()[0] - 11.0).abs() < 0.001);
/// assert_eq!(sma_values.len(), 3);
/// ```
pub fn sma(series: &PriceSeries, period: usize) -> Result<IndicatorSeries> {
    if period == 0 {
        return Err(Error::InvalidInput("SMA period must be positive".to_string()));
    }

    let points = window(series, period)?
        .map(|w| {
            let sum: f64 = w.iter().map(|p| p.close).sum();
            IndicatorPoint {
                timestamp: w[period - 1].timestamp,
                value: sum / period as f64,
            }
        })
        .collect();

    Ok(IndicatorSeries::new(points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn daily(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes(0, 86_400, closes).unwrap()
    }

    #[test]
    fn test_sma_basic() {
        let result = sma(&daily(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3).unwrap();
        let values = result.values();

        // (1 + 2 + 3) / 3, (2 + 3 + 4) / 3, (3 + 4 + 5) / 3
        assert_eq!(values.len(), 3);
        assert_relative_eq!(values[0], 2.0);
        assert_relative_eq!(values[1], 3.0);
        assert_relative_eq!(values[2], 4.0);
    }

    #[test]
    fn test_sma_timestamps_align_to_window_end() {
        let result = sma(&daily(&[1.0, 2.0, 3.0, 4.0]), 2).unwrap();
        let timestamps: Vec<i64> = result.points().iter().map(|p| p.timestamp).collect();
        assert_eq!(timestamps, vec![86_400, 2 * 86_400, 3 * 86_400]);
    }

    #[test]
    fn test_sma_constant_series() {
        let series = daily(&[42.5; 30]);
        for k in 1..=30 {
            let result = sma(&series, k).unwrap();
            assert_eq!(result.len(), 30 - k + 1);
            for value in result.values() {
                assert_relative_eq!(value, 42.5, max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn test_sma_period_1() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&daily(&data), 1).unwrap();
        assert_eq!(result.values(), data.to_vec());
    }

    #[test]
    fn test_sma_period_larger_than_data() {
        let result = sma(&daily(&[1.0, 2.0, 3.0]), 10).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_sma_zero_period() {
        assert!(matches!(
            sma(&daily(&[1.0, 2.0]), 0),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_sma_empty_series() {
        assert!(sma(&PriceSeries::default(), 3).unwrap().is_empty());
    }

    #[test]
    fn test_sma_idempotent() {
        let series = daily(&[10.1, 10.7, 9.9, 11.3, 12.0, 11.8]);
        let first = sma(&series, 3).unwrap();
        let second = sma(&series, 3).unwrap();
        assert_eq!(first, second);
    }
}
