//! Basic time-series transforms shared by the indicator and risk engines.

use crate::types::{IndicatorPoint, IndicatorSeries, PricePoint, PriceSeries};
use crate::{Error, Result};
use std::slice::Windows;

/// Seconds in one calendar day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Closing prices of a series, oldest first.
pub fn closes(series: &PriceSeries) -> Vec<f64> {
    series.points().iter().map(|p| p.close).collect()
}

/// Simple period-over-period returns of a price series.
///
/// `r[i] = (p[i+1] - p[i]) / p[i]`, so a series of length n yields n-1 returns.
///
/// # Example
///
/// ```rust
/// use equity_core::series::returns;
/// use equity_core::types::PriceSeries;
///
/// let series = PriceSeries::from_closes(0, 86_400, &[100.0, 110.0, 99.0]).unwrap();
/// let r = returns(&series).unwrap();
///
/// assert!((r[0] - 0.10).abs() < 1e-12);
/// assert!((r[1] + 0.10).abs() < 1e-12);
/// ```
pub fn returns(series: &PriceSeries) -> Result<Vec<f64>> {
    simple_returns(&closes(series))
}

/// Simple returns of a raw price slice.
///
/// Fails with `InsufficientData` for fewer than two prices and `InvalidInput`
/// for a non-positive price.
pub fn simple_returns(prices: &[f64]) -> Result<Vec<f64>> {
    if prices.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "need at least 2 prices for returns, got {}",
            prices.len()
        )));
    }
    if let Some(bad) = prices.iter().find(|p| !p.is_finite() || **p <= 0.0) {
        return Err(Error::InvalidInput(format!(
            "prices must be positive, got {}",
            bad
        )));
    }

    Ok(prices.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect())
}

/// Rebuild a price path from an initial price and a return sequence.
///
/// Inverse of [`simple_returns`]: the output has `returns.len() + 1` prices.
pub fn compound(initial: f64, returns: &[f64]) -> Vec<f64> {
    let mut prices = Vec::with_capacity(returns.len() + 1);
    prices.push(initial);
    let mut price = initial;
    for r in returns {
        price *= 1.0 + r;
        prices.push(price);
    }
    prices
}

/// Contiguous sub-sequences of exactly `size` points, oldest first.
///
/// The iterator borrows the series and can be cloned to restart it.
/// A `size` larger than the series yields nothing.
pub fn window(series: &PriceSeries, size: usize) -> Result<Windows<'_, PricePoint>> {
    if size == 0 {
        return Err(Error::InvalidInput("window size must be positive".to_string()));
    }
    Ok(series.points().windows(size))
}

/// Percentage change of each close relative to the first close.
///
/// Used to put several symbols on a common scale for comparison.
pub fn normalized_performance(series: &PriceSeries) -> Result<IndicatorSeries> {
    let first = series
        .points()
        .first()
        .ok_or_else(|| Error::InsufficientData("series is empty".to_string()))?
        .close;

    Ok(IndicatorSeries::new(
        series
            .points()
            .iter()
            .map(|p| IndicatorPoint {
                timestamp: p.timestamp,
                value: (p.close - first) / first * 100.0,
            })
            .collect(),
    ))
}

/// Close of the latest point at or before `timestamp`.
pub fn close_on_or_before(series: &PriceSeries, timestamp: i64) -> Option<f64> {
    let points = series.points();
    let idx = points.partition_point(|p| p.timestamp <= timestamp);
    idx.checked_sub(1).map(|i| points[i].close)
}

/// Close as of `days` calendar days before the most recent observation.
///
/// Returns `None` when the history does not reach back that far.
pub fn close_days_ago(series: &PriceSeries, days: u32) -> Option<f64> {
    let last = series.last()?;
    close_on_or_before(series, last.timestamp - i64::from(days) * SECONDS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn daily(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes(0, SECONDS_PER_DAY, closes).unwrap()
    }

    #[test]
    fn test_returns_basic() {
        let series = daily(&[100.0, 105.0, 94.5]);
        let r = returns(&series).unwrap();

        assert_eq!(r.len(), 2);
        assert_relative_eq!(r[0], 0.05, epsilon = 1e-12);
        assert_relative_eq!(r[1], -0.10, epsilon = 1e-12);
    }

    #[test]
    fn test_returns_insufficient_data() {
        let series = daily(&[100.0]);
        assert!(matches!(returns(&series), Err(Error::InsufficientData(_))));
        assert!(matches!(
            returns(&PriceSeries::default()),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn test_simple_returns_zero_price() {
        let result = simple_returns(&[100.0, 0.0, 50.0]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_returns_round_trip() {
        let prices = [250.0, 252.5, 249.1, 260.0, 255.75, 270.2, 268.0];
        let series = daily(&prices);
        let r = returns(&series).unwrap();
        assert_eq!(r.len(), prices.len() - 1);

        let rebuilt = compound(prices[0], &r);
        assert_eq!(rebuilt.len(), prices.len());
        for (a, b) in rebuilt.iter().zip(prices.iter()) {
            assert_relative_eq!(*a, *b, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_window_sizes() {
        let series = daily(&[1.0, 2.0, 3.0, 4.0]);

        let windows: Vec<_> = window(&series, 3).unwrap().collect();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0][0].close, 1.0);
        assert_eq!(windows[1][2].close, 4.0);

        assert_eq!(window(&series, 5).unwrap().count(), 0);
        assert!(matches!(window(&series, 0), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_window_restartable() {
        let series = daily(&[1.0, 2.0, 3.0]);
        let windows = window(&series, 2).unwrap();

        let first: Vec<f64> = windows.clone().map(|w| w[0].close).collect();
        let second: Vec<f64> = windows.map(|w| w[0].close).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_normalized_performance() {
        let series = daily(&[200.0, 210.0, 180.0]);
        let normalized = normalized_performance(&series).unwrap();

        assert_eq!(normalized.values(), vec![0.0, 5.0, -10.0]);
        assert!(normalized_performance(&PriceSeries::default()).is_err());
    }

    #[test]
    fn test_close_lookup() {
        let points = vec![
            PricePoint::from_close(0, 100.0),
            PricePoint::from_close(SECONDS_PER_DAY, 101.0),
            PricePoint::from_close(5 * SECONDS_PER_DAY, 110.0),
            PricePoint::from_close(8 * SECONDS_PER_DAY, 120.0),
        ];
        let series = PriceSeries::new(points).unwrap();

        assert_eq!(close_on_or_before(&series, -1), None);
        assert_eq!(close_on_or_before(&series, 3 * SECONDS_PER_DAY), Some(101.0));
        assert_eq!(close_on_or_before(&series, 5 * SECONDS_PER_DAY), Some(110.0));

        // Gap: 8 days back from day 8 is day 0, 7 days back is day 1
        assert_eq!(close_days_ago(&series, 8), Some(100.0));
        assert_eq!(close_days_ago(&series, 7), Some(101.0));
        assert_eq!(close_days_ago(&series, 9), None);
    }
}
