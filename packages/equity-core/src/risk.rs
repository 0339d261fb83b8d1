//! Statistical risk metrics.
//!
//! Provides mean return, standard deviation, annualized volatility, Sharpe
//! ratio, max drawdown and beta. Statistics are population statistics over
//! per-period simple returns.

use crate::series::{closes, returns};
use crate::types::{PriceSeries, RiskMetrics};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Standard deviations at or below this are treated as zero.
///
/// Identical returns computed in floating point can differ in the last bits,
/// which would otherwise produce an enormous Sharpe ratio or beta.
pub const ZERO_TOLERANCE: f64 = 1e-12;

/// Period conventions for annualization and excess return.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RiskParams {
    /// Return periods per year (252 trading days for daily data)
    pub periods_per_year: f64,
    /// Risk-free rate per period, in the same convention as the returns
    pub risk_free_rate: f64,
}

impl RiskParams {
    /// Create params from an already per-period risk-free rate.
    pub fn new(periods_per_year: f64, risk_free_rate: f64) -> Result<Self> {
        if !periods_per_year.is_finite() || periods_per_year <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "periods per year must be positive, got {}",
                periods_per_year
            )));
        }
        if !risk_free_rate.is_finite() {
            return Err(Error::InvalidInput(format!(
                "risk-free rate must be finite, got {}",
                risk_free_rate
            )));
        }
        Ok(Self {
            periods_per_year,
            risk_free_rate,
        })
    }

    /// Create params from an annual risk-free rate.
    ///
    /// The annual rate is divided by `periods_per_year` so that it can be
    /// compared with per-period mean returns.
    ///
    /// ```rust
    /// use equity_core::risk::RiskParams;
    ///
    /// let params = RiskParams::from_annual_rate(0.05, 252.0).unwrap();
    /// assert!((params.risk_free_rate - 0.05 / 252.0).abs() < 1e-15);
    /// ```
    pub fn from_annual_rate(annual_rate: f64, periods_per_year: f64) -> Result<Self> {
        if !periods_per_year.is_finite() || periods_per_year <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "periods per year must be positive, got {}",
                periods_per_year
            )));
        }
        Self::new(periods_per_year, annual_rate / periods_per_year)
    }
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            periods_per_year: 252.0,
            risk_free_rate: 0.05 / 252.0,
        }
    }
}

fn require_returns(returns: &[f64]) -> Result<()> {
    if returns.is_empty() {
        return Err(Error::InsufficientData(
            "return sequence is empty".to_string(),
        ));
    }
    Ok(())
}

/// Population mean of a return sequence.
pub fn mean_return(returns: &[f64]) -> Result<f64> {
    require_returns(returns)?;
    Ok(returns.iter().sum::<f64>() / returns.len() as f64)
}

/// Population variance of a return sequence.
pub fn variance(returns: &[f64]) -> Result<f64> {
    let mean = mean_return(returns)?;
    Ok(returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64)
}

/// Population standard deviation of a return sequence.
pub fn std_dev(returns: &[f64]) -> Result<f64> {
    Ok(variance(returns)?.sqrt())
}

/// Scale a per-period standard deviation to a yearly figure.
pub fn annualized_volatility(std_dev: f64, periods_per_year: f64) -> f64 {
    std_dev * periods_per_year.sqrt()
}

/// Calculate the per-period Sharpe ratio.
///
/// # Arguments
///
/// * `returns` - Per-period returns
/// * `risk_free_rate` - Risk-free rate for the same period; convert an
///   annual rate with [`RiskParams::from_annual_rate`] first
///
/// # Returns
///
/// `(mean - risk_free_rate) / std_dev`, or `DegenerateSeries` when the
/// returns have no dispersion.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> Result<f64> {
    let mean = mean_return(returns)?;
    let std = std_dev(returns)?;

    if std <= ZERO_TOLERANCE {
        return Err(Error::DegenerateSeries(
            "standard deviation of returns is zero".to_string(),
        ));
    }

    Ok((mean - risk_free_rate) / std)
}

/// Calculate maximum drawdown of closing prices.
///
/// Tracks the running peak in a single pass and returns the largest
/// `(peak - price) / peak` observed, in `[0, 1]`. A single price has no
/// drawdown.
///
/// # Example
///
/// ```rust
/// use equity_core::risk::max_drawdown;
/// use equity_core::types::PriceSeries;
///
/// let series = PriceSeries::from_closes(0, 86_400, &[100.0, 120.0, 90.0, 110.0]).unwrap();
/// assert!((max_drawdown(&series).unwrap() - 0.25).abs() < 1e-12);
/// ```
pub fn max_drawdown(series: &PriceSeries) -> Result<f64> {
    let prices = closes(series);
    let first = *prices
        .first()
        .ok_or_else(|| Error::InsufficientData("series is empty".to_string()))?;

    let mut peak = first;
    let mut max_drawdown = 0.0;

    for &price in &prices {
        if price > peak {
            peak = price;
        }
        let drawdown = (peak - price) / peak;
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
        }
    }

    Ok(max_drawdown)
}

/// Population covariance of two equally long return sequences.
pub fn covariance(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    let mean_a = mean_return(a)?;
    let mean_b = mean_return(b)?;

    Ok(a.iter()
        .zip(b)
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum::<f64>()
        / a.len() as f64)
}

/// Calculate beta of an asset against a benchmark.
///
/// `beta = cov(asset, benchmark) / var(benchmark)`
///
/// Fails with `LengthMismatch` for sequences of different length and
/// `DegenerateSeries` when the benchmark does not move.
pub fn beta(asset_returns: &[f64], benchmark_returns: &[f64]) -> Result<f64> {
    let cov = covariance(asset_returns, benchmark_returns)?;
    let bench_var = variance(benchmark_returns)?;

    if bench_var.sqrt() <= ZERO_TOLERANCE {
        return Err(Error::DegenerateSeries(
            "benchmark variance is zero".to_string(),
        ));
    }

    Ok(cov / bench_var)
}

/// Calculate the full set of risk metrics for a price series.
///
/// # Arguments
///
/// * `series` - Asset price series (at least two prices)
/// * `benchmark` - Optional benchmark series of equal length, for beta
/// * `params` - Annualization and per-period risk-free rate
pub fn calculate_risk_metrics(
    series: &PriceSeries,
    benchmark: Option<&PriceSeries>,
    params: &RiskParams,
) -> Result<RiskMetrics> {
    let asset_returns = returns(series)?;

    let mean = mean_return(&asset_returns)?;
    let std = std_dev(&asset_returns)?;
    let sharpe = sharpe_ratio(&asset_returns, params.risk_free_rate)?;
    let drawdown = max_drawdown(series)?;

    let beta = match benchmark {
        Some(bench) => {
            if bench.len() != series.len() {
                return Err(Error::LengthMismatch {
                    left: series.len(),
                    right: bench.len(),
                });
            }
            Some(beta(&asset_returns, &returns(bench)?)?)
        }
        None => None,
    };

    let metrics = RiskMetrics {
        mean_return: mean,
        std_dev: std,
        annualized_volatility: annualized_volatility(std, params.periods_per_year),
        sharpe_ratio: sharpe,
        max_drawdown: drawdown,
        beta,
    };

    tracing::debug!(
        points = series.len(),
        volatility = metrics.annualized_volatility,
        sharpe = metrics.sharpe_ratio,
        max_drawdown = metrics.max_drawdown,
        "calculated risk metrics"
    );

    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn daily(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes(0, 86_400, closes).unwrap()
    }

    #[test]
    fn test_mean_and_std() {
        let r = [0.01, -0.01, 0.02, -0.02];
        assert_relative_eq!(mean_return(&r).unwrap(), 0.0, epsilon = 1e-15);
        // variance = (0.0001 + 0.0001 + 0.0004 + 0.0004) / 4 = 0.00025
        assert_relative_eq!(variance(&r).unwrap(), 0.00025, epsilon = 1e-15);
        assert_relative_eq!(std_dev(&r).unwrap(), 0.00025_f64.sqrt(), epsilon = 1e-15);
    }

    #[test]
    fn test_empty_returns() {
        assert!(matches!(mean_return(&[]), Err(Error::InsufficientData(_))));
        assert!(matches!(std_dev(&[]), Err(Error::InsufficientData(_))));
        assert!(matches!(sharpe_ratio(&[], 0.0), Err(Error::InsufficientData(_))));
    }

    #[test]
    fn test_annualized_volatility() {
        assert_relative_eq!(annualized_volatility(0.01, 252.0), 0.01 * 252.0_f64.sqrt());
        assert_relative_eq!(annualized_volatility(0.01, 250.0), 0.01 * 250.0_f64.sqrt());
    }

    #[test]
    fn test_sharpe_ratio() {
        let r = [0.01, -0.01, 0.02, -0.02, 0.03];
        let mean = mean_return(&r).unwrap();
        let std = std_dev(&r).unwrap();

        let sharpe = sharpe_ratio(&r, 0.001).unwrap();
        assert_relative_eq!(sharpe, (mean - 0.001) / std);

        // Higher risk-free rate lowers the ratio
        assert!(sharpe_ratio(&r, 0.005).unwrap() < sharpe);
    }

    #[test]
    fn test_sharpe_identical_returns_is_degenerate() {
        let r: Vec<f64> = (0..100).map(|_| 0.001).collect();
        assert!(matches!(
            sharpe_ratio(&r, 0.0),
            Err(Error::DegenerateSeries(_))
        ));

        // Geometric growth gives identical returns up to rounding
        let prices: Vec<f64> = (0..50).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let result = calculate_risk_metrics(&daily(&prices), None, &RiskParams::default());
        assert!(matches!(result, Err(Error::DegenerateSeries(_))));
    }

    #[test]
    fn test_max_drawdown() {
        let mdd = max_drawdown(&daily(&[100.0, 120.0, 90.0, 110.0])).unwrap();
        assert_relative_eq!(mdd, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_max_drawdown_edge_cases() {
        assert_eq!(max_drawdown(&daily(&[100.0])).unwrap(), 0.0);
        assert_eq!(max_drawdown(&daily(&[1.0, 2.0, 3.0])).unwrap(), 0.0);
        assert!(matches!(
            max_drawdown(&PriceSeries::default()),
            Err(Error::InsufficientData(_))
        ));

        // Deepest trough after a later, higher peak
        let mdd = max_drawdown(&daily(&[100.0, 80.0, 150.0, 75.0, 140.0])).unwrap();
        assert_relative_eq!(mdd, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_beta() {
        let bench = [0.01, -0.02, 0.015, 0.005, -0.01];
        let asset: Vec<f64> = bench.iter().map(|r| r * 2.0).collect();
        assert_relative_eq!(beta(&asset, &bench).unwrap(), 2.0, epsilon = 1e-12);

        let inverse: Vec<f64> = bench.iter().map(|r| -r).collect();
        assert_relative_eq!(beta(&inverse, &bench).unwrap(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_beta_length_mismatch() {
        let result = beta(&[0.01, 0.02, 0.03], &[0.01, 0.02]);
        assert!(matches!(
            result,
            Err(Error::LengthMismatch { left: 3, right: 2 })
        ));
    }

    #[test]
    fn test_beta_flat_benchmark() {
        let result = beta(&[0.01, 0.02, -0.01], &[0.0, 0.0, 0.0]);
        assert!(matches!(result, Err(Error::DegenerateSeries(_))));
    }

    #[test]
    fn test_calculate_risk_metrics() {
        let series = daily(&[100.0, 102.0, 99.0, 104.0, 101.0, 107.0, 105.0]);
        let bench = daily(&[1000.0, 1010.0, 995.0, 1020.0, 1005.0, 1030.0, 1025.0]);
        let params = RiskParams::from_annual_rate(0.05, 252.0).unwrap();

        let metrics = calculate_risk_metrics(&series, Some(&bench), &params).unwrap();
        let r = returns(&series).unwrap();

        assert_relative_eq!(metrics.mean_return, mean_return(&r).unwrap());
        assert_relative_eq!(metrics.std_dev, std_dev(&r).unwrap());
        assert_relative_eq!(
            metrics.annualized_volatility,
            metrics.std_dev * 252.0_f64.sqrt()
        );
        assert_relative_eq!(
            metrics.sharpe_ratio,
            (metrics.mean_return - 0.05 / 252.0) / metrics.std_dev
        );
        assert!(metrics.max_drawdown > 0.0 && metrics.max_drawdown < 1.0);
        assert!(metrics.beta.unwrap() > 0.0);
    }

    #[test]
    fn test_calculate_risk_metrics_benchmark_mismatch() {
        let series = daily(&[100.0, 102.0, 99.0, 104.0]);
        let bench = daily(&[1000.0, 1010.0, 995.0]);
        let result = calculate_risk_metrics(&series, Some(&bench), &RiskParams::default());
        assert!(matches!(result, Err(Error::LengthMismatch { .. })));
    }

    #[test]
    fn test_calculate_risk_metrics_insufficient() {
        let result = calculate_risk_metrics(&daily(&[100.0]), None, &RiskParams::default());
        assert!(matches!(result, Err(Error::InsufficientData(_))));
    }

    #[test]
    fn test_risk_params() {
        let params = RiskParams::from_annual_rate(0.06, 250.0).unwrap();
        assert_relative_eq!(params.risk_free_rate, 0.06 / 250.0);
        assert!(RiskParams::from_annual_rate(0.05, 0.0).is_err());
        assert!(RiskParams::new(252.0, f64::NAN).is_err());
    }

    #[test]
    fn test_idempotent() {
        let series = daily(&[50.0, 51.5, 49.8, 52.3, 53.1, 50.9]);
        let params = RiskParams::default();
        let a = calculate_risk_metrics(&series, None, &params).unwrap();
        let b = calculate_risk_metrics(&series, None, &params).unwrap();
        assert_eq!(a.sharpe_ratio.to_bits(), b.sharpe_ratio.to_bits());
        assert_eq!(a.std_dev.to_bits(), b.std_dev.to_bits());
        assert_eq!(a, b);
    }
}
