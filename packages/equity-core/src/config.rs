//! Analytics configuration.
//!
//! Market conventions (trading calendar, risk-free rate) and rule thresholds
//! are read from a TOML file so the same engine can serve different markets.
//! Every section falls back to its defaults when omitted.

use crate::risk::RiskParams;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "EQUITY_CORE_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub risk: RiskSettings,
    pub indicators: IndicatorSettings,
    pub insight: InsightThresholds,
}

/// Annualization conventions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskSettings {
    /// Trading periods per year (252 for daily bars on most exchanges)
    pub trading_days_per_year: f64,
    /// Annual risk-free rate as a fraction (0.05 = 5%)
    pub annual_risk_free_rate: f64,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            trading_days_per_year: 252.0,
            annual_risk_free_rate: 0.05,
        }
    }
}

impl RiskSettings {
    /// Per-period risk parameters derived from the annual settings.
    pub fn risk_params(&self) -> Result<RiskParams> {
        RiskParams::from_annual_rate(self.annual_risk_free_rate, self.trading_days_per_year)
    }
}

/// Indicator periods and RSI zone bounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndicatorSettings {
    pub rsi_period: usize,
    pub short_sma_period: usize,
    pub long_sma_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            rsi_period: crate::indicators::DEFAULT_RSI_PERIOD,
            short_sma_period: 50,
            long_sma_period: 200,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
        }
    }
}

/// Thresholds for the insight rule tables, all in percent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InsightThresholds {
    /// P&L at or below this suggests averaging down
    pub average_down_pnl_percent: f64,
    /// P&L at or above this suggests booking profits
    pub book_profits_pnl_percent: f64,
    /// Absolute net change strictly above this is high risk
    pub high_risk_change_percent: f64,
    /// Absolute net change strictly above this is medium risk
    pub medium_risk_change_percent: f64,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            average_down_pnl_percent: -10.0,
            book_profits_pnl_percent: 20.0,
            high_risk_change_percent: 10.0,
            medium_risk_change_percent: 5.0,
        }
    }
}

impl AnalyticsConfig {
    /// Get the default config file path.
    ///
    /// Default path: `<config dir>/equity-core/config.toml`
    /// Can be overridden with the `EQUITY_CORE_CONFIG` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }

        directories::ProjectDirs::from("", "", "equity-core")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("equity-core.toml"))
    }

    /// Load from the default path.
    pub fn load_default() -> Result<Self> {
        Self::load(&Self::default_path())
    }

    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded analytics config");
        Ok(config)
    }

    /// Parse and validate TOML content.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that would make computations meaningless.
    pub fn validate(&self) -> Result<()> {
        self.risk.risk_params()?;

        let ind = &self.indicators;
        if ind.rsi_period == 0 || ind.short_sma_period == 0 || ind.long_sma_period == 0 {
            return Err(Error::InvalidInput(
                "indicator periods must be positive".to_string(),
            ));
        }
        if ind.rsi_oversold >= ind.rsi_overbought {
            return Err(Error::InvalidInput(format!(
                "rsi_oversold ({}) must be below rsi_overbought ({})",
                ind.rsi_oversold, ind.rsi_overbought
            )));
        }

        let ins = &self.insight;
        if ins.average_down_pnl_percent >= ins.book_profits_pnl_percent {
            return Err(Error::InvalidInput(
                "average_down_pnl_percent must be below book_profits_pnl_percent".to_string(),
            ));
        }
        if ins.medium_risk_change_percent > ins.high_risk_change_percent {
            return Err(Error::InvalidInput(
                "medium_risk_change_percent must not exceed high_risk_change_percent".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.risk.trading_days_per_year, 252.0);
        assert_eq!(config.risk.annual_risk_free_rate, 0.05);
        assert_eq!(config.indicators.rsi_period, 14);
        assert_eq!(config.indicators.short_sma_period, 50);
        assert_eq!(config.insight.average_down_pnl_percent, -10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = AnalyticsConfig::from_toml(
            r#"
            [risk]
            trading_days_per_year = 250

            [insight]
            book_profits_pnl_percent = 25.0
            "#,
        )
        .unwrap();

        assert_eq!(config.risk.trading_days_per_year, 250.0);
        assert_eq!(config.risk.annual_risk_free_rate, 0.05);
        assert_eq!(config.insight.book_profits_pnl_percent, 25.0);
        assert_eq!(config.insight.average_down_pnl_percent, -10.0);
        assert_eq!(config.indicators, IndicatorSettings::default());
    }

    #[test]
    fn test_risk_params_conversion() {
        let params = RiskSettings::default().risk_params().unwrap();
        assert_eq!(params.periods_per_year, 252.0);
        assert_relative_eq!(params.risk_free_rate, 0.05 / 252.0);
    }

    #[test]
    fn test_invalid_config() {
        let result = AnalyticsConfig::from_toml("[indicators]\nrsi_period = 0\n");
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result = AnalyticsConfig::from_toml("[risk]\ntrading_days_per_year = 0\n");
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result = AnalyticsConfig::from_toml("[risk]\ntrading_days_per_year = \"x\"\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let config = AnalyticsConfig::load(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, AnalyticsConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[indicators]\nshort_sma_period = 20\n").unwrap();

        let config = AnalyticsConfig::load(&path).unwrap();
        assert_eq!(config.indicators.short_sma_period, 20);
        assert_eq!(config.indicators.long_sma_period, 200);
    }
}
