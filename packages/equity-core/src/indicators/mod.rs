//! Technical indicators for price analysis.
//!
//! This module provides the indicators used by the insight rules:
//!
//! - **SMA**: Simple Moving Average
//! - **RSI**: Wilder's Relative Strength Index
//!
//! Indicators are computed over a fully materialized series; there is no
//! incremental mode.

mod rsi;
mod sma;

pub use rsi::{rsi, RsiZone, DEFAULT_RSI_PERIOD};
pub use sma::sma;

use crate::config::IndicatorSettings;
use crate::types::PriceSeries;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Latest indicator readings for one symbol.
///
/// Each reading is `None` when the history is too short for its lookback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TechnicalSnapshot {
    /// Most recent close
    pub current_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_short: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_long: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi_zone: Option<RsiZone>,
}

impl TechnicalSnapshot {
    /// Compute the latest readings with the configured periods.
    pub fn from_series(series: &PriceSeries, settings: &IndicatorSettings) -> Result<Self> {
        let current_price = series
            .last()
            .ok_or_else(|| Error::InsufficientData("series is empty".to_string()))?
            .close;

        let sma_short = sma(series, settings.short_sma_period)?.last_value();
        let sma_long = sma(series, settings.long_sma_period)?.last_value();
        let rsi = match rsi(series, settings.rsi_period) {
            Ok(values) => values.last_value(),
            Err(Error::InsufficientData(_)) => None,
            Err(e) => return Err(e),
        };
        let rsi_zone =
            rsi.map(|v| RsiZone::classify(v, settings.rsi_oversold, settings.rsi_overbought));

        tracing::trace!(
            current_price,
            ?sma_short,
            ?sma_long,
            ?rsi,
            "technical snapshot"
        );

        Ok(Self {
            current_price,
            sma_short,
            sma_long,
            rsi,
            rsi_zone,
        })
    }

    /// Whether the price trades above the short SMA, if one is available.
    pub fn above_short_sma(&self) -> Option<bool> {
        self.sma_short.map(|avg| self.current_price > avg)
    }
}
