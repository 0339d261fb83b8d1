//! Core data types for equity analytics.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sector assigned to holdings that do not declare one.
pub const DEFAULT_SECTOR: &str = "Other";

/// A single OHLCV observation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    /// Epoch seconds
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PricePoint {
    /// Create a point where open, high and low equal the close.
    pub fn from_close(timestamp: i64, close: f64) -> Self {
        Self {
            timestamp,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }

    /// Timestamp as a UTC datetime, if it is representable.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    fn validate(&self) -> Result<()> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidInput(format!(
                    "{} must be a positive number at timestamp {}, got {}",
                    name, self.timestamp, value
                )));
            }
        }
        // low <= open, close <= high
        let in_range = |v: f64| self.low <= v && v <= self.high;
        if !in_range(self.open) || !in_range(self.close) {
            return Err(Error::InvalidInput(format!(
                "bar at timestamp {} has open {} / close {} outside low {} .. high {}",
                self.timestamp, self.open, self.close, self.low, self.high
            )));
        }
        Ok(())
    }
}

/// An ordered price history, strictly increasing by timestamp.
///
/// Gaps between timestamps are allowed and never interpolated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, validating ordering and prices.
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        for point in &points {
            point.validate()?;
        }
        if let Some(pair) = points.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
            return Err(Error::InvalidInput(format!(
                "timestamps must be strictly increasing: {} is followed by {}",
                pair[0].timestamp, pair[1].timestamp
            )));
        }
        Ok(Self { points })
    }

    /// Build a close-only series with evenly spaced timestamps.
    ///
    /// # Arguments
    ///
    /// * `start` - Timestamp of the first close (epoch seconds)
    /// * `step` - Seconds between consecutive closes
    /// * `closes` - Closing prices, oldest first
    pub fn from_closes(start: i64, step: i64, closes: &[f64]) -> Result<Self> {
        if step <= 0 {
            return Err(Error::InvalidInput(format!(
                "timestamp step must be positive, got {}",
                step
            )));
        }
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                i64::try_from(i)
                    .ok()
                    .and_then(|i| step.checked_mul(i))
                    .and_then(|offset| start.checked_add(offset))
                    .map(|timestamp| PricePoint::from_close(timestamp, close))
                    .ok_or_else(|| {
                        Error::InvalidInput(format!(
                            "timestamp overflows at index {} (start {}, step {})",
                            i, start, step
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(points)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent observation.
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}

impl TryFrom<Vec<PricePoint>> for PriceSeries {
    type Error = Error;

    fn try_from(points: Vec<PricePoint>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<PriceSeries> for Vec<PricePoint> {
    fn from(series: PriceSeries) -> Self {
        series.points
    }
}

/// One value of a derived indicator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: i64,
    pub value: f64,
}

/// Indicator output aligned to the timestamps of its source series.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct IndicatorSeries {
    points: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn new(points: Vec<IndicatorPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[IndicatorPoint] {
        &self.points
    }

    /// Values without timestamps.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent indicator value.
    pub fn last_value(&self) -> Option<f64> {
        self.points.last().map(|p| p.value)
    }
}

/// A single portfolio position.
///
/// Deserialization goes through [`Holding::new`], so stored data gets the
/// same symbol and sector normalization as constructed holdings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawHolding")]
pub struct Holding {
    /// Ticker symbol (uppercase)
    pub symbol: String,
    /// Number of shares held
    pub quantity: f64,
    /// Average purchase price per share
    pub avg_price: f64,
    /// Sector bucket used for allocation
    pub sector: String,
}

/// Holding as it appears on the wire, before normalization.
#[derive(Deserialize)]
struct RawHolding {
    symbol: String,
    quantity: f64,
    avg_price: f64,
    #[serde(default)]
    sector: Option<String>,
}

impl TryFrom<RawHolding> for Holding {
    type Error = Error;

    fn try_from(raw: RawHolding) -> Result<Self> {
        Self::new(&raw.symbol, raw.quantity, raw.avg_price, raw.sector.as_deref())
    }
}

impl Holding {
    /// Create a holding. A missing or blank sector becomes `"Other"`.
    pub fn new(symbol: &str, quantity: f64, avg_price: f64, sector: Option<&str>) -> Result<Self> {
        let holding = Self {
            symbol: symbol.trim().to_uppercase(),
            quantity,
            avg_price,
            sector: sector
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_SECTOR)
                .to_string(),
        };
        holding.validate()?;
        Ok(holding)
    }

    /// Check the invariants a holding store must uphold.
    pub fn validate(&self) -> Result<()> {
        if self.symbol.is_empty() {
            return Err(Error::InvalidInput("holding symbol is empty".to_string()));
        }
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "{}: quantity must be positive, got {}",
                self.symbol, self.quantity
            )));
        }
        if !self.avg_price.is_finite() || self.avg_price <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "{}: average price must be positive, got {}",
                self.symbol, self.avg_price
            )));
        }
        Ok(())
    }

    /// Amount originally invested (quantity * average price).
    pub fn investment(&self) -> f64 {
        self.quantity * self.avg_price
    }

    /// Market value at the given price.
    pub fn value_at(&self, price: f64) -> f64 {
        self.quantity * price
    }

    /// Unrealized P&L percentage at the given price.
    pub fn pnl_percent_at(&self, price: f64) -> f64 {
        (self.value_at(price) - self.investment()) / self.investment() * 100.0
    }
}

/// Statistical risk measures of one return sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RiskMetrics {
    /// Mean per-period simple return
    pub mean_return: f64,
    /// Population standard deviation of per-period returns
    pub std_dev: f64,
    /// `std_dev * sqrt(periods_per_year)`
    pub annualized_volatility: f64,
    /// Per-period excess return over standard deviation
    pub sharpe_ratio: f64,
    /// Largest peak-to-trough decline as a fraction of the peak, in [0, 1]
    pub max_drawdown: f64,
    /// Sensitivity to a benchmark, when one was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,
}

/// Direction of a signal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Risk tier derived from the magnitude of price movement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Suggested action for a holding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    AverageDown,
    BookProfits,
    Hold,
}

impl Recommendation {
    /// Human-readable wording.
    pub fn description(&self) -> &'static str {
        match self {
            Recommendation::AverageDown => "Consider averaging down",
            Recommendation::BookProfits => "Consider booking partial profits",
            Recommendation::Hold => "Hold position",
        }
    }
}

/// Classified outlook for a single holding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Insight {
    /// Technical sentiment: price relative to the short SMA
    pub sentiment: Sentiment,
    /// Performance sentiment: change since purchase
    pub performance_sentiment: Sentiment,
    pub risk_level: RiskLevel,
    pub recommendation: Recommendation,
}

/// API response wrapper for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
