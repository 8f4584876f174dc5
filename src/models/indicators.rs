use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// One OHLCV time step. `timestamp` is epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Read the field selected by `source`.
    pub fn value(&self, source: PriceSource) -> f64 {
        match source {
            PriceSource::Open => self.open,
            PriceSource::High => self.high,
            PriceSource::Low => self.low,
            PriceSource::Close => self.close,
            PriceSource::Volume => self.volume,
        }
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// Bar field feeding an indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Open,
    High,
    Low,
    #[default]
    Close,
    Volume,
}

impl PriceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceSource::Open => "open",
            PriceSource::High => "high",
            PriceSource::Low => "low",
            PriceSource::Close => "close",
            PriceSource::Volume => "volume",
        }
    }
}

/// Moving average kind for the basis line. Only the simple mean is supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaType {
    #[default]
    #[serde(rename = "SMA")]
    Sma,
}

/// Bollinger Bands parameters as edited in the settings panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BollingerConfig {
    pub length: usize,
    /// Standard deviation multiplier.
    pub std_dev: f64,
    /// Shift applied to the output; positive values move the bands later in time.
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub ma_type: MaType,
    #[serde(default)]
    pub source: PriceSource,
}

impl BollingerConfig {
    pub const DEFAULT_LENGTH: usize = 20;
    pub const DEFAULT_STD_DEV: f64 = 2.0;

    pub fn new(length: usize, std_dev: f64) -> Self {
        Self {
            length,
            std_dev,
            offset: 0,
            ma_type: MaType::Sma,
            source: PriceSource::Close,
        }
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }
}

impl Default for BollingerConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LENGTH, Self::DEFAULT_STD_DEV)
    }
}

/// Fully populated band values for one bar.
///
/// A band with any non-finite field serializes as `null`, so the wire never
/// carries a half-drawn band.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Band {
    pub basis: f64,
    pub upper: f64,
    pub lower: f64,
}

impl Band {
    /// Build the band from its basis and the half-width `std_dev * multiplier`.
    pub fn around(basis: f64, half_width: f64) -> Self {
        Self {
            basis,
            upper: basis + half_width,
            lower: basis - half_width,
        }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn is_finite(&self) -> bool {
        self.basis.is_finite() && self.upper.is_finite() && self.lower.is_finite()
    }
}

impl Serialize for Band {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if !self.is_finite() {
            return serializer.serialize_none();
        }
        let mut state = serializer.serialize_struct("Band", 3)?;
        state.serialize_field("basis", &self.basis)?;
        state.serialize_field("upper", &self.upper)?;
        state.serialize_field("lower", &self.lower)?;
        state.end()
    }
}

/// Output aligned 1:1 with a bar; `None` where no value can be computed.
pub type BandPoint = Option<Band>;
