//! Immutable, time-ordered bar history.
//!
//! A [`Series`] is validated once at load time and never mutated afterwards;
//! loading a new dataset produces a new handle. Cloning is cheap, the bars
//! live behind an `Arc`.

use std::io::Read;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::models::indicators::Bar;

#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("bar {index}: timestamp {current} is earlier than previous timestamp {previous}")]
    Unordered {
        index: usize,
        previous: i64,
        current: i64,
    },

    #[error("bar {index}: duplicate timestamp {timestamp}")]
    DuplicateTimestamp { index: usize, timestamp: i64 },

    #[error("bar {index}: field {field} is not finite ({value})")]
    NonFinite {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("bar {index}: negative volume {volume}")]
    NegativeVolume { index: usize, volume: f64 },

    #[error("failed to parse bar data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read bar data: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct Series {
    bars: Arc<[Bar]>,
}

impl Series {
    /// Validate and freeze a batch of bars.
    ///
    /// Timestamps must be strictly ascending, every price and volume finite,
    /// and volume non-negative.
    pub fn load(bars: Vec<Bar>) -> Result<Self, SeriesError> {
        for (index, bar) in bars.iter().enumerate() {
            check_bar(index, bar)?;

            if index > 0 {
                let previous = bars[index - 1].timestamp;
                if bar.timestamp == previous {
                    return Err(SeriesError::DuplicateTimestamp {
                        index,
                        timestamp: bar.timestamp,
                    });
                }
                if bar.timestamp < previous {
                    return Err(SeriesError::Unordered {
                        index,
                        previous,
                        current: bar.timestamp,
                    });
                }
            }
        }

        debug!(bars = bars.len(), "Series loaded");
        Ok(Self { bars: bars.into() })
    }

    /// Parse a JSON array of bar records and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, SeriesError> {
        let bars: Vec<Bar> = serde_json::from_str(json)?;
        Self::load(bars)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SeriesError> {
        let bars: Vec<Bar> = serde_json::from_reader(reader)?;
        Self::load(bars)
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }
}

fn check_bar(index: usize, bar: &Bar) -> Result<(), SeriesError> {
    let fields = [
        ("open", bar.open),
        ("high", bar.high),
        ("low", bar.low),
        ("close", bar.close),
        ("volume", bar.volume),
    ];

    for (field, value) in fields {
        if !value.is_finite() {
            return Err(SeriesError::NonFinite {
                index,
                field,
                value,
            });
        }
    }

    if bar.volume < 0.0 {
        return Err(SeriesError::NegativeVolume {
            index,
            volume: bar.volume,
        });
    }

    Ok(())
}
