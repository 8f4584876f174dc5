//! Market data provider interface.
//!
//! The chart works from a single batch of bars delivered once per session;
//! providers only need to produce that batch.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::models::indicators::Bar;
use crate::series::{Series, SeriesError};

pub trait MarketDataProvider {
    /// Load and validate the full bar history.
    fn load_series(&self) -> Result<Series, SeriesError>;
}

/// Reads a JSON array of bar records from disk.
pub struct StaticFileProvider {
    path: PathBuf,
}

impl StaticFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MarketDataProvider for StaticFileProvider {
    fn load_series(&self) -> Result<Series, SeriesError> {
        let file = File::open(&self.path)?;
        let series = Series::from_reader(BufReader::new(file))?;

        info!(
            path = %self.path.display(),
            bars = series.len(),
            first = ?series.first().and_then(|b| b.datetime()),
            last = ?series.last().and_then(|b| b.datetime()),
            "Loaded OHLCV data"
        );
        Ok(series)
    }
}

/// Serves bars that are already in memory.
pub struct InMemoryProvider {
    bars: Vec<Bar>,
}

impl InMemoryProvider {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars }
    }
}

impl MarketDataProvider for InMemoryProvider {
    fn load_series(&self) -> Result<Series, SeriesError> {
        Series::load(self.bars.clone())
    }
}
