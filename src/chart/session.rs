//! Chart session state and its shared, async-safe wrapper.
//!
//! A session always holds a valid set of inputs together with the bands
//! computed from them. Rejected edits leave the previous state in place.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::chart::overlay::{build_overlay, ChartOverlay};
use crate::indicators::error::IndicatorError;
use crate::indicators::volatility::bollinger::{calculate_bollinger_bands, validate_config};
use crate::models::indicators::{BandPoint, BollingerConfig};
use crate::models::style::{BollingerStyles, StyleError};
use crate::series::Series;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    #[error(transparent)]
    Style(#[from] StyleError),

    #[error("band computation task failed: {0}")]
    Task(String),
}

/// Read-only view of the chart handed to the frontend.
///
/// `overlay` is `None` until the indicator has been added to the chart.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSnapshot {
    pub enabled: bool,
    pub inputs: BollingerConfig,
    pub styles: BollingerStyles,
    pub bars: usize,
    pub generation: u64,
    pub overlay: Option<ChartOverlay>,
}

#[derive(Debug, Clone)]
pub struct ChartSession {
    series: Series,
    enabled: bool,
    inputs: BollingerConfig,
    styles: BollingerStyles,
    bands: Arc<[BandPoint]>,
    generation: u64,
}

impl ChartSession {
    pub fn new(
        series: Series,
        inputs: BollingerConfig,
        styles: BollingerStyles,
    ) -> Result<Self, ChartError> {
        validate_config(&inputs)?;
        styles.validate()?;
        let bands = calculate_bollinger_bands(series.bars(), &inputs)?;

        Ok(Self {
            series,
            enabled: false,
            inputs,
            styles,
            bands: bands.into(),
            generation: 0,
        })
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    /// Whether the indicator is drawn on the chart.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn inputs(&self) -> &BollingerConfig {
        &self.inputs
    }

    pub fn styles(&self) -> &BollingerStyles {
        &self.styles
    }

    pub fn bands(&self) -> Arc<[BandPoint]> {
        self.bands.clone()
    }

    /// Generation of the inputs currently displayed.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Recompute synchronously with new inputs.
    pub fn apply_inputs(&mut self, inputs: BollingerConfig) -> Result<(), IndicatorError> {
        validate_config(&inputs)?;
        let bands = calculate_bollinger_bands(self.series.bars(), &inputs)?;
        self.commit(self.generation + 1, inputs, bands.into());
        Ok(())
    }

    pub fn set_styles(&mut self, styles: BollingerStyles) -> Result<(), StyleError> {
        styles.validate()?;
        self.styles = styles;
        Ok(())
    }

    /// Replace inputs and bands in one step, unless a newer generation has
    /// already been committed. Returns whether the result was applied.
    pub fn commit(
        &mut self,
        generation: u64,
        inputs: BollingerConfig,
        bands: Arc<[BandPoint]>,
    ) -> bool {
        if generation <= self.generation {
            return false;
        }
        self.inputs = inputs;
        self.bands = bands;
        self.generation = generation;
        true
    }

    pub fn overlay(&self) -> ChartOverlay {
        build_overlay(&self.bands, &self.inputs, &self.styles)
    }

    pub fn snapshot(&self) -> ChartSnapshot {
        ChartSnapshot {
            enabled: self.enabled,
            inputs: self.inputs,
            styles: self.styles.clone(),
            bars: self.series.len(),
            generation: self.generation,
            overlay: self.enabled.then(|| self.overlay()),
        }
    }
}

/// Inputs that passed validation and hold a generation, waiting for their
/// bands to be computed.
#[derive(Debug, Clone, Copy)]
pub struct PendingUpdate {
    generation: u64,
    inputs: BollingerConfig,
}

impl PendingUpdate {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn inputs(&self) -> &BollingerConfig {
        &self.inputs
    }
}

/// Session shared between request handlers.
///
/// Input updates compute on the blocking pool; when several are in flight
/// the one issued last wins, regardless of completion order.
pub struct SharedChart {
    session: RwLock<ChartSession>,
    issued: AtomicU64,
}

impl SharedChart {
    pub fn new(session: ChartSession) -> Self {
        let issued = AtomicU64::new(session.generation());
        Self {
            session: RwLock::new(session),
            issued,
        }
    }

    pub async fn snapshot(&self) -> ChartSnapshot {
        self.session.read().await.snapshot()
    }

    pub async fn series(&self) -> Series {
        self.session.read().await.series().clone()
    }

    pub async fn bands(&self) -> Arc<[BandPoint]> {
        self.session.read().await.bands()
    }

    /// Validate, recompute and commit new inputs.
    ///
    /// Returns `Ok(false)` when a newer update committed first and this
    /// result was dropped.
    pub async fn update_inputs(&self, inputs: BollingerConfig) -> Result<bool, ChartError> {
        let pending = self.issue(inputs)?;
        self.complete(pending).await
    }

    /// Validate `inputs` and assign them the next generation.
    pub fn issue(&self, inputs: BollingerConfig) -> Result<PendingUpdate, ChartError> {
        if let Err(e) = validate_config(&inputs) {
            warn!(error = %e, "Rejected Bollinger inputs, keeping previous bands");
            return Err(e.into());
        }

        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(PendingUpdate { generation, inputs })
    }

    /// Compute bands for an issued update and commit them unless a later
    /// generation is already displayed.
    pub async fn complete(&self, pending: PendingUpdate) -> Result<bool, ChartError> {
        let PendingUpdate { generation, inputs } = pending;
        let series = self.series().await;

        let bands = tokio::task::spawn_blocking(move || {
            calculate_bollinger_bands(series.bars(), &inputs)
        })
        .await
        .map_err(|e| ChartError::Task(e.to_string()))??;

        let committed = self
            .session
            .write()
            .await
            .commit(generation, inputs, bands.into());

        if committed {
            info!(
                generation,
                length = inputs.length,
                std_dev = inputs.std_dev,
                offset = inputs.offset,
                source = inputs.source.as_str(),
                "Bollinger inputs applied"
            );
        } else {
            debug!(generation, "Discarded stale band computation");
        }
        Ok(committed)
    }

    /// Add the indicator to the chart or remove it.
    pub async fn set_enabled(&self, enabled: bool) {
        self.session.write().await.set_enabled(enabled);
        info!(enabled, "Bollinger overlay toggled");
    }

    pub async fn update_styles(&self, styles: BollingerStyles) -> Result<(), ChartError> {
        self.session.write().await.set_styles(styles).map_err(|e| {
            warn!(error = %e, "Rejected Bollinger styles, keeping previous styles");
            ChartError::from(e)
        })
    }
}
