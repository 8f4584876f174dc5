//! Bollinger Bands indicator
//!
//! Basis      = SMA(source, length)
//! Upper Band = Basis + (std_dev * population standard deviation)
//! Lower Band = Basis - (std_dev * population standard deviation)
//!
//! The deviation uses divisor `length` (population), matching common charting
//! packages. Bars without a full window are `None`.

use crate::common::math;
use crate::indicators::error::IndicatorError;
use crate::models::indicators::{Band, BandPoint, Bar, BollingerConfig};

/// Calculate Bollinger Bands for every bar of `bars`.
///
/// The result has the same length as `bars`. The first `length - 1` points
/// (before the offset shift) are `None`. Fails only when `length` is zero;
/// non-finite source values propagate into the affected windows, while a
/// window of finite values whose band overflows yields `None`.
pub fn calculate_bollinger_bands(
    bars: &[Bar],
    config: &BollingerConfig,
) -> Result<Vec<BandPoint>, IndicatorError> {
    if config.length < 1 {
        return Err(IndicatorError::invalid_config(format!(
            "length must be at least 1, got {}",
            config.length
        )));
    }

    let values: Vec<f64> = bars.iter().map(|bar| bar.value(config.source)).collect();

    let warmup = (config.length - 1).min(values.len());
    let mut points: Vec<BandPoint> = vec![None; warmup];
    points.extend(
        values
            .windows(config.length)
            .map(|window| band_for_window(window, config.std_dev)),
    );

    Ok(apply_offset(points, config.offset))
}

/// Calculate Bollinger Bands with default parameters (20 SMA, 2σ, no offset)
pub fn calculate_bollinger_bands_default(bars: &[Bar]) -> Vec<BandPoint> {
    let config = BollingerConfig::default();
    calculate_bollinger_bands(bars, &config).unwrap_or_else(|_| vec![None; bars.len()])
}

fn band_for_window(window: &[f64], multiplier: f64) -> BandPoint {
    let basis = math::mean(window)?;
    let std = math::population_std_dev(window, basis);
    let band = Band::around(basis, std * multiplier);
    // Finite inputs can still overflow the variance; such a window has no band.
    if !band.is_finite() && window.iter().all(|v| v.is_finite()) {
        return None;
    }
    Some(band)
}

/// Shift points in time: output `j` takes input `j - offset` when that index
/// exists, otherwise `None`. Length is preserved.
pub fn apply_offset(points: Vec<BandPoint>, offset: i64) -> Vec<BandPoint> {
    if offset == 0 {
        return points;
    }

    let len = points.len();
    (0..len)
        .map(|j| {
            let source = (j as i64).checked_sub(offset)?;
            usize::try_from(source)
                .ok()
                .and_then(|idx| points.get(idx).copied().flatten())
        })
        .collect()
}

/// Validate parameters coming from the settings editor.
///
/// Stricter than [`calculate_bollinger_bands`]: the multiplier must also be
/// finite and non-negative.
pub fn validate_config(config: &BollingerConfig) -> Result<(), IndicatorError> {
    if config.length < 1 {
        return Err(IndicatorError::invalid_config(format!(
            "length must be at least 1, got {}",
            config.length
        )));
    }
    if !config.std_dev.is_finite() || config.std_dev < 0.0 {
        return Err(IndicatorError::invalid_config(format!(
            "stdDev must be a non-negative number, got {}",
            config.std_dev
        )));
    }
    Ok(())
}
