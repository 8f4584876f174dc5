//! Rendering directives for the Bollinger overlay.

use serde::Serialize;

use crate::models::indicators::{BandPoint, BollingerConfig};
use crate::models::style::{BollingerStyles, LineStyle};

pub const INDICATOR_NAME: &str = "BB";
pub const PRECISION: u8 = 2;

/// One drawn line of the indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Figure {
    pub key: &'static str,
    pub title: &'static str,
    pub color: String,
    pub line_width: u32,
    pub dash_value: [u32; 2],
}

impl Figure {
    fn from_style(key: &'static str, title: &'static str, style: &LineStyle) -> Self {
        Self {
            key,
            title,
            color: style.color.clone(),
            line_width: style.width,
            dash_value: style.style.dash_value(),
        }
    }
}

/// Fill between the lower and upper lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaFill {
    pub from_figure_key: &'static str,
    pub to_figure_key: &'static str,
    pub color: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOverlay {
    pub name: &'static str,
    pub figures: Vec<Figure>,
    pub area: AreaFill,
    pub calc_params: (usize, f64),
    pub precision: u8,
    pub points: Vec<BandPoint>,
}

/// Combine computed points with the style descriptor.
///
/// Lines whose `display` flag is off get no figure; the points are passed
/// through untouched either way.
pub fn build_overlay(
    points: &[BandPoint],
    inputs: &BollingerConfig,
    styles: &BollingerStyles,
) -> ChartOverlay {
    let lines = [
        ("basis", "MID", &styles.basis),
        ("upper", "UPPER", &styles.upper),
        ("lower", "LOWER", &styles.lower),
    ];

    let figures = lines
        .into_iter()
        .filter(|(_, _, style)| style.display)
        .map(|(key, title, style)| Figure::from_style(key, title, style))
        .collect();

    let background = &styles.background;
    let area = AreaFill {
        from_figure_key: "lower",
        to_figure_key: "upper",
        color: background
            .rgba()
            .unwrap_or_else(|| background.color.clone()),
        visible: background.display,
    };

    ChartOverlay {
        name: INDICATOR_NAME,
        figures,
        area,
        calc_params: (inputs.length, inputs.std_dev),
        precision: PRECISION,
        points: points.to_vec(),
    }
}
