//! Visual styling for the Bollinger overlay.
//!
//! The engine never reads these values; they are validated here and handed
//! to the chart library through [`crate::chart::overlay`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_LINE_WIDTH: u32 = 1;
pub const MAX_LINE_WIDTH: u32 = 10;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StyleError {
    #[error("{target}: invalid hex color {color:?}")]
    InvalidColor { target: &'static str, color: String },

    #[error("{target}: line width {width} outside 1..=10")]
    InvalidWidth { target: &'static str, width: u32 },

    #[error("background opacity {0} outside 0..=1")]
    InvalidOpacity(f64),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyleKind {
    #[default]
    Solid,
    Dashed,
}

impl LineStyleKind {
    /// Dash pattern understood by the chart library.
    pub fn dash_value(&self) -> [u32; 2] {
        match self {
            LineStyleKind::Solid => [1, 0],
            LineStyleKind::Dashed => [2, 2],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub display: bool,
    pub color: String,
    pub width: u32,
    pub style: LineStyleKind,
}

impl LineStyle {
    pub fn solid(color: &str) -> Self {
        Self {
            display: true,
            color: color.to_string(),
            width: MIN_LINE_WIDTH,
            style: LineStyleKind::Solid,
        }
    }

    fn validate(&self, target: &'static str) -> Result<(), StyleError> {
        if parse_hex_color(&self.color).is_none() {
            return Err(StyleError::InvalidColor {
                target,
                color: self.color.clone(),
            });
        }
        if !(MIN_LINE_WIDTH..=MAX_LINE_WIDTH).contains(&self.width) {
            return Err(StyleError::InvalidWidth {
                target,
                width: self.width,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundStyle {
    pub display: bool,
    pub color: String,
    pub opacity: f64,
}

impl BackgroundStyle {
    fn validate(&self) -> Result<(), StyleError> {
        if parse_hex_color(&self.color).is_none() {
            return Err(StyleError::InvalidColor {
                target: "background",
                color: self.color.clone(),
            });
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(StyleError::InvalidOpacity(self.opacity));
        }
        Ok(())
    }

    /// Fill color as a CSS `rgba(...)` string.
    pub fn rgba(&self) -> Option<String> {
        hex_to_rgba(&self.color, self.opacity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerStyles {
    pub basis: LineStyle,
    pub upper: LineStyle,
    pub lower: LineStyle,
    pub background: BackgroundStyle,
}

impl BollingerStyles {
    pub fn validate(&self) -> Result<(), StyleError> {
        self.basis.validate("basis")?;
        self.upper.validate("upper")?;
        self.lower.validate("lower")?;
        self.background.validate()
    }
}

impl Default for BollingerStyles {
    fn default() -> Self {
        Self {
            basis: LineStyle::solid("#FFD700"),
            upper: LineStyle::solid("#2196F3"),
            lower: LineStyle::solid("#2196F3"),
            background: BackgroundStyle {
                display: true,
                color: "#2196F3".to_string(),
                opacity: 0.2,
            },
        }
    }
}

/// Parse `#RGB` or `#RRGGBB` into its channels.
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };

    let value = u32::from_str_radix(&expanded, 16).ok()?;
    Some(((value >> 16) as u8, (value >> 8) as u8, value as u8))
}

pub fn hex_to_rgba(hex: &str, opacity: f64) -> Option<String> {
    let (r, g, b) = parse_hex_color(hex)?;
    Some(format!("rgba({},{},{},{})", r, g, b, opacity))
}
