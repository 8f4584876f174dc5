//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod style;

pub use indicators::{Band, BandPoint, Bar, BollingerConfig, MaType, PriceSource};
pub use style::{BackgroundStyle, BollingerStyles, LineStyle, LineStyleKind, StyleError};
