//! Technical indicators computed over a bar series.

pub mod error;
pub mod volatility;

pub use error::IndicatorError;
