//! Data sources feeding the series store.

pub mod market_data;

pub use market_data::*;
