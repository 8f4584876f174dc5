//! findscan: Bollinger Bands chart service.
//!
//! Loads an OHLCV series once, computes Bollinger Bands over it and serves the
//! bands together with the chart overlay directives over HTTP.

pub mod chart;
pub mod common;
pub mod config;
pub mod core;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod series;
pub mod services;
