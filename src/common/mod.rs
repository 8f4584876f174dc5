//! Shared helpers used across the engine layers.

pub mod math;
