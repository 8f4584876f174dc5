//! Subscriber setup for the chart service.
//!
//! The output format follows `LOG_FORMAT` when set (`json` or `pretty`),
//! otherwise the deployment environment: JSON lines in production, coloured
//! text everywhere else. `RUST_LOG` selects the level, `info` by default.

use std::env;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::get_environment;

pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" | "text" => Some(Self::Pretty),
            _ => None,
        }
    }

    pub fn for_environment(environment: &str) -> Self {
        if is_production(environment) {
            Self::Json
        } else {
            Self::Pretty
        }
    }

    /// Resolve from an explicit override, falling back to the environment name.
    pub fn resolve(explicit: Option<&str>, environment: &str) -> Self {
        explicit
            .and_then(Self::parse)
            .unwrap_or_else(|| Self::for_environment(environment))
    }
}

pub fn is_production(environment: &str) -> bool {
    matches!(environment, "production" | "prod")
}

fn build_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Install the global subscriber. Call once at process start.
pub fn init_logging() {
    let format = LogFormat::resolve(env::var("LOG_FORMAT").ok().as_deref(), &get_environment());

    let json = (format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stdout)
    });
    let pretty = (format == LogFormat::Pretty).then(|| {
        fmt::layer()
            .with_target(true)
            .with_ansi(true)
            .with_writer(std::io::stdout)
    });

    tracing_subscriber::registry()
        .with(build_filter())
        .with(json)
        .with(pretty)
        .init();
}
