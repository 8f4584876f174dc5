use thiserror::Error;

/// Errors raised before an indicator computation starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("invalid indicator configuration: {0}")]
    InvalidConfig(String),
}

impl IndicatorError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        IndicatorError::InvalidConfig(msg.into())
    }
}
