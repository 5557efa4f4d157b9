//! Error types for document monitoring

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MonitorError>;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// The diagnostics panel reported a state other than `open`/`closed`.
    /// Callers must not swallow this.
    #[error("Invalid diagnostics state \"{0}\"")]
    InvalidDiagnosticsState(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
