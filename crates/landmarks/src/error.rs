//! Error types for landmark discovery
//!
//! Scanning itself never fails: malformed nodes are skipped. Errors only come
//! from parsing external input.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LandmarkError>;

#[derive(Debug, Error)]
pub enum LandmarkError {
    #[error("Unknown landmark role: {0}")]
    UnknownRole(String),

    #[error("Invalid selector: {0:?}")]
    InvalidSelector(String),
}
