//! Error types for DOM operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(u32),

    #[error("Invalid node type: expected {expected}, got {actual}")]
    InvalidNodeType { expected: String, actual: String },

    #[error("Unknown node type {0}")]
    UnknownNodeType(u8),

    #[error("Node {child} is not a child of {parent}")]
    NotAChild { parent: u32, child: u32 },

    /// Insertion would put a node inside its own subtree
    #[error("Hierarchy error: {0}")]
    Hierarchy(String),

    #[error("Malformed CDP response: {0}")]
    ParseError(#[from] serde_json::Error),
}
