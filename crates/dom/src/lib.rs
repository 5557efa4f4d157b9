//! DOM tree storage for landmark discovery
//!
//! An arena-backed document the landmark scanner walks, plus a loader for
//! CDP `DOM.getDocument` responses.
//!
//! ## Core Design
//!
//! ```text
//! CDP JSON ─→ DomService ─→ DomArena (owned) ─→ pre-order walks / lookups
//!                               ↓
//!                         NodeId (u32), stable even after detach
//! ```

pub mod arena;
pub mod error;
pub mod service;
pub mod types;
pub mod utils;

pub use arena::DomArena;
pub use error::{DomError, Result};
pub use service::DomService;
pub use types::*;
