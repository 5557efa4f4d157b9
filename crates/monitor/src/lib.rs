//! Live landmark monitoring for one document
//!
//! Wraps a [`landmarks::LandmarkFinder`] and keeps its results current while
//! the page changes underneath it.
//!
//! # Architecture
//!
//! 1. **Host drives, monitor reacts**: the host pushes mutation batches,
//!    visibility changes and UI commands; nothing polls
//! 2. **Backpressure first**: mutation storms go through [`RescanScheduler`],
//!    so a busy page costs one scan per pause window
//! 3. **Events out**: every scan and pause change is published on the
//!    [`EventBus`] and forwarded to registered [`MonitorObserver`]s

pub mod config;
pub mod error;
pub mod events;
pub mod mutation;
pub mod observer;
pub mod scheduler;
pub mod session;
pub mod stats;

pub use config::{MonitorConfig, SchedulerConfig};
pub use error::{MonitorError, Result};
pub use events::{EventBus, MonitorEvent, ScanTrigger};
pub use mutation::{should_trigger_rescan, Mutation, OBSERVED_ATTRIBUTES};
pub use observer::{MonitorObserver, ObserverSet};
pub use scheduler::{RescanScheduler, RunOutcome};
pub use session::{Command, DocumentMonitor, Response};
pub use stats::{MutationStats, MutationStatsSnapshot};
