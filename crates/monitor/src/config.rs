//! Monitor configuration

use crate::error::{MonitorError, Result};
use landmarks::FinderConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Backoff settings for [`crate::RescanScheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Floor of the pause, and the pause after a reset
    pub min_pause_ms: u64,
    pub max_pause_ms: u64,
    /// Pause growth per deferred rescan
    pub growth_multiplier: f64,
    /// Pause shrink per decay tick
    pub decay_step_ms: u64,
    pub decay_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_pause_ms: 500,
            max_pause_ms: 60_000,
            growth_multiplier: 1.5,
            decay_step_ms: 500,
            decay_interval_ms: 1_000,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_pause_ms == 0 {
            return Err(MonitorError::InvalidConfig("min_pause_ms must be positive".into()));
        }
        if self.min_pause_ms > self.max_pause_ms {
            return Err(MonitorError::InvalidConfig(format!(
                "min_pause_ms ({}) exceeds max_pause_ms ({})",
                self.min_pause_ms, self.max_pause_ms
            )));
        }
        if self.growth_multiplier.is_nan() || self.growth_multiplier <= 1.0 {
            return Err(MonitorError::InvalidConfig(format!(
                "growth_multiplier must be greater than 1, got {}",
                self.growth_multiplier
            )));
        }
        if self.decay_step_ms == 0 || self.decay_interval_ms == 0 {
            return Err(MonitorError::InvalidConfig(
                "decay step and interval must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn min_pause(&self) -> Duration {
        Duration::from_millis(self.min_pause_ms)
    }

    pub fn decay_interval(&self) -> Duration {
        Duration::from_millis(self.decay_interval_ms)
    }
}

/// Per-document monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub id: String,
    pub finder: FinderConfig,
    pub scheduler: SchedulerConfig,
    /// Delay before the first rescan after the document becomes visible again
    pub reconnection_grace_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            finder: FinderConfig::default(),
            scheduler: SchedulerConfig::default(),
            reconnection_grace_ms: 2_000,
        }
    }
}

impl MonitorConfig {
    pub fn reconnection_grace(&self) -> Duration {
        Duration::from_millis(self.reconnection_grace_ms)
    }
}
