//! Mutation statistics
//!
//! Counts what the monitor did: mutation batches seen and checked, scans
//! they caused, scans for other reasons, the current pause and the last scan
//! time. Useful for spotting pages that keep the scheduler in backoff.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::events::{MonitorEvent, ScanTrigger};
use crate::observer::MonitorObserver;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationStatsSnapshot {
    pub total_mutations: u64,
    pub checked_mutations: u64,
    pub mutation_scans: u64,
    pub non_mutation_scans: u64,
    pub pause_ms: Option<u64>,
    pub last_scan_duration_ms: Option<u64>,
}

/// Observer keeping a running [`MutationStatsSnapshot`]
///
/// Counters restart on [`MonitorEvent::PageReset`].
#[derive(Debug, Default)]
pub struct MutationStats {
    current: RwLock<MutationStatsSnapshot>,
}

impl MutationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> MutationStatsSnapshot {
        self.current.read().await.clone()
    }

    pub async fn reset(&self) {
        *self.current.write().await = MutationStatsSnapshot::default();
    }
}

#[async_trait]
impl MonitorObserver for MutationStats {
    fn name(&self) -> &str {
        "MutationStats"
    }

    async fn on_event(&self, event: &MonitorEvent) {
        let mut stats = self.current.write().await;
        match event {
            MonitorEvent::MutationObserved => stats.total_mutations += 1,
            MonitorEvent::MutationChecked => stats.checked_mutations += 1,
            MonitorEvent::ScanCompleted {
                trigger,
                duration_ms,
                ..
            } => {
                match trigger {
                    ScanTrigger::Mutation => stats.mutation_scans += 1,
                    ScanTrigger::Request => stats.non_mutation_scans += 1,
                }
                stats.last_scan_duration_ms = Some(*duration_ms);
            }
            MonitorEvent::PauseChanged { pause_ms } => stats.pause_ms = Some(*pause_ms),
            MonitorEvent::PageReset => *stats = MutationStatsSnapshot::default(),
            MonitorEvent::LandmarksUpdated { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_and_reset() {
        let stats = MutationStats::new();
        for event in [
            MonitorEvent::MutationObserved,
            MonitorEvent::MutationObserved,
            MonitorEvent::MutationChecked,
            MonitorEvent::PauseChanged { pause_ms: 750 },
            MonitorEvent::ScanCompleted {
                trigger: ScanTrigger::Mutation,
                duration_ms: 4,
                count: 3,
            },
            MonitorEvent::ScanCompleted {
                trigger: ScanTrigger::Request,
                duration_ms: 2,
                count: 3,
            },
        ] {
            stats.on_event(&event).await;
        }

        assert_eq!(
            stats.snapshot().await,
            MutationStatsSnapshot {
                total_mutations: 2,
                checked_mutations: 1,
                mutation_scans: 1,
                non_mutation_scans: 1,
                pause_ms: Some(750),
                last_scan_duration_ms: Some(2),
            }
        );

        stats.on_event(&MonitorEvent::PageReset).await;
        assert_eq!(stats.snapshot().await, MutationStatsSnapshot::default());
    }
}
