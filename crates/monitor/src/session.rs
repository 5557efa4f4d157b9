//! Document Monitor - keeps one document's landmark list current
//!
//! Owns the per-document pieces: the finder, the rescan scheduler, the event
//! bus and its observers. The host feeds it mutation batches, visibility
//! changes and commands; it answers with landmark info and publishes events.
//!
//! ```text
//! host mutations ─→ handle_mutations ─→ RescanScheduler ─→ scan ─→ EventBus
//! host commands  ─→ handle ─────────────────────────────↗        ↘ observers
//! ```
//!
//! The tree is shared with the host through `Arc<RwLock<_>>`. Release the
//! write guard before calling into the monitor.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use landmarks::{LandmarkFinder, LandmarkInfo, LandmarkRecord, TreeSource, WarningKind};

use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::events::{EventBus, MonitorEvent, ScanTrigger};
use crate::mutation::{should_trigger_rescan, Mutation};
use crate::observer::{MonitorObserver, ObserverSet};
use crate::scheduler::{RescanScheduler, RunOutcome};

/// Requests from the UI layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum Command {
    GetLandmarks,
    FocusLandmark { index: usize },
    NextLandmark,
    #[serde(rename = "prev-landmark")]
    PreviousLandmark,
    MainLandmark,
    /// The page navigated without a reload
    TriggerRefresh,
    /// Diagnostics panel opened (`"open"`) or closed (`"closed"`)
    #[serde(rename = "devtools-state")]
    SetDiagnostics { state: String },
    GetPageWarnings,
}

impl Command {
    pub fn from_json(message: &str) -> Result<Self> {
        Ok(serde_json::from_str(message)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "data", rename_all = "kebab-case")]
pub enum Response {
    Landmarks(Vec<LandmarkInfo>),
    /// `None` when there was nothing to focus
    Focused(Option<LandmarkInfo>),
    PageWarnings(Vec<WarningKind>),
    Done,
}

struct MonitorState {
    visible: bool,
    /// Mutation batches are only acted on while observing
    observing: bool,
    have_scanned: bool,
    reconnection: Option<JoinHandle<()>>,
    forwarder: Option<JoinHandle<()>>,
}

impl MonitorState {
    fn cancel_reconnection(&mut self) {
        if let Some(task) = self.reconnection.take() {
            task.abort();
        }
    }
}

/// Everything background tasks need
struct Shared<T: TreeSource> {
    tree: Arc<RwLock<T>>,
    finder: Mutex<LandmarkFinder<T::Node>>,
    bus: EventBus,
    state: Mutex<MonitorState>,
}

impl<T> Shared<T>
where
    T: TreeSource + Send + Sync + 'static,
    T::Node: Send + Sync,
{
    async fn find_landmarks(&self, trigger: ScanTrigger) -> usize {
        let (duration, count, infos) = {
            let tree = self.tree.read().await;
            let mut finder = self.finder.lock().await;
            let duration = finder.find(&*tree);
            (duration, finder.len(), finder.all_infos())
        };
        self.state.lock().await.have_scanned = true;

        self.bus.publish(MonitorEvent::ScanCompleted {
            trigger,
            duration_ms: duration.as_millis() as u64,
            count,
        });
        self.bus.publish(MonitorEvent::LandmarksUpdated { landmarks: infos });
        count
    }

    async fn navigate<F>(&self, pick: F) -> Option<LandmarkInfo>
    where
        F: FnOnce(&T, &mut LandmarkFinder<T::Node>) -> Option<LandmarkInfo>,
    {
        let tree = self.tree.read().await;
        let mut finder = self.finder.lock().await;
        if finder.is_empty() {
            tracing::info!("[DocumentMonitor] No landmarks to focus");
            return None;
        }
        pick(&*tree, &mut *finder)
    }
}

/// Per-document monitor
pub struct DocumentMonitor<T: TreeSource> {
    config: MonitorConfig,
    shared: Arc<Shared<T>>,
    scheduler: RescanScheduler,
    observers: Arc<RwLock<ObserverSet>>,
    /// Set when the overlay layer touched the DOM; such mutations are ours
    overlay_changes: Arc<AtomicBool>,
}

impl<T> DocumentMonitor<T>
where
    T: TreeSource + Send + Sync + 'static,
    T::Node: Send + Sync,
{
    pub fn new(tree: T) -> Result<Self> {
        Self::with_config(tree, MonitorConfig::default())
    }

    pub fn with_config(tree: T, config: MonitorConfig) -> Result<Self> {
        config.scheduler.validate()?;
        let bus = EventBus::new();

        Ok(Self {
            scheduler: RescanScheduler::with_config(config.scheduler, bus.clone()),
            shared: Arc::new(Shared {
                tree: Arc::new(RwLock::new(tree)),
                finder: Mutex::new(LandmarkFinder::with_config(config.finder)),
                bus,
                state: Mutex::new(MonitorState {
                    visible: true,
                    observing: false,
                    have_scanned: false,
                    reconnection: None,
                    forwarder: None,
                }),
            }),
            config,
            observers: Arc::new(RwLock::new(ObserverSet::new())),
            overlay_changes: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// The monitored tree, for the host to mutate
    pub fn tree(&self) -> Arc<RwLock<T>> {
        self.shared.tree.clone()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.shared.bus
    }

    pub fn scheduler(&self) -> &RescanScheduler {
        &self.scheduler
    }

    pub async fn register_observer(&self, observer: Arc<dyn MonitorObserver>) {
        self.observers.write().await.register(observer);
    }

    /// Start forwarding events to observers; scan and start observing if
    /// the document is visible
    pub async fn start(&self) {
        {
            let mut state = self.shared.state.lock().await;
            if state.forwarder.is_some() {
                return;
            }
            state.forwarder = Some(self.spawn_forwarder());
        }
        self.observers.read().await.start_all().await;
        tracing::info!("[DocumentMonitor] Started {}", self.config.id);

        if self.shared.state.lock().await.visible {
            self.shared.find_landmarks(ScanTrigger::Request).await;
            self.shared.state.lock().await.observing = true;
        }
    }

    /// Stop observing and cancel all pending work
    pub async fn stop(&self) {
        {
            let mut state = self.shared.state.lock().await;
            state.cancel_reconnection();
            state.observing = false;
            if let Some(task) = state.forwarder.take() {
                task.abort();
            }
        }
        self.scheduler.reset().await;
        self.observers.read().await.stop_all().await;
        tracing::info!("[DocumentMonitor] Stopped {}", self.config.id);
    }

    fn spawn_forwarder(&self) -> JoinHandle<()> {
        let mut rx = self.shared.bus.subscribe();
        let observers = self.observers.clone();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => observers.read().await.dispatch(Arc::new(event)).await,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("[DocumentMonitor] Observers missed {} events", skipped)
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// The overlay layer changed the DOM; the next mutation batch is its echo
    pub fn note_overlay_changes(&self) {
        self.overlay_changes.store(true, Ordering::SeqCst);
    }

    /// Feed one batch of DOM mutations
    pub async fn handle_mutations(&self, batch: Vec<Mutation>) -> RunOutcome {
        if !self.shared.state.lock().await.observing {
            return RunOutcome::Ignored;
        }
        self.shared.bus.publish(MonitorEvent::MutationObserved);

        let now = &self.shared;
        let batch = &batch;
        let shared = self.shared.clone();
        let overlay_changes = self.overlay_changes.clone();
        self.scheduler
            .run(
                move || overlay_changes.swap(false, Ordering::SeqCst),
                move || async move {
                    now.bus.publish(MonitorEvent::MutationChecked);
                    if should_trigger_rescan(batch) {
                        now.find_landmarks(ScanTrigger::Mutation).await;
                    }
                },
                move || async move {
                    // Queued before the page was hidden
                    if !shared.state.lock().await.visible {
                        return;
                    }
                    shared.find_landmarks(ScanTrigger::Mutation).await;
                },
            )
            .await
    }

    /// Page visibility changed
    ///
    /// Hiding stops observation at once. Showing waits out the reconnection
    /// grace period, then rescans and resumes observing.
    pub async fn set_visible(&self, visible: bool) {
        let mut state = self.shared.state.lock().await;
        state.visible = visible;
        state.cancel_reconnection();

        if !visible {
            state.observing = false;
            tracing::debug!("[DocumentMonitor] Hidden, observation paused");
            return;
        }

        let shared = self.shared.clone();
        let grace = self.config.reconnection_grace();
        state.reconnection = Some(tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            shared.find_landmarks(ScanTrigger::Request).await;
            let mut state = shared.state.lock().await;
            state.observing = true;
            state.reconnection = None;
        }));
    }

    /// Rescan when cached results may be stale: the scheduler is in backoff,
    /// or a post-resume scan is still waiting. Returns whether it rescanned.
    pub async fn update_outdated_results(&self) -> bool {
        let out_of_date = {
            let mut state = self.shared.state.lock().await;
            if state.reconnection.is_some() && !state.have_scanned {
                state.cancel_reconnection();
                state.observing = true;
                true
            } else {
                drop(state);
                self.scheduler.is_paused().await
            }
        };

        if out_of_date {
            self.shared.find_landmarks(ScanTrigger::Request).await;
        }
        out_of_date
    }

    /// Handle one UI command
    ///
    /// Only an invalid diagnostics state is an error; every other failure
    /// (no landmarks, stale node, bad index) answers `Focused(None)`.
    pub async fn handle(&self, command: Command) -> Result<Response> {
        tracing::debug!("[DocumentMonitor] {:?}", command);
        let response = match command {
            Command::GetLandmarks => {
                self.update_outdated_results().await;
                Response::Landmarks(self.landmarks().await)
            }
            Command::FocusLandmark { index } => {
                self.update_outdated_results().await;
                Response::Focused(
                    self.shared
                        .navigate(|tree, finder| finder.by_index(tree, index).map(LandmarkRecord::info))
                        .await,
                )
            }
            Command::NextLandmark => {
                self.update_outdated_results().await;
                Response::Focused(
                    self.shared
                        .navigate(|tree, finder| finder.next(tree).map(LandmarkRecord::info))
                        .await,
                )
            }
            Command::PreviousLandmark => {
                self.update_outdated_results().await;
                Response::Focused(
                    self.shared
                        .navigate(|tree, finder| finder.previous(tree).map(LandmarkRecord::info))
                        .await,
                )
            }
            Command::MainLandmark => {
                self.update_outdated_results().await;
                let main = self
                    .shared
                    .navigate(|tree, finder| finder.main(tree).map(LandmarkRecord::info))
                    .await;
                if main.is_none() {
                    tracing::info!("[DocumentMonitor] No main landmark found");
                }
                Response::Focused(main)
            }
            Command::TriggerRefresh => {
                self.shared.bus.publish(MonitorEvent::PageReset);
                self.scheduler.reset().await;
                self.shared.find_landmarks(ScanTrigger::Request).await;
                Response::Landmarks(self.landmarks().await)
            }
            Command::SetDiagnostics { state } => {
                let diagnostics = match state.as_str() {
                    "open" => true,
                    "closed" => false,
                    _ => {
                        tracing::error!("[DocumentMonitor] Invalid diagnostics state {:?}", state);
                        return Err(MonitorError::InvalidDiagnosticsState(state));
                    }
                };
                self.shared.finder.lock().await.set_diagnostics(diagnostics);
                if self.shared.state.lock().await.visible {
                    self.shared.find_landmarks(ScanTrigger::Request).await;
                }
                Response::Done
            }
            Command::GetPageWarnings => {
                Response::PageWarnings(self.shared.finder.lock().await.page_warnings().to_vec())
            }
        };
        Ok(response)
    }

    /// Current landmarks, without rescanning
    pub async fn landmarks(&self) -> Vec<LandmarkInfo> {
        self.shared.finder.lock().await.all_infos()
    }

    /// Current landmarks with their nodes
    pub async fn records(&self) -> Vec<LandmarkRecord<T::Node>> {
        self.shared.finder.lock().await.all_records().to_vec()
    }
}

impl<T: TreeSource> Drop for DocumentMonitor<T> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.shared.state.try_lock() {
            state.cancel_reconnection();
            if let Some(task) = state.forwarder.take() {
                task.abort();
            }
        }
    }
}
