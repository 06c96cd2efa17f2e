use crate::error::{AppError, CycleError, RenderError, Result};
use crate::metrics::ingestor::MetricIngestor;
use crate::metrics::store::{HistorySnapshot, MetricsStore};
use crate::status::client::StatusClient;
use crate::status::types::StatusReport;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

pub type ErrorHook = Arc<dyn Fn(&CycleError) + Send + Sync>;

/// Where each cycle's snapshot goes. Implementations own the display; the
/// controller never sees it.
#[async_trait]
pub trait RenderTarget: Send + Sync {
    async fn render(&self, snapshot: DashboardSnapshot) -> std::result::Result<(), RenderError>;
}

/// Owned copy of everything a renderer needs after a successful cycle.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub generation: u64,
    pub endpoint: String,
    pub taken_at: DateTime<Local>,
    pub history: HistorySnapshot,
    pub report: Option<StatusReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollingConfig {
    endpoint: String,
    interval: Duration,
}

impl PollingConfig {
    pub fn new(endpoint: impl Into<String>, interval: Duration, min_interval: Duration) -> Result<Self> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(AppError::Config("endpoint must not be empty".to_string()));
        }
        if interval.is_zero() || interval < min_interval {
            return Err(AppError::Config(format!(
                "polling interval {} is below the minimum of {}",
                humantime::format_duration(interval),
                humantime::format_duration(min_interval)
            )));
        }

        Ok(Self { endpoint, interval })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Running,
    /// Transitional state inside `reconfigure`, set and left under the same
    /// lock, so callers never observe it.
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Rendered,
    /// Dropped because the controller is idle or an earlier cycle has not
    /// finished rendering.
    Skipped,
}

struct Inner {
    state: ControllerState,
    config: Option<PollingConfig>,
    generation: u64,
    in_flight: Option<u64>,
    timer: Option<JoinHandle<()>>,
    store: MetricsStore,
    latest: Option<StatusReport>,
}

struct Shared {
    client: Arc<dyn StatusClient>,
    renderer: Arc<dyn RenderTarget>,
    ingestor: MetricIngestor,
    on_cycle_error: Option<ErrorHook>,
    inner: Mutex<Inner>,
}

/// Drives fetch → normalize → push → render cycles on a fixed interval.
///
/// Every `start`, `reconfigure` and `stop` bumps a generation counter. A cycle
/// remembers the generation it started under and is discarded on completion
/// if the counter has moved on, so a fetch that outlives a server switch can
/// never write into the new server's history.
pub struct PollingController {
    shared: Arc<Shared>,
}

impl PollingController {
    pub fn new(
        client: Arc<dyn StatusClient>,
        renderer: Arc<dyn RenderTarget>,
        history_size: usize,
    ) -> Self {
        Self::build(client, renderer, history_size, None)
    }

    pub fn with_error_hook<F>(
        client: Arc<dyn StatusClient>,
        renderer: Arc<dyn RenderTarget>,
        history_size: usize,
        hook: F,
    ) -> Self
    where
        F: Fn(&CycleError) + Send + Sync + 'static,
    {
        Self::build(client, renderer, history_size, Some(Arc::new(hook)))
    }

    fn build(
        client: Arc<dyn StatusClient>,
        renderer: Arc<dyn RenderTarget>,
        history_size: usize,
        on_cycle_error: Option<ErrorHook>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                client,
                renderer,
                ingestor: MetricIngestor::new(),
                on_cycle_error,
                inner: Mutex::new(Inner {
                    state: ControllerState::Idle,
                    config: None,
                    generation: 0,
                    in_flight: None,
                    timer: None,
                    store: MetricsStore::new(history_size),
                    latest: None,
                }),
            }),
        }
    }

    pub async fn start(&self, config: PollingConfig) -> Result<()> {
        let mut inner = self.shared.inner.lock().await;
        if inner.state != ControllerState::Idle {
            return Err(AppError::Controller(format!(
                "cannot start a controller in state {:?}",
                inner.state
            )));
        }

        self.start_locked(&mut inner, config);
        Ok(())
    }

    /// Applies a new config. Returns `false` when nothing changed. History is
    /// kept across an interval change and cleared when the endpoint changes.
    pub async fn reconfigure(&self, config: PollingConfig) -> bool {
        let mut inner = self.shared.inner.lock().await;
        if inner.state == ControllerState::Running && inner.config.as_ref() == Some(&config) {
            return false;
        }

        let endpoint_changed = inner
            .config
            .as_ref()
            .map_or(true, |current| current.endpoint() != config.endpoint());

        inner.state = ControllerState::Paused;
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }

        if endpoint_changed {
            inner.store.clear();
            inner.latest = None;
        }

        tracing::info!(
            endpoint = config.endpoint(),
            interval = %humantime::format_duration(config.interval()),
            cleared = endpoint_changed,
            "reconfiguring poller"
        );

        self.start_locked(&mut inner, config);
        true
    }

    pub async fn stop(&self) {
        let mut inner = self.shared.inner.lock().await;
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }

        if inner.state != ControllerState::Idle {
            inner.generation += 1;
            inner.state = ControllerState::Idle;
            tracing::info!(generation = inner.generation, "poller stopped");
        }
    }

    /// Runs one cycle right away under the current generation.
    pub async fn poll_now(&self) -> std::result::Result<CycleOutcome, CycleError> {
        let generation = {
            let inner = self.shared.inner.lock().await;
            if inner.state != ControllerState::Running {
                return Ok(CycleOutcome::Skipped);
            }
            inner.generation
        };

        Self::run_cycle(self.shared.clone(), generation).await
    }

    pub async fn reset_history(&self) {
        let mut inner = self.shared.inner.lock().await;
        inner.store.clear();
    }

    pub async fn state(&self) -> ControllerState {
        self.shared.inner.lock().await.state
    }

    pub async fn config(&self) -> Option<PollingConfig> {
        self.shared.inner.lock().await.config.clone()
    }

    pub async fn generation(&self) -> u64 {
        self.shared.inner.lock().await.generation
    }

    pub async fn history(&self) -> HistorySnapshot {
        self.shared.inner.lock().await.store.snapshot_all()
    }

    fn start_locked(&self, inner: &mut Inner, config: PollingConfig) {
        inner.generation += 1;
        inner.timer = Some(Self::spawn_timer(
            &self.shared,
            inner.generation,
            config.interval(),
        ));

        tracing::info!(
            endpoint = config.endpoint(),
            generation = inner.generation,
            "poller started"
        );

        inner.config = Some(config);
        inner.state = ControllerState::Running;
    }

    fn spawn_timer(shared: &Arc<Shared>, generation: u64, period: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(shared);

        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                // The first tick completes immediately.
                ticker.tick().await;

                let Some(shared) = weak.upgrade() else {
                    break;
                };

                tokio::spawn(async move {
                    let _ = Self::run_cycle(shared, generation).await;
                });
            }
        })
    }

    async fn run_cycle(
        shared: Arc<Shared>,
        generation: u64,
    ) -> std::result::Result<CycleOutcome, CycleError> {
        let result = match Self::begin_cycle(&shared, generation).await {
            Ok(Some(endpoint)) => {
                let result = Self::execute_cycle(&shared, generation, endpoint).await;
                Self::finish_cycle(&shared, generation).await;
                result
            }
            Ok(None) => Ok(CycleOutcome::Skipped),
            Err(error) => Err(error),
        };

        if let Err(error) = &result {
            if error.is_cancelled() {
                tracing::debug!(%error, "discarding stale cycle");
            } else {
                tracing::warn!(%error, generation, "polling cycle failed");
            }

            if let Some(hook) = &shared.on_cycle_error {
                hook(error);
            }
        }

        result
    }

    /// Claims the overlap guard for `generation`. `None` means another cycle
    /// of this generation still holds it, or there is nothing to poll.
    async fn begin_cycle(
        shared: &Shared,
        generation: u64,
    ) -> std::result::Result<Option<String>, CycleError> {
        let mut inner = shared.inner.lock().await;
        if inner.generation != generation {
            return Err(CycleError::Cancelled {
                started: generation,
                current: inner.generation,
            });
        }
        if inner.in_flight == Some(generation) {
            tracing::debug!(generation, "previous cycle still outstanding, skipping tick");
            return Ok(None);
        }
        let Some(config) = inner.config.as_ref() else {
            return Ok(None);
        };
        let endpoint = config.endpoint().to_string();
        inner.in_flight = Some(generation);
        Ok(Some(endpoint))
    }

    /// Releases the overlap guard once fetch, push and render are all done.
    async fn finish_cycle(shared: &Shared, generation: u64) {
        let mut inner = shared.inner.lock().await;
        if inner.in_flight == Some(generation) {
            inner.in_flight = None;
        }
    }

    async fn execute_cycle(
        shared: &Shared,
        generation: u64,
        endpoint: String,
    ) -> std::result::Result<CycleOutcome, CycleError> {
        let fetched = shared.client.fetch(&endpoint).await;

        let snapshot = {
            let mut inner = shared.inner.lock().await;
            if inner.generation != generation {
                return Err(CycleError::Cancelled {
                    started: generation,
                    current: inner.generation,
                });
            }

            let payload = fetched?;
            let mut cycle = shared.ingestor.normalize(&payload)?;

            if let Some(report) = cycle.report.take() {
                inner.latest = Some(report);
            }
            let taken_at = cycle.timestamp;
            inner.store.record_cycle(cycle);

            tracing::debug!(
                generation,
                samples = inner.store.len(),
                capacity = inner.store.capacity(),
                "recorded polling cycle"
            );

            DashboardSnapshot {
                generation,
                endpoint,
                taken_at,
                history: inner.store.snapshot_all(),
                report: inner.latest.clone(),
            }
        };

        if let Err(error) = shared.renderer.render(snapshot).await {
            tracing::warn!(%error, "render failed, polling continues");
        }

        Ok(CycleOutcome::Rendered)
    }
}

impl Drop for PollingController {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.shared.inner.try_lock() {
            if let Some(timer) = inner.timer.take() {
                timer.abort();
            }
        }
    }
}
