use crate::error::RenderError;
use crate::metrics::collector::{DashboardSnapshot, RenderTarget};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::sync::Arc;
use tokio::sync::RwLock;

/// What the draw loop shows. Written by the poller through
/// [`TerminalRenderTarget`], read once per frame by the UI.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub snapshot: Option<DashboardSnapshot>,
    pub last_update: Option<DateTime<Local>>,
    pub api_ok: Option<bool>,
    /// Last cycle failed; the values on screen are from an earlier one.
    pub stale: bool,
    min_generation: u64,
}

impl ViewState {
    pub fn apply(&mut self, snapshot: DashboardSnapshot) -> Result<(), RenderError> {
        if snapshot.generation < self.min_generation {
            return Err(RenderError::Failed(format!(
                "snapshot from generation {} arrived after generation {}",
                snapshot.generation, self.min_generation
            )));
        }

        self.min_generation = snapshot.generation;
        self.snapshot = Some(snapshot);
        self.last_update = Some(Local::now());
        self.api_ok = Some(true);
        self.stale = false;
        Ok(())
    }

    pub fn mark_failed(&mut self) {
        self.api_ok = Some(false);
        self.stale = self.snapshot.is_some();
    }

    /// Forgets everything shown so far and ignores snapshots from before
    /// `generation`.
    pub fn reset(&mut self, generation: u64) {
        *self = Self {
            min_generation: generation,
            ..Self::default()
        };
    }

    pub fn clear_history(&mut self) {
        if let Some(snapshot) = &mut self.snapshot {
            for samples in snapshot.history.values_mut() {
                samples.clear();
            }
        }
    }
}

pub struct TerminalRenderTarget {
    state: Arc<RwLock<ViewState>>,
}

impl TerminalRenderTarget {
    pub fn new(state: Arc<RwLock<ViewState>>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl RenderTarget for TerminalRenderTarget {
    async fn render(&self, snapshot: DashboardSnapshot) -> Result<(), RenderError> {
        let mut state = self.state.write().await;
        state.apply(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::store::MetricsStore;

    fn snapshot(generation: u64) -> DashboardSnapshot {
        DashboardSnapshot {
            generation,
            endpoint: "http://a/api/status".to_string(),
            taken_at: Local::now(),
            history: MetricsStore::new(3).snapshot_all(),
            report: None,
        }
    }

    #[tokio::test]
    async fn test_render_target_updates_state() {
        let state = Arc::new(RwLock::new(ViewState::default()));
        let target = TerminalRenderTarget::new(state.clone());

        target.render(snapshot(1)).await.unwrap();

        let view = state.read().await;
        assert_eq!(view.api_ok, Some(true));
        assert_eq!(view.snapshot.as_ref().unwrap().generation, 1);
        assert!(view.last_update.is_some());
    }

    #[test]
    fn test_old_generation_is_rejected() {
        let mut view = ViewState::default();
        view.reset(4);

        assert!(view.apply(snapshot(3)).is_err());
        assert!(view.snapshot.is_none());
        assert!(view.apply(snapshot(4)).is_ok());
    }

    #[test]
    fn test_failure_marks_existing_data_stale() {
        let mut view = ViewState::default();
        view.mark_failed();
        assert!(!view.stale);
        assert_eq!(view.api_ok, Some(false));

        view.apply(snapshot(1)).unwrap();
        view.mark_failed();
        assert!(view.stale);
        assert!(view.snapshot.is_some());

        view.apply(snapshot(1)).unwrap();
        assert!(!view.stale);
    }
}
