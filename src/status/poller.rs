use crate::error::{AppError, CycleError, Result};
use crate::status::client::StatusClient;
use crate::status::hardware::{hardware_endpoint, HardwareInfo};
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Latest machine description for the System tab.
#[derive(Debug, Clone, Default)]
pub struct HardwareState {
    pub endpoint: Option<String>,
    pub info: Option<HardwareInfo>,
    pub last_update: Option<DateTime<Local>>,
    pub last_error: Option<String>,
    generation: u64,
}

impl HardwareState {
    /// The last refresh failed but an earlier one is still on screen.
    pub fn is_stale(&self) -> bool {
        self.info.is_some() && self.last_error.is_some()
    }
}

/// Fetches the hardware route on its own slow timer. It shares nothing with
/// the metric controller except the HTTP client, so a failed or slow hardware
/// query never delays or fails a metric cycle.
pub struct HardwarePoller {
    client: Arc<dyn StatusClient>,
    state: Arc<RwLock<HardwareState>>,
    period: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl HardwarePoller {
    pub fn new(client: Arc<dyn StatusClient>, period: Duration) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(HardwareState::default())),
            period,
            task: Mutex::new(None),
        }
    }

    pub fn state(&self) -> Arc<RwLock<HardwareState>> {
        self.state.clone()
    }

    /// Polls the hardware route of the backend behind `status_endpoint`,
    /// replacing whatever was watched before.
    pub async fn watch(&self, status_endpoint: &str) -> Result<()> {
        let endpoint = hardware_endpoint(status_endpoint)
            .map_err(|e| AppError::Config(e.to_string()))?;

        let mut task = self.task.lock().await;
        if let Some(handle) = task.take() {
            handle.abort();
        }

        let generation = {
            let mut state = self.state.write().await;
            let generation = state.generation + 1;
            *state = HardwareState {
                endpoint: Some(endpoint.clone()),
                generation,
                ..HardwareState::default()
            };
            generation
        };

        tracing::info!(
            %endpoint,
            period = %humantime::format_duration(self.period),
            "hardware poller started"
        );

        let client = self.client.clone();
        let state = self.state.clone();
        let period = self.period;
        *task = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let _ = Self::fetch_once(client.as_ref(), &state, &endpoint, generation).await;
            }
        }));

        Ok(())
    }

    /// Fetches right away for the current target. Does nothing when nothing
    /// is watched.
    pub async fn refresh(&self) -> std::result::Result<(), CycleError> {
        let (endpoint, generation) = {
            let state = self.state.read().await;
            match &state.endpoint {
                Some(endpoint) => (endpoint.clone(), state.generation),
                None => return Ok(()),
            }
        };

        Self::fetch_once(self.client.as_ref(), &self.state, &endpoint, generation).await
    }

    pub async fn stop(&self) {
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
        }

        let mut state = self.state.write().await;
        if state.endpoint.is_some() {
            *state = HardwareState {
                generation: state.generation + 1,
                ..HardwareState::default()
            };
            tracing::info!("hardware poller stopped");
        }
    }

    async fn fetch_once(
        client: &dyn StatusClient,
        state: &RwLock<HardwareState>,
        endpoint: &str,
        generation: u64,
    ) -> std::result::Result<(), CycleError> {
        let result = client
            .fetch(endpoint)
            .await
            .and_then(|payload| HardwareInfo::from_envelope(&payload));

        let mut state = state.write().await;
        if state.generation != generation {
            return Err(CycleError::Cancelled {
                started: generation,
                current: state.generation,
            });
        }

        match result {
            Ok(info) => {
                tracing::debug!(endpoint, disks = info.disk_info.len(), "hardware info refreshed");
                state.info = Some(info);
                state.last_update = Some(Local::now());
                state.last_error = None;
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, endpoint, "hardware query failed");
                state.last_error = Some(error.to_string());
                Err(error)
            }
        }
    }
}

impl Drop for HardwarePoller {
    fn drop(&mut self) {
        if let Ok(mut task) = self.task.try_lock() {
            if let Some(handle) = task.take() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use tokio::sync::Semaphore;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(2);
    const SLOW: Duration = Duration::from_secs(3600);

    fn hardware(model: &str) -> Value {
        json!({
            "success": true,
            "data": { "cpu_info": { "model": model, "total_cores": 8 } }
        })
    }

    struct ScriptedClient {
        responses: std::sync::Mutex<VecDeque<std::result::Result<Value, CycleError>>>,
        endpoints: std::sync::Mutex<Vec<String>>,
        gate: Option<Semaphore>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<std::result::Result<Value, CycleError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: std::sync::Mutex::new(responses.into()),
                endpoints: std::sync::Mutex::new(Vec::new()),
                gate: None,
            })
        }

        fn gated() -> Arc<Self> {
            Arc::new(Self {
                responses: std::sync::Mutex::new(VecDeque::new()),
                endpoints: std::sync::Mutex::new(Vec::new()),
                gate: Some(Semaphore::new(0)),
            })
        }

        fn endpoints(&self) -> Vec<String> {
            self.endpoints.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StatusClient for ScriptedClient {
        async fn fetch(&self, endpoint: &str) -> std::result::Result<Value, CycleError> {
            self.endpoints.lock().unwrap().push(endpoint.to_string());

            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }

            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(hardware("default")))
        }
    }

    async fn wait_until<F>(mut condition: F)
    where
        F: FnMut() -> bool,
    {
        timeout(WAIT, async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    async fn wait_for_info(poller: &HardwarePoller) -> HardwareState {
        let state = poller.state();
        timeout(WAIT, async {
            loop {
                {
                    let state = state.read().await;
                    if state.info.is_some() || state.last_error.is_some() {
                        return state.clone();
                    }
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_watch_fetches_hardware_route_immediately() {
        let client = ScriptedClient::new(vec![Ok(hardware("EPYC 7763"))]);
        let poller = HardwarePoller::new(client.clone(), SLOW);

        poller.watch("http://10.0.0.5:48877/api/status").await.unwrap();
        let state = wait_for_info(&poller).await;

        assert_eq!(state.info.unwrap().cpu_info.model, "EPYC 7763");
        assert!(state.last_update.is_some());
        assert_eq!(
            client.endpoints(),
            vec!["http://10.0.0.5:48877/api/system/hardware".to_string()]
        );

        poller.stop().await;
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_info() {
        let client = ScriptedClient::new(vec![
            Ok(hardware("EPYC 7763")),
            Err(CycleError::Network("HTTP 500: Internal Server Error".to_string())),
        ]);
        let poller = HardwarePoller::new(client, SLOW);
        poller.watch("http://a/api/status").await.unwrap();
        wait_for_info(&poller).await;

        let result = poller.refresh().await;
        assert!(matches!(result, Err(CycleError::Network(_))));

        let state = poller.state().read().await.clone();
        assert!(state.is_stale());
        assert_eq!(state.info.unwrap().cpu_info.model, "EPYC 7763");
        assert!(state.last_error.unwrap().contains("500"));

        poller.refresh().await.unwrap();
        assert!(!poller.state().read().await.is_stale());

        poller.stop().await;
    }

    #[tokio::test]
    async fn test_server_reported_failure_is_recorded() {
        let client = ScriptedClient::new(vec![Ok(json!({
            "success": false,
            "data": null,
            "error": "permission denied"
        }))]);
        let poller = HardwarePoller::new(client, SLOW);
        poller.watch("http://a/api/status").await.unwrap();

        let state = wait_for_info(&poller).await;
        assert!(state.info.is_none());
        assert!(!state.is_stale());
        assert!(state.last_error.unwrap().contains("permission denied"));

        poller.stop().await;
    }

    #[tokio::test]
    async fn test_result_for_previous_server_is_discarded() {
        let client = ScriptedClient::gated();
        let poller = Arc::new(HardwarePoller::new(client.clone(), SLOW));

        poller.watch("http://a/api/status").await.unwrap();
        wait_until(|| client.endpoints().len() == 1).await;

        let refreshing = {
            let poller = poller.clone();
            tokio::spawn(async move { poller.refresh().await })
        };
        wait_until(|| client.endpoints().len() == 2).await;

        poller.watch("http://b/api/status").await.unwrap();
        wait_until(|| client.endpoints().len() == 3).await;

        client.gate.as_ref().unwrap().add_permits(2);

        let result = timeout(WAIT, refreshing).await.unwrap().unwrap();
        assert!(matches!(result, Err(CycleError::Cancelled { .. })));

        let state = wait_for_info(&poller).await;
        assert_eq!(state.endpoint.as_deref(), Some("http://b/api/system/hardware"));
        assert!(state.info.is_some());

        poller.stop().await;
    }

    #[tokio::test]
    async fn test_stop_forgets_target_and_info() {
        let client = ScriptedClient::new(vec![Ok(hardware("EPYC 7763"))]);
        let poller = HardwarePoller::new(client.clone(), SLOW);
        poller.watch("http://a/api/status").await.unwrap();
        wait_for_info(&poller).await;

        poller.stop().await;

        let state = poller.state().read().await.clone();
        assert!(state.endpoint.is_none());
        assert!(state.info.is_none());
        tokio_test::assert_ok!(poller.refresh().await);
        assert_eq!(client.endpoints().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_without_target_is_noop() {
        let client = ScriptedClient::new(Vec::new());
        let poller = HardwarePoller::new(client.clone(), SLOW);

        tokio_test::assert_ok!(poller.refresh().await);
        assert!(client.endpoints().is_empty());
    }

    #[tokio::test]
    async fn test_watch_rejects_invalid_endpoint() {
        let poller = HardwarePoller::new(ScriptedClient::new(Vec::new()), SLOW);
        tokio_test::assert_err!(poller.watch("not a url").await);
    }
}
