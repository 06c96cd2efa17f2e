use crate::error::CycleError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of raw status payloads. The controller owns one and calls it once
/// per polling cycle.
#[async_trait]
pub trait StatusClient: Send + Sync {
    async fn fetch(&self, endpoint: &str) -> Result<Value, CycleError>;
}

pub struct HttpStatusClient {
    client: Client,
}

impl HttpStatusClient {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }
}

impl Default for HttpStatusClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatusClient for HttpStatusClient {
    async fn fetch(&self, endpoint: &str) -> Result<Value, CycleError> {
        let response = self
            .client
            .get(endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| CycleError::Network(format!("request to {} failed: {}", endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CycleError::Network(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CycleError::Network(format!("failed to read body: {}", e)))?;

        serde_json::from_slice(&body)
            .map_err(|e| CycleError::MalformedPayload(format!("body is not JSON: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_fetch_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/status")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"cpu":{"usage_percent":12.5}}"#)
            .create_async()
            .await;

        let client = HttpStatusClient::new();
        let value = client
            .fetch(&format!("{}/api/status", server.url()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(value["cpu"]["usage_percent"], 12.5);
    }

    #[tokio::test]
    async fn test_fetch_http_error_is_network_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/status")
            .with_status(503)
            .create_async()
            .await;

        let client = HttpStatusClient::new();
        let err = client
            .fetch(&format!("{}/api/status", server.url()))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            CycleError::Network("HTTP 503: Service Unavailable".to_string())
        );
    }

    #[tokio::test]
    async fn test_fetch_non_json_is_malformed() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/status")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = HttpStatusClient::new();
        let err = client
            .fetch(&format!("{}/api/status", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, CycleError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_is_network_error() {
        let client = HttpStatusClient::with_timeout(Duration::from_millis(500));
        let err = client
            .fetch("http://127.0.0.1:1/api/status")
            .await
            .unwrap_err();

        assert!(matches!(err, CycleError::Network(_)));
    }
}
