//! HTTP dashboard client

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::traits::{DashboardTransport, Publication, TransportError, TransportResult};
use crate::config::DashboardConfig;

/// Posts publications as JSON to a dashboard endpoint
pub struct HttpTransport {
    endpoint: String,
    token: Option<String>,
    timeout: Duration,
    http_client: Client,
}

#[derive(Serialize)]
struct PublishBody {
    step: u64,
    data: serde_json::Map<String, serde_json::Value>,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: None,
            timeout: Duration::from_secs(30),
            http_client: Client::new(),
        }
    }

    /// Build from the dashboard section; the token is read from the
    /// configured environment variable when set.
    pub fn from_config(config: &DashboardConfig) -> TransportResult<Self> {
        let endpoint = config.endpoint.clone().ok_or_else(|| {
            TransportError::Config("logging.dashboard.endpoint is not set".to_string())
        })?;
        let mut transport = Self::new(endpoint).with_timeout(config.timeout());
        if let Ok(token) = std::env::var(&config.api_key_env) {
            transport = transport.with_token(token);
        }
        Ok(transport)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DashboardTransport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn publish(&self, publication: &Publication) -> TransportResult<()> {
        let mut data = serde_json::Map::new();
        data.insert(publication.key.clone(), publication.data.clone());
        let body = PublishBody {
            step: publication.step,
            data,
        };

        let mut request = self
            .http_client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = match tokio::time::timeout(self.timeout, request.send()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(TransportError::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        };

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TransportError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
