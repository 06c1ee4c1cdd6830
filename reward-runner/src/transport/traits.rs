//! Transport trait definitions for experiment dashboards

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One payload bound for a dashboard, keyed like `val/generations`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub step: u64,
    pub key: String,
    pub data: serde_json::Value,
}

impl Publication {
    pub fn new(step: u64, key: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            step,
            key: key.into(),
            data,
        }
    }
}

/// Error types for transport operations
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Dashboard error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Trait for dashboards that accept generation logs
#[async_trait]
pub trait DashboardTransport: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &str;

    /// Deliver one publication (single attempt)
    async fn publish(&self, publication: &Publication) -> TransportResult<()>;
}
