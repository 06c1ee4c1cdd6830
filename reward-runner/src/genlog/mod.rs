//! Generation loggers
//!
//! Each logger receives `(prompt, output, label, score)` samples with a step
//! counter. Loggers are picked by name from configuration and combined with
//! [`AggregateGenerationLogger`]. Remote loggers never block the caller:
//! delivery happens on a [`Publisher`](crate::runner::Publisher) task.

pub mod console;
pub mod table;
pub mod text;

pub use console::ConsoleGenerationLogger;
pub use table::{GenerationTable, TableGenerationLogger};
pub use text::TextGenerationLogger;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::LoggingConfig;
use crate::runner::{Publisher, RetryPolicy};
use crate::transport::{DashboardTransport, HttpTransport, TransportError};

/// Dashboard key generation logs are published under
pub const GENERATIONS_KEY: &str = "val/generations";

/// One logged generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSample {
    pub prompt: String,
    pub output: String,
    pub label: String,
    pub score: f64,
}

impl GenerationSample {
    pub fn new(
        prompt: impl Into<String>,
        output: impl Into<String>,
        label: impl Into<String>,
        score: f64,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            output: output.into(),
            label: label.into(),
            score,
        }
    }
}

/// Sink for generation samples
#[async_trait]
pub trait GenerationLogger: Send + Sync {
    fn name(&self) -> &str;

    /// Record `samples` for `step`. Must not block on remote I/O.
    fn log(&self, samples: &[GenerationSample], step: u64);

    /// Wait for pending remote deliveries. The logger stays usable.
    async fn flush(&self) {}

    /// Deliver what is pending and stop accepting samples
    async fn close(&self) {}
}

/// Errors creating loggers
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("Unknown generation logger: {0}")]
    Unknown(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Names accepted by [`create_logger`]
pub const LOGGER_NAMES: &[&str] = &["console", "table", "text"];

/// Create a logger by name. Remote loggers use the configured dashboard.
pub fn create_logger(
    name: &str,
    config: &LoggingConfig,
) -> Result<Box<dyn GenerationLogger>, LoggerError> {
    match name.to_lowercase().as_str() {
        "console" => Ok(Box::new(ConsoleGenerationLogger)),
        "table" | "text" => {
            let transport = HttpTransport::from_config(&config.dashboard)?;
            create_remote_logger(name, Arc::new(transport), config.dashboard.retry_policy())
        }
        _ => Err(LoggerError::Unknown(name.to_string())),
    }
}

/// Create a remote logger (`table` or `text`) over an explicit transport.
pub fn create_remote_logger(
    name: &str,
    transport: Arc<dyn DashboardTransport>,
    policy: RetryPolicy,
) -> Result<Box<dyn GenerationLogger>, LoggerError> {
    match name.to_lowercase().as_str() {
        "table" => Ok(Box::new(TableGenerationLogger::new(Publisher::spawn(
            transport, policy,
        )))),
        "text" => Ok(Box::new(TextGenerationLogger::new(Publisher::spawn(
            transport, policy,
        )))),
        _ => Err(LoggerError::Unknown(name.to_string())),
    }
}

/// Fans every call out to a list of loggers
#[derive(Default)]
pub struct AggregateGenerationLogger {
    loggers: Vec<Box<dyn GenerationLogger>>,
}

impl AggregateGenerationLogger {
    pub fn new(loggers: Vec<Box<dyn GenerationLogger>>) -> Self {
        Self { loggers }
    }

    /// Build from `config.loggers`; names that cannot be created are skipped.
    pub fn from_config(config: &LoggingConfig) -> Self {
        let mut loggers = Vec::new();
        for name in &config.loggers {
            match create_logger(name, config) {
                Ok(logger) => loggers.push(logger),
                Err(e) => tracing::warn!("Skipping generation logger {}: {}", name, e),
            }
        }
        Self { loggers }
    }

    pub fn push(&mut self, logger: Box<dyn GenerationLogger>) {
        self.loggers.push(logger);
    }

    pub fn names(&self) -> Vec<&str> {
        self.loggers.iter().map(|l| l.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

#[async_trait]
impl GenerationLogger for AggregateGenerationLogger {
    fn name(&self) -> &str {
        "aggregate"
    }

    fn log(&self, samples: &[GenerationSample], step: u64) {
        for logger in &self.loggers {
            logger.log(samples, step);
        }
    }

    async fn flush(&self) {
        for logger in &self.loggers {
            logger.flush().await;
        }
    }

    async fn close(&self) {
        for logger in &self.loggers {
            logger.close().await;
        }
    }
}
