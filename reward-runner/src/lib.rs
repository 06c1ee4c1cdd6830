//! Batch reward scoring runner
//!
//! Wraps the `lenreward` scoring engine with file loading, TOML
//! configuration, console and JSON reporting, and generation loggers that
//! publish sample outputs to a remote dashboard in the background.
//!
//! # Example
//!
//! ```no_run
//! use reward_runner::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_or_default();
//!     let batch = load_batch_from_file("batch.jsonl")?;
//!
//!     let scorer = RewardScorer::new(config.reward.clone())?;
//!     let records = scorer.score_json(&batch)?;
//!
//!     let logger = AggregateGenerationLogger::from_config(&config.logging);
//!     if let Some(items) = batch.as_array() {
//!         logger.log(&generation_samples(items, &records), 0);
//!     }
//!     logger.close().await;
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod config;
pub mod genlog;
pub mod reporting;
pub mod runner;
pub mod transport;

pub use config::Config;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::batch::{generation_samples, load_batch_from_file, LoadError};
    pub use crate::config::{Config, ConfigError, DashboardConfig, LoggingConfig};
    pub use crate::genlog::{
        create_logger, AggregateGenerationLogger, GenerationLogger, GenerationSample,
    };
    pub use crate::reporting::{print_console_report, write_records, BatchSummary};
    pub use crate::runner::{Publisher, RetryPolicy};
    pub use crate::transport::{DashboardTransport, HttpTransport, Publication};
    pub use lenreward::{RewardConfig, RewardInput, RewardRecord, RewardScorer, ScoreError, ScoringMode};
}
