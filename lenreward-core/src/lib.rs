//! lenreward - batch reward scoring for RL fine-tuning
//!
//! Grades a batch of model responses against their ground truths and shapes
//! each reward with a length penalty whose threshold is derived from the batch
//! itself (the mean length of the correct responses).
//!
//! # Example
//!
//! ```rust
//! use lenreward::{RewardConfig, RewardInput, RewardScorer, ScoringMode};
//!
//! let scorer = RewardScorer::new(
//!     RewardConfig::default()
//!         .with_mode(ScoringMode::ToleranceZone)
//!         .with_tolerance_factor(0.5),
//! ).unwrap();
//!
//! let records = scorer.score_batch(&[
//!     RewardInput::new("<think>2+2</think> \\boxed{4}", "4"),
//!     RewardInput::new("<think>hmm</think> \\boxed{5}", "4"),
//! ]).unwrap();
//!
//! assert_eq!(records[0].overall, 1.0);
//! assert_eq!(records[1].accuracy, 0.0);
//! ```

mod types;
pub mod config;
pub mod grader;
pub mod penalty;
pub mod scoring;
pub mod stats;
pub mod text;

pub use config::{GraderErrorPolicy, LengthMetric, RewardConfig, ScoringMode};
pub use grader::{accuracy_reward, extract_boxed_content, grade_answer, Grader, MathGrader};
pub use penalty::{length_penalty, ThresholdPolicy};
pub use scoring::{
    score_accuracy, score_format_weighted, score_safe_zone, score_tolerance_zone, RewardScorer,
};
pub use stats::BatchStats;
pub use text::{format_reward, is_format_compliant, normalize_response};
pub use types::{GradeError, Result, RewardInput, RewardRecord, ScoreError};
