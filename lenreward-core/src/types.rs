//! Core types for batch reward scoring

use serde::{Deserialize, Serialize};

/// One response submitted for scoring, paired with its reference answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardInput {
    pub response: String,
    pub ground_truth: String,
    /// Token count supplied by the caller. Only read under
    /// [`LengthMetric::Tokens`](crate::config::LengthMetric::Tokens).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_tokens: Option<usize>,
}

impl RewardInput {
    pub fn new(response: impl Into<String>, ground_truth: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            ground_truth: ground_truth.into(),
            num_tokens: None,
        }
    }

    pub fn with_num_tokens(mut self, num_tokens: usize) -> Self {
        self.num_tokens = Some(num_tokens);
        self
    }
}

/// Reward produced for one input.
///
/// Which optional fields are present depends on the scoring mode. The
/// serialized names match what downstream trainers index on
/// (`overall`, `accuracy`, `format`, `R_length`, `L_mean`, `threshold`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardRecord {
    pub overall: f64,
    pub accuracy: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<f64>,
    #[serde(rename = "R_length", default, skip_serializing_if = "Option::is_none")]
    pub r_length: Option<f64>,
    #[serde(rename = "L_mean", default, skip_serializing_if = "Option::is_none")]
    pub l_mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

impl RewardRecord {
    /// Record carrying only the accuracy signal.
    pub fn accuracy_only(accuracy: f64) -> Self {
        Self {
            overall: accuracy,
            accuracy,
            format: None,
            r_length: None,
            l_mean: None,
            threshold: None,
        }
    }
}

/// Failure reported by a grading collaborator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GradeError {
    #[error("grader failed: {0}")]
    Collaborator(String),
}

/// Errors raised while scoring a batch
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("Please use `reward_type=batch` for math reward function.")]
    BatchRequired,

    #[error("invalid sample at index {index}: {reason}")]
    InvalidSample { index: usize, reason: String },

    #[error("sample at index {index} has no num_tokens but the length metric is tokens")]
    MissingTokenCount { index: usize },

    #[error("grading sample {index} failed: {source}")]
    Grader {
        index: usize,
        #[source]
        source: GradeError,
    },

    #[error("invalid reward config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ScoreError>;
