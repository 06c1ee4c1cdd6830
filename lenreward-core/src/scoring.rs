//! Batch scoring
//!
//! Length-limited modes run two passes over the batch: the first grades every
//! sample and measures its length, the second shapes each reward against the
//! threshold derived from the first pass. Nothing carries over between calls.

use serde_json::Value;

use crate::config::{GraderErrorPolicy, LengthMetric, RewardConfig, ScoringMode};
use crate::grader::{Grader, MathGrader};
use crate::penalty::{length_penalty, ThresholdPolicy};
use crate::stats::BatchStats;
use crate::text::{format_reward, normalize_response};
use crate::types::{Result, RewardInput, RewardRecord, ScoreError};

/// Scores batches of responses under one [`RewardConfig`].
#[derive(Debug, Clone)]
pub struct RewardScorer<G = MathGrader> {
    config: RewardConfig,
    grader: G,
}

impl RewardScorer<MathGrader> {
    /// Scorer backed by the bundled [`MathGrader`]
    pub fn new(config: RewardConfig) -> Result<Self> {
        Self::with_grader(config, MathGrader)
    }
}

impl<G: Grader> RewardScorer<G> {
    pub fn with_grader(config: RewardConfig, grader: G) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, grader })
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    /// Score a batch. Output order and length follow `inputs`; any error
    /// discards the whole batch.
    pub fn score_batch(&self, inputs: &[RewardInput]) -> Result<Vec<RewardRecord>> {
        match self.config.threshold_policy() {
            Some(policy) => self.score_length_limited(inputs, policy),
            None if self.config.mode == ScoringMode::FormatWeighted => {
                self.score_format_weighted(inputs)
            }
            None => self.score_accuracy(inputs),
        }
    }

    /// Score a dynamically typed batch, e.g. one decoded from a trainer's JSON.
    ///
    /// Anything other than an array is rejected before grading starts.
    pub fn score_json(&self, batch: &Value) -> Result<Vec<RewardRecord>> {
        let items = batch.as_array().ok_or(ScoreError::BatchRequired)?;
        let inputs = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                RewardInput::deserialize_sample(item).map_err(|reason| {
                    ScoreError::InvalidSample { index, reason }
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.score_batch(&inputs)
    }

    fn score_format_weighted(&self, inputs: &[RewardInput]) -> Result<Vec<RewardRecord>> {
        let weight = self.config.format_weight;
        inputs
            .iter()
            .enumerate()
            .map(|(index, input)| {
                let response = normalize_response(&input.response);
                let format = format_reward(&response);
                let accuracy = self.accuracy(index, &response, &input.ground_truth)?;
                Ok(RewardRecord {
                    overall: (1.0 - weight) * accuracy + weight * format,
                    format: Some(format),
                    ..RewardRecord::accuracy_only(accuracy)
                })
            })
            .collect()
    }

    fn score_accuracy(&self, inputs: &[RewardInput]) -> Result<Vec<RewardRecord>> {
        inputs
            .iter()
            .enumerate()
            .map(|(index, input)| {
                let response = normalize_response(&input.response);
                let accuracy = self.accuracy(index, &response, &input.ground_truth)?;
                Ok(RewardRecord::accuracy_only(accuracy))
            })
            .collect()
    }

    fn score_length_limited(
        &self,
        inputs: &[RewardInput],
        policy: ThresholdPolicy,
    ) -> Result<Vec<RewardRecord>> {
        // Pass 1: accuracy and length per sample.
        let graded = inputs
            .iter()
            .enumerate()
            .map(|(index, input)| {
                let length = self.sample_length(index, input)?;
                let response = normalize_response(&input.response);
                let accuracy = self.accuracy(index, &response, &input.ground_truth)?;
                Ok((accuracy, length))
            })
            .collect::<Result<Vec<_>>>()?;

        let stats = BatchStats::collect(
            graded.iter().map(|&(accuracy, length)| (accuracy == 1.0, length)),
        );
        let threshold = stats.threshold(policy);
        tracing::debug!(
            mode = %self.config.mode,
            batch_size = inputs.len(),
            correct = stats.correct_count,
            mean = stats.mean_length_of_correct,
            ?threshold,
            hard_limit = self.config.hard_limit,
            "length threshold for batch"
        );

        // Pass 2: shape against the batch threshold.
        Ok(graded
            .into_iter()
            .map(|(accuracy, length)| {
                let r_length = length_penalty(length, threshold, self.config.hard_limit);
                RewardRecord {
                    overall: accuracy + r_length,
                    accuracy,
                    format: None,
                    r_length: Some(r_length),
                    l_mean: stats.mean(),
                    threshold,
                }
            })
            .collect())
    }

    fn accuracy(&self, index: usize, response: &str, ground_truth: &str) -> Result<f64> {
        match self.grader.grade(response, ground_truth) {
            Ok(true) => Ok(1.0),
            Ok(false) => Ok(0.0),
            Err(source) => match self.config.on_grader_error {
                GraderErrorPolicy::Abort => Err(ScoreError::Grader { index, source }),
                GraderErrorPolicy::ScoreAsIncorrect => {
                    tracing::warn!(index, error = %source, "grader failed, scoring sample as incorrect");
                    Ok(0.0)
                }
            },
        }
    }

    fn sample_length(&self, index: usize, input: &RewardInput) -> Result<usize> {
        match self.config.length_metric {
            LengthMetric::Chars => Ok(input.response.chars().count()),
            LengthMetric::Tokens => input
                .num_tokens
                .ok_or(ScoreError::MissingTokenCount { index }),
        }
    }
}

impl RewardInput {
    fn deserialize_sample(item: &Value) -> std::result::Result<Self, String> {
        if !item.is_object() {
            return Err(format!("expected an object, got {}", json_kind(item)));
        }
        serde_json::from_value(item.clone()).map_err(|e| e.to_string())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// `(1 - format_weight) * accuracy + format_weight * format` with [`MathGrader`].
pub fn score_format_weighted(
    inputs: &[RewardInput],
    format_weight: f64,
) -> Result<Vec<RewardRecord>> {
    let config = RewardConfig::default()
        .with_mode(ScoringMode::FormatWeighted)
        .with_format_weight(format_weight);
    RewardScorer::new(config)?.score_batch(inputs)
}

/// Accuracy alone with [`MathGrader`].
pub fn score_accuracy(inputs: &[RewardInput]) -> Result<Vec<RewardRecord>> {
    RewardScorer::new(RewardConfig::default().with_mode(ScoringMode::Accuracy))?
        .score_batch(inputs)
}

/// Dynamic safe-zone shaping with [`MathGrader`].
pub fn score_safe_zone(inputs: &[RewardInput], hard_limit: usize) -> Result<Vec<RewardRecord>> {
    let config = RewardConfig::default()
        .with_mode(ScoringMode::SafeZone)
        .with_hard_limit(hard_limit);
    RewardScorer::new(config)?.score_batch(inputs)
}

/// Dynamic tolerance-zone shaping with [`MathGrader`].
pub fn score_tolerance_zone(
    inputs: &[RewardInput],
    hard_limit: usize,
    tolerance_factor: f64,
) -> Result<Vec<RewardRecord>> {
    let config = RewardConfig::default()
        .with_mode(ScoringMode::ToleranceZone)
        .with_hard_limit(hard_limit)
        .with_tolerance_factor(tolerance_factor);
    RewardScorer::new(config)?.score_batch(inputs)
}
