//! Reward configuration
//!
//! All tunables carry defaults so an empty TOML table is a valid config.

use serde::{Deserialize, Serialize};

use crate::penalty::ThresholdPolicy;
use crate::types::{Result, ScoreError};

/// How a batch is turned into rewards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// `(1 - w) * accuracy + w * format`
    FormatWeighted,
    /// `accuracy`
    Accuracy,
    /// `accuracy + R_length`, threshold = mean length of correct samples
    #[default]
    SafeZone,
    /// `accuracy + R_length`, threshold = mean * (1 + tolerance_factor)
    ToleranceZone,
}

impl ScoringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMode::FormatWeighted => "format_weighted",
            ScoringMode::Accuracy => "accuracy",
            ScoringMode::SafeZone => "safe_zone",
            ScoringMode::ToleranceZone => "tolerance_zone",
        }
    }

    pub fn all() -> Vec<ScoringMode> {
        vec![
            ScoringMode::FormatWeighted,
            ScoringMode::Accuracy,
            ScoringMode::SafeZone,
            ScoringMode::ToleranceZone,
        ]
    }

    /// Whether this mode applies the batch-relative length penalty.
    pub fn is_length_limited(&self) -> bool {
        matches!(self, ScoringMode::SafeZone | ScoringMode::ToleranceZone)
    }
}

impl std::fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ScoringMode {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "format_weighted" | "format" => Ok(ScoringMode::FormatWeighted),
            "accuracy" | "wo_format" => Ok(ScoringMode::Accuracy),
            "safe_zone" | "length_limit" => Ok(ScoringMode::SafeZone),
            "tolerance_zone" | "tolerance" => Ok(ScoringMode::ToleranceZone),
            other => Err(ScoreError::InvalidConfig(format!("unknown scoring mode: {}", other))),
        }
    }
}

/// What a sample's `length` measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthMetric {
    /// Unicode scalar values of the raw, unnormalized response
    #[default]
    Chars,
    /// Caller-supplied `num_tokens`
    Tokens,
}

/// What to do when the grader itself fails on a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraderErrorPolicy {
    /// Fail the whole batch; no partial results.
    #[default]
    Abort,
    /// Treat the sample as incorrect and keep going.
    ScoreAsIncorrect,
}

/// Scoring tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    #[serde(default)]
    pub mode: ScoringMode,
    /// Weight of the format score in `format_weighted` mode
    #[serde(default = "default_format_weight")]
    pub format_weight: f64,
    /// Length at which the penalty saturates at -1
    #[serde(default = "default_hard_limit")]
    pub hard_limit: usize,
    /// Widening factor of the tolerance zone
    #[serde(default = "default_tolerance_factor")]
    pub tolerance_factor: f64,
    #[serde(default)]
    pub length_metric: LengthMetric,
    #[serde(default)]
    pub on_grader_error: GraderErrorPolicy,
}

fn default_format_weight() -> f64 { 0.1 }
fn default_hard_limit() -> usize { 2048 }
fn default_tolerance_factor() -> f64 { 0.5 }

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            mode: ScoringMode::default(),
            format_weight: default_format_weight(),
            hard_limit: default_hard_limit(),
            tolerance_factor: default_tolerance_factor(),
            length_metric: LengthMetric::default(),
            on_grader_error: GraderErrorPolicy::default(),
        }
    }
}

impl RewardConfig {
    pub fn with_mode(mut self, mode: ScoringMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_hard_limit(mut self, hard_limit: usize) -> Self {
        self.hard_limit = hard_limit;
        self
    }

    pub fn with_tolerance_factor(mut self, tolerance_factor: f64) -> Self {
        self.tolerance_factor = tolerance_factor;
        self
    }

    pub fn with_format_weight(mut self, format_weight: f64) -> Self {
        self.format_weight = format_weight;
        self
    }

    pub fn with_length_metric(mut self, length_metric: LengthMetric) -> Self {
        self.length_metric = length_metric;
        self
    }

    pub fn with_grader_error_policy(mut self, policy: GraderErrorPolicy) -> Self {
        self.on_grader_error = policy;
        self
    }

    /// Parse and validate a TOML document holding the reward table's fields
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ScoreError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.format_weight) {
            return Err(ScoreError::InvalidConfig(format!(
                "format_weight must be within [0, 1], got {}",
                self.format_weight
            )));
        }
        if self.hard_limit == 0 {
            return Err(ScoreError::InvalidConfig("hard_limit must be positive".into()));
        }
        if !self.tolerance_factor.is_finite() || self.tolerance_factor < 0.0 {
            return Err(ScoreError::InvalidConfig(format!(
                "tolerance_factor must be a non-negative number, got {}",
                self.tolerance_factor
            )));
        }
        Ok(())
    }

    /// Threshold policy for the length-limited modes, `None` otherwise.
    pub fn threshold_policy(&self) -> Option<ThresholdPolicy> {
        match self.mode {
            ScoringMode::SafeZone => Some(ThresholdPolicy::SafeZone),
            ScoringMode::ToleranceZone => Some(ThresholdPolicy::ToleranceZone {
                tolerance_factor: self.tolerance_factor,
            }),
            ScoringMode::FormatWeighted | ScoringMode::Accuracy => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RewardConfig::default();
        assert_eq!(config.mode, ScoringMode::SafeZone);
        assert_eq!(config.format_weight, 0.1);
        assert_eq!(config.hard_limit, 2048);
        assert_eq!(config.length_metric, LengthMetric::Chars);
        assert_eq!(config.on_grader_error, GraderErrorPolicy::Abort);
    }

    #[test]
    fn test_parse_toml() {
        let config = RewardConfig::from_toml(
            r#"
mode = "tolerance_zone"
hard_limit = 4096
tolerance_factor = 0.25
on_grader_error = "score_as_incorrect"
"#,
        )
        .unwrap();
        assert_eq!(config.mode, ScoringMode::ToleranceZone);
        assert_eq!(config.hard_limit, 4096);
        assert_eq!(
            config.threshold_policy(),
            Some(ThresholdPolicy::ToleranceZone { tolerance_factor: 0.25 })
        );
        assert_eq!(config.format_weight, 0.1);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(RewardConfig::from_toml("").unwrap(), RewardConfig::default());
    }

    #[test]
    fn test_validation() {
        assert!(RewardConfig::default().with_format_weight(1.5).validate().is_err());
        assert!(RewardConfig::default().with_hard_limit(0).validate().is_err());
        assert!(RewardConfig::default().with_tolerance_factor(-0.1).validate().is_err());
        assert!(RewardConfig::default().with_tolerance_factor(f64::NAN).validate().is_err());
        assert!(RewardConfig::from_toml("hard_limit = 0").is_err());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("tolerance-zone".parse::<ScoringMode>().unwrap(), ScoringMode::ToleranceZone);
        assert_eq!("FORMAT_WEIGHTED".parse::<ScoringMode>().unwrap(), ScoringMode::FormatWeighted);
        assert!("median".parse::<ScoringMode>().is_err());
        for mode in ScoringMode::all() {
            assert_eq!(mode.as_str().parse::<ScoringMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_no_policy_for_flat_modes() {
        let config = RewardConfig::default().with_mode(ScoringMode::Accuracy);
        assert_eq!(config.threshold_policy(), None);
        assert!(!config.mode.is_length_limited());
    }
}
