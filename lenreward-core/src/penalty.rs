//! Length-penalty shaping
//!
//! A single piecewise-linear shaper; the safe-zone and tolerance-zone policies
//! only differ in how the threshold is derived from the batch mean.

use serde::{Deserialize, Serialize};

/// How the zero-penalty threshold is derived from the mean correct length
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ThresholdPolicy {
    /// threshold = mean
    SafeZone,
    /// threshold = mean * (1 + tolerance_factor)
    ToleranceZone { tolerance_factor: f64 },
}

impl ThresholdPolicy {
    pub fn derive(&self, mean: f64) -> f64 {
        match self {
            ThresholdPolicy::SafeZone => mean,
            ThresholdPolicy::ToleranceZone { tolerance_factor } => mean * (1.0 + tolerance_factor),
        }
    }
}

/// Penalty `R_length` in `[-1, 0]` for a sample of `length`.
///
/// * no threshold (no correct samples in the batch): 0
/// * `length <= threshold`: 0
/// * `threshold >= hard_limit`: -1
/// * otherwise a linear ramp from 0 at the threshold to -1 at `hard_limit`,
///   clamped at -1 beyond it
pub fn length_penalty(length: usize, threshold: Option<f64>, hard_limit: usize) -> f64 {
    let Some(threshold) = threshold else {
        return 0.0;
    };
    let length = length as f64;
    let hard_limit = hard_limit as f64;

    if length <= threshold {
        0.0
    } else if threshold >= hard_limit {
        -1.0
    } else {
        ((threshold - length) / (hard_limit - threshold)).max(-1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_threshold_is_unpenalized() {
        assert_eq!(length_penalty(0, None, 2048), 0.0);
        assert_eq!(length_penalty(100_000, None, 2048), 0.0);
    }

    #[test]
    fn test_inside_zone_inclusive() {
        assert_eq!(length_penalty(150, Some(150.0), 2048), 0.0);
        assert_eq!(length_penalty(10, Some(150.0), 2048), 0.0);
    }

    #[test]
    fn test_ramp_reaches_minus_one_at_hard_limit() {
        assert_eq!(length_penalty(2048, Some(150.0), 2048), -1.0);
        let mid = length_penalty(1099, Some(150.0), 2048);
        assert!((mid + 0.5).abs() < 1e-12, "mid = {}", mid);
    }

    #[test]
    fn test_clamped_past_hard_limit() {
        assert_eq!(length_penalty(9000, Some(150.0), 2048), -1.0);
    }

    #[test]
    fn test_degenerate_threshold_at_or_above_limit() {
        assert_eq!(length_penalty(2049, Some(2048.0), 2048), -1.0);
        assert_eq!(length_penalty(3001, Some(3000.0), 2048), -1.0);
        assert_eq!(length_penalty(3000, Some(3000.0), 2048), 0.0);
    }

    #[test]
    fn test_tolerance_ramp() {
        let threshold = ThresholdPolicy::ToleranceZone { tolerance_factor: 0.5 }.derive(150.0);
        assert_eq!(threshold, 225.0);
        assert_eq!(length_penalty(225, Some(threshold), 2048), 0.0);
        let just_over = length_penalty(226, Some(threshold), 2048);
        assert!((just_over - (-1.0 / 1823.0)).abs() < 1e-15);
    }
}
