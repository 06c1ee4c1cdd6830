//! Batch statistics for length shaping

use serde::{Deserialize, Serialize};

use crate::penalty::ThresholdPolicy;

/// Aggregate over the correct samples of one batch.
///
/// `mean_length_of_correct` is 0.0 when nothing is correct; use
/// [`BatchStats::threshold`] rather than the bare mean.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchStats {
    pub has_correct_samples: bool,
    pub correct_count: usize,
    pub mean_length_of_correct: f64,
}

impl BatchStats {
    /// Single pass over `(is_correct, length)` pairs.
    pub fn collect<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = (bool, usize)>,
    {
        // Integer sum keeps the mean independent of sample order.
        let (count, total) = samples
            .into_iter()
            .filter(|&(is_correct, _)| is_correct)
            .fold((0usize, 0u128), |(count, total), (_, length)| {
                (count + 1, total + length as u128)
            });

        if count == 0 {
            return Self::default();
        }

        Self {
            has_correct_samples: true,
            correct_count: count,
            mean_length_of_correct: total as f64 / count as f64,
        }
    }

    /// Batch-relative threshold under `policy`; `None` without correct samples.
    pub fn threshold(&self, policy: ThresholdPolicy) -> Option<f64> {
        self.has_correct_samples
            .then(|| policy.derive(self.mean_length_of_correct))
    }

    /// The mean, when defined.
    pub fn mean(&self) -> Option<f64> {
        self.has_correct_samples.then_some(self.mean_length_of_correct)
    }
}
