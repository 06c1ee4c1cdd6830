use criterion::{measurement::WallTime, BenchmarkGroup, BenchmarkId};
use std::hint::black_box;

use lenreward::{RewardConfig, RewardScorer, ScoringMode};

use crate::common::data;

pub fn bench_modes(group: &mut BenchmarkGroup<WallTime>, batch_size: usize) {
    let batch = data::math_batch(batch_size);

    for mode in ScoringMode::all() {
        let scorer = RewardScorer::new(RewardConfig::default().with_mode(mode)).unwrap();
        group.bench_function(BenchmarkId::new(mode.as_str(), batch_size), |b| {
            b.iter(|| scorer.score_batch(black_box(&batch)).unwrap());
        });
    }
}
