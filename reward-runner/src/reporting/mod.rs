//! Results reporting

use serde::{Deserialize, Serialize};
use std::path::Path;

use lenreward::{RewardRecord, ScoringMode};

/// JSON summary of one scored batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub run_id: String,
    pub timestamp: String,
    pub mode: ScoringMode,
    pub batch_size: usize,
    /// Fraction of samples graded correct
    pub accuracy_rate: f64,
    pub mean_overall: f64,
    /// Mean length reward over samples that carry one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_r_length: Option<f64>,
    #[serde(rename = "L_mean", default, skip_serializing_if = "Option::is_none")]
    pub l_mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    /// Samples whose length reward is negative
    pub penalized: usize,
    /// Fraction of samples passing the format check (format-weighted mode only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_rate: Option<f64>,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

impl BatchSummary {
    /// Summarize `records` scored under `mode`
    pub fn from_records(run_id: impl Into<String>, mode: ScoringMode, records: &[RewardRecord]) -> Self {
        let batch_size = records.len();
        let correct = records.iter().filter(|r| r.accuracy > 0.0).count();

        // L_mean and threshold are batch-wide, so every record carries the same value.
        let l_mean = records.iter().find_map(|r| r.l_mean);
        let threshold = records.iter().find_map(|r| r.threshold);

        Self {
            run_id: run_id.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            mode,
            batch_size,
            accuracy_rate: if batch_size == 0 {
                0.0
            } else {
                correct as f64 / batch_size as f64
            },
            mean_overall: mean(records.iter().map(|r| r.overall)).unwrap_or(0.0),
            mean_r_length: mean(records.iter().filter_map(|r| r.r_length)),
            l_mean,
            threshold,
            penalized: records
                .iter()
                .filter(|r| r.r_length.map_or(false, |p| p < 0.0))
                .count(),
            format_rate: mean(records.iter().filter_map(|r| r.format)),
        }
    }

    /// Write to JSON file
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        write_json(path, self)
    }
}

/// Write per-sample records as a JSON array
pub fn write_records(path: impl AsRef<Path>, records: &[RewardRecord]) -> std::io::Result<()> {
    write_json(path, &records)
}

fn write_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, json)
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.3}", v),
        None => "-".to_string(),
    }
}

/// Generate a console report
pub fn print_console_report(summary: &BatchSummary, records: &[RewardRecord]) {
    println!("\n=== Reward Scoring Results ===\n");
    println!("Run ID:     {}", summary.run_id);
    println!("Mode:       {}", summary.mode);
    println!("Batch size: {}\n", summary.batch_size);

    println!("Summary:");
    println!("{:-<50}", "");
    println!("  Accuracy rate:  {:.3}", summary.accuracy_rate);
    println!("  Mean overall:   {:.3}", summary.mean_overall);
    if let Some(rate) = summary.format_rate {
        println!("  Format rate:    {:.3}", rate);
    }
    if summary.mode.is_length_limited() {
        println!("  L_mean:         {}", fmt_opt(summary.l_mean));
        println!("  Threshold:      {}", fmt_opt(summary.threshold));
        println!("  Mean R_length:  {}", fmt_opt(summary.mean_r_length));
        println!("  Penalized:      {}", summary.penalized);
    }

    println!("\nSamples:");
    println!("{:-<50}", "");
    for (i, record) in records.iter().enumerate() {
        println!(
            "  {:>4}. overall {:>7.3}  accuracy {:.0}  R_length {}",
            i,
            record.overall,
            record.accuracy,
            fmt_opt(record.r_length)
        );
    }

    println!("\n{:=<50}", "");
}
