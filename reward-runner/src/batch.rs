//! Batch loading from JSON and JSON Lines files

use serde_json::Value;
use std::path::Path;

use lenreward::RewardRecord;

use crate::genlog::GenerationSample;

/// Error type for batch loading
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Load a batch from `path`.
///
/// `.jsonl` files become an array with one element per non-empty line. Any
/// other file is parsed as a single JSON document and returned as-is, so a
/// lone object stays an object and is rejected later by the scorer.
pub fn load_batch_from_file(path: impl AsRef<Path>) -> Result<Value, LoadError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;

    let is_jsonl = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("jsonl"))
        .unwrap_or(false);

    if is_jsonl {
        load_batch_from_jsonl(&content)
    } else {
        load_batch_from_str(&content)
    }
}

/// Parse a single JSON document
pub fn load_batch_from_str(content: &str) -> Result<Value, LoadError> {
    serde_json::from_str(content).map_err(|e| LoadError::Parse(e.to_string()))
}

/// Parse JSON Lines into an array
pub fn load_batch_from_jsonl(content: &str) -> Result<Value, LoadError> {
    let mut items = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let item = serde_json::from_str(line)
            .map_err(|e| LoadError::Parse(format!("Line {}: {}", idx + 1, e)))?;
        items.push(item);
    }
    Ok(Value::Array(items))
}

/// Pair each batch item with its record for generation logging.
///
/// `prompt` is optional in the input; missing fields log as empty strings.
pub fn generation_samples(batch: &[Value], records: &[RewardRecord]) -> Vec<GenerationSample> {
    let field = |item: &Value, key: &str| {
        item.get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };

    batch
        .iter()
        .zip(records)
        .map(|(item, record)| GenerationSample {
            prompt: field(item, "prompt"),
            output: field(item, "response"),
            label: field(item, "ground_truth"),
            score: record.overall,
        })
        .collect()
}
