//! Text-panel generation logger

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{GenerationLogger, GenerationSample, GENERATIONS_KEY};
use crate::runner::Publisher;
use crate::transport::Publication;

/// Publishes one captioned text panel per sample
pub struct TextGenerationLogger {
    publisher: Publisher,
}

impl TextGenerationLogger {
    pub fn new(publisher: Publisher) -> Self {
        Self { publisher }
    }

    pub fn panels(samples: &[GenerationSample]) -> Vec<Value> {
        samples
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let text = [
                    format!("input: {}", s.prompt),
                    format!("output: {}", s.output),
                    format!("label: {}", s.label),
                    format!("score: {}", s.score),
                ]
                .join("\n\n---\n\n");
                json!({ "caption": format!("sample {}", i + 1), "text": text })
            })
            .collect()
    }
}

#[async_trait]
impl GenerationLogger for TextGenerationLogger {
    fn name(&self) -> &str {
        "text"
    }

    fn log(&self, samples: &[GenerationSample], step: u64) {
        let panels = Value::Array(Self::panels(samples));
        self.publisher
            .publish(Publication::new(step, GENERATIONS_KEY, panels));
    }

    async fn flush(&self) {
        if let Some(stats) = self.publisher.flush().await {
            tracing::debug!(
                "Text logger has delivered {} publications, dropped {}",
                stats.delivered,
                stats.dropped
            );
        }
    }

    async fn close(&self) {
        if let Some(stats) = self.publisher.shutdown().await {
            tracing::info!(
                "Text logger delivered {} publications, dropped {}",
                stats.delivered,
                stats.dropped
            );
        }
    }
}
