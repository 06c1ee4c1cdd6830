//! Table generation logger
//!
//! Keeps one growing table for the whole run (a row per logged step) and
//! republishes the full table each time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Mutex;

use super::{GenerationLogger, GenerationSample, GENERATIONS_KEY};
use crate::runner::Publisher;
use crate::transport::Publication;

/// Accumulated generations, columns `step, input_i, output_i, label_i, score_i`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationTable {
    pub columns: Vec<String>,
    pub data: Vec<Vec<Value>>,
}

impl GenerationTable {
    pub fn columns_for(sample_count: usize) -> Vec<String> {
        let mut columns = vec!["step".to_string()];
        for i in 1..=sample_count {
            columns.push(format!("input_{}", i));
            columns.push(format!("output_{}", i));
            columns.push(format!("label_{}", i));
            columns.push(format!("score_{}", i));
        }
        columns
    }

    /// Append a row for `step`. Columns are fixed by the first call; rows of a
    /// different width are padded with nulls or truncated.
    pub fn append(&mut self, samples: &[GenerationSample], step: u64) {
        if self.columns.is_empty() {
            self.columns = Self::columns_for(samples.len());
        }

        let mut row = vec![json!(step)];
        for sample in samples {
            row.push(json!(sample.prompt));
            row.push(json!(sample.output));
            row.push(json!(sample.label));
            row.push(json!(sample.score));
        }

        if row.len() != self.columns.len() {
            tracing::warn!(
                "Generation table has {} columns but step {} logged {} samples",
                self.columns.len(),
                step,
                samples.len()
            );
            row.resize(self.columns.len(), Value::Null);
        }
        self.data.push(row);
    }

    pub fn to_json(&self) -> Value {
        json!({ "columns": self.columns, "data": self.data })
    }
}

/// Publishes the accumulated [`GenerationTable`] to a dashboard
pub struct TableGenerationLogger {
    publisher: Publisher,
    table: Mutex<GenerationTable>,
}

impl TableGenerationLogger {
    pub fn new(publisher: Publisher) -> Self {
        Self {
            publisher,
            table: Mutex::new(GenerationTable::default()),
        }
    }

    /// Snapshot of the table as published so far
    pub fn table(&self) -> GenerationTable {
        match self.table.lock() {
            Ok(table) => table.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl GenerationLogger for TableGenerationLogger {
    fn name(&self) -> &str {
        "table"
    }

    fn log(&self, samples: &[GenerationSample], step: u64) {
        // The table grows even when a publish is later dropped, so the next
        // step still carries every earlier row.
        let snapshot = {
            let mut table = match self.table.lock() {
                Ok(table) => table,
                Err(poisoned) => poisoned.into_inner(),
            };
            table.append(samples, step);
            table.to_json()
        };
        self.publisher
            .publish(Publication::new(step, GENERATIONS_KEY, snapshot));
    }

    async fn flush(&self) {
        if let Some(stats) = self.publisher.flush().await {
            tracing::debug!(
                "Table logger has delivered {} publications, dropped {}",
                stats.delivered,
                stats.dropped
            );
        }
    }

    async fn close(&self) {
        if let Some(stats) = self.publisher.shutdown().await {
            tracing::info!(
                "Table logger delivered {} publications, dropped {}",
                stats.delivered,
                stats.dropped
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::RetryPolicy;
    use crate::transport::testing::RecordingTransport;
    use std::sync::Arc;
    use std::time::Duration;

    fn samples(n: usize) -> Vec<GenerationSample> {
        (0..n)
            .map(|i| GenerationSample::new(format!("p{}", i), format!("o{}", i), "l", i as f64))
            .collect()
    }

    #[test]
    fn test_columns() {
        assert_eq!(
            GenerationTable::columns_for(2),
            vec!["step", "input_1", "output_1", "label_1", "score_1", "input_2", "output_2", "label_2", "score_2"]
        );
    }

    #[test]
    fn test_append_keeps_first_width() {
        let mut table = GenerationTable::default();
        table.append(&samples(2), 1);
        table.append(&samples(1), 2);
        table.append(&samples(3), 3);
        assert_eq!(table.data.len(), 3);
        assert!(table.data.iter().all(|row| row.len() == 9));
        assert_eq!(table.data[1][5], Value::Null);
        assert_eq!(table.data[2][1], json!("p0"));
    }

    #[tokio::test]
    async fn test_publishes_whole_table_each_step() {
        let transport = Arc::new(RecordingTransport::default());
        let logger = TableGenerationLogger::new(Publisher::spawn(
            transport.clone(),
            RetryPolicy::new(1, Duration::from_millis(1)),
        ));

        logger.log(&samples(1), 10);
        logger.log(&samples(1), 20);
        logger.flush().await;

        let publications = transport.publications();
        assert_eq!(publications.len(), 2);
        assert_eq!(publications[0].data["data"].as_array().unwrap().len(), 1);
        assert_eq!(publications[1].data["data"].as_array().unwrap().len(), 2);
        assert_eq!(publications[1].data["data"][1][0], json!(20));
        assert_eq!(logger.table().data.len(), 2);
    }
}
