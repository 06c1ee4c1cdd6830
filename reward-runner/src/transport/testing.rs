//! In-memory transport for tests

use async_trait::async_trait;
use std::sync::Mutex;

use super::traits::{DashboardTransport, Publication, TransportResult};

#[derive(Default)]
pub struct RecordingTransport {
    pub received: Mutex<Vec<Publication>>,
}

impl RecordingTransport {
    pub fn publications(&self) -> Vec<Publication> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl DashboardTransport for RecordingTransport {
    fn name(&self) -> &str {
        "recording"
    }

    async fn publish(&self, publication: &Publication) -> TransportResult<()> {
        self.received.lock().unwrap().push(publication.clone());
        Ok(())
    }
}
