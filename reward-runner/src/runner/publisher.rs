//! Background publisher with bounded retry
//!
//! Loggers hand publications to a channel and return immediately; a spawned
//! task delivers them one at a time, retrying with a fixed delay.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::transport::{DashboardTransport, Publication};

/// Fixed-delay retry budget for one publication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Pause between consecutive attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(3))
    }
}

/// Delivery counts reported when a publisher shuts down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishStats {
    pub delivered: usize,
    pub dropped: usize,
}

/// Try `publication` up to `policy.max_attempts` times. Returns whether it
/// was delivered.
pub async fn publish_with_retry(
    transport: &dyn DashboardTransport,
    policy: &RetryPolicy,
    publication: &Publication,
) -> bool {
    for attempt in 1..=policy.max_attempts {
        match transport.publish(publication).await {
            Ok(()) => return true,
            Err(e) => {
                tracing::warn!(
                    "Publishing {} (step {}) to {} failed (attempt {}/{}): {}",
                    publication.key,
                    publication.step,
                    transport.name(),
                    attempt,
                    policy.max_attempts,
                    e
                );
                if attempt < policy.max_attempts {
                    sleep(policy.delay).await;
                }
            }
        }
    }

    tracing::error!(
        "Failed to publish {} to {} after {} attempts, skipping step {}",
        publication.key,
        transport.name(),
        policy.max_attempts,
        publication.step
    );
    false
}

enum Command {
    Publish(Publication),
    Flush(oneshot::Sender<PublishStats>),
}

/// Handle to a background delivery task
pub struct Publisher {
    tx: Mutex<Option<mpsc::UnboundedSender<Command>>>,
    worker: tokio::sync::Mutex<Option<JoinHandle<PublishStats>>>,
}

impl Publisher {
    /// Spawn the delivery task. Must be called inside a tokio runtime.
    pub fn spawn(transport: Arc<dyn DashboardTransport>, policy: RetryPolicy) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Command>();

        let worker = tokio::spawn(async move {
            let mut stats = PublishStats::default();
            while let Some(command) = rx.recv().await {
                match command {
                    Command::Publish(publication) => {
                        if publish_with_retry(transport.as_ref(), &policy, &publication).await {
                            stats.delivered += 1;
                        } else {
                            stats.dropped += 1;
                        }
                    }
                    // Commands run in order, so everything queued before the
                    // marker has been handled by now.
                    Command::Flush(ack) => {
                        let _ = ack.send(stats);
                    }
                }
            }
            stats
        });

        Self {
            tx: Mutex::new(Some(tx)),
            worker: tokio::sync::Mutex::new(Some(worker)),
        }
    }

    fn send(&self, command: Command) -> bool {
        let guard = match self.tx.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match guard.as_ref() {
            Some(tx) => tx.send(command).is_ok(),
            None => false,
        }
    }

    /// Queue a publication without waiting for delivery.
    pub fn publish(&self, publication: Publication) {
        if !self.send(Command::Publish(publication)) {
            tracing::warn!("Publisher is shut down, dropping publication");
        }
    }

    /// Wait until every publication queued so far has been delivered or
    /// dropped. The queue stays open.
    ///
    /// Returns the running totals, or `None` after shutdown.
    pub async fn flush(&self) -> Option<PublishStats> {
        let (ack_tx, ack_rx) = oneshot::channel();
        if !self.send(Command::Flush(ack_tx)) {
            return None;
        }
        ack_rx.await.ok()
    }

    /// Close the queue and wait for everything already queued.
    ///
    /// Returns `None` if the publisher was already shut down.
    pub async fn shutdown(&self) -> Option<PublishStats> {
        {
            let mut guard = match self.tx.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.take();
        }

        let handle = self.worker.lock().await.take()?;
        match handle.await {
            Ok(stats) => Some(stats),
            Err(e) => {
                tracing::error!("Publisher task panicked: {}", e);
                None
            }
        }
    }
}
