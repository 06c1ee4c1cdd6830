//! Background delivery for remote generation logs

pub mod publisher;

pub use publisher::{publish_with_retry, PublishStats, Publisher, RetryPolicy};
