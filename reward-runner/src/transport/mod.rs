//! Dashboard transports for remote generation logging

pub mod http;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use http::HttpTransport;
pub use traits::{DashboardTransport, Publication, TransportError, TransportResult};
