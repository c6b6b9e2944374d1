use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use ummon_core::ExporterError;

/// The three documents a scrape reads from ummon-server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Instance,
    Status,
    Tasks,
}

impl Endpoint {
    /// Path relative to the upstream base URL.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Instance => "",
            Endpoint::Status => "status",
            Endpoint::Tasks => "tasks",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Instance => "instance",
            Endpoint::Status => "status",
            Endpoint::Tasks => "tasks",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a single fetch that did not fail fatally.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Document(Value),
    /// Connection-level failure: refused, DNS, TLS handshake.
    Unreachable { reason: String },
}

/// Something that can hand back the raw JSON of an upstream endpoint.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self, endpoint: Endpoint) -> Result<FetchOutcome, ExporterError>;
}

#[async_trait]
impl<T: SnapshotSource + ?Sized> SnapshotSource for Arc<T> {
    async fn fetch(&self, endpoint: Endpoint) -> Result<FetchOutcome, ExporterError> {
        (**self).fetch(endpoint).await
    }
}
