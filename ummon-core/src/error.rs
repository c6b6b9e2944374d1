use thiserror::Error;

/// Fatal failures of a scrape or of startup.
///
/// An unreachable upstream is deliberately absent here: it is reported as
/// a fetch outcome and turned into the degraded document, never an error.
#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Upstream {endpoint} returned HTTP {status}")]
    UpstreamStatus { endpoint: String, status: u16 },

    #[error("Upstream {endpoint} request failed: {message}")]
    UpstreamRequest { endpoint: String, message: String },

    #[error("Malformed payload from {endpoint}: {source}")]
    Payload {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Render error: {0}")]
    Render(String),
}

impl ExporterError {
    /// Map to HTTP status code for the metrics endpoint.
    pub fn status_code(&self) -> u16 {
        match self {
            ExporterError::UpstreamStatus { .. } => 502,
            ExporterError::UpstreamRequest { .. } => 502,
            _ => 500,
        }
    }

    pub fn payload(endpoint: impl Into<String>, source: serde_json::Error) -> Self {
        ExporterError::Payload {
            endpoint: endpoint.into(),
            source,
        }
    }
}
