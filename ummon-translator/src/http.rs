use crate::source::{Endpoint, FetchOutcome, SnapshotSource};
use async_trait::async_trait;
use tracing::debug;
use ummon_core::ExporterError;
use ummon_core::config::UpstreamConfig;

/// Basic-auth reqwest client against one ummon-server instance.
///
/// Transport defaults are left untouched: no timeouts, no retries.
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl HttpSource {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ExporterError> {
        let base_url = config.base_url()?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("ummon-exporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ExporterError::Config(format!("http client: {e}")))?;
        let credentials = config
            .has_credentials()
            .then(|| (config.user.clone(), config.password.clone()));
        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }
}

#[async_trait]
impl SnapshotSource for HttpSource {
    async fn fetch(&self, endpoint: Endpoint) -> Result<FetchOutcome, ExporterError> {
        let url = self.url(endpoint);
        debug!(endpoint = %endpoint, url = %url, "Fetching upstream document");

        let mut request = self.client.get(&url);
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, Some(password));
        }

        let response = match request.send().await {
            Ok(resp) => resp,
            Err(e) if e.is_connect() => {
                return Ok(FetchOutcome::Unreachable {
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                return Err(ExporterError::UpstreamRequest {
                    endpoint: endpoint.to_string(),
                    message: e.to_string(),
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ExporterError::UpstreamStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ExporterError::UpstreamRequest {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;
        let document =
            serde_json::from_slice(&body).map_err(|e| ExporterError::payload(endpoint.name(), e))?;
        debug!(endpoint = %endpoint, bytes = body.len(), "Upstream document received");
        Ok(FetchOutcome::Document(document))
    }
}
