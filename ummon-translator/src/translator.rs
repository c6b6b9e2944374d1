use crate::mapping::SchemaMapper;
use crate::source::{Endpoint, FetchOutcome, SnapshotSource};
use serde::de::DeserializeOwned;
use tracing::warn;
use ummon_core::ExporterError;
use ummon_core::profile::MappingProfile;
use ummon_core::snapshot::{InstanceSnapshot, StatusSnapshot, TaskCollectionSnapshot};
use ummon_exposition::{MetricCollection, render};

/// Collections produced by one scrape.
#[derive(Debug, Clone)]
pub struct Scrape {
    pub collections: Vec<MetricCollection>,
    /// False when the degraded document was served instead.
    pub upstream_up: bool,
}

/// Fetch → map → render for one upstream instance.
///
/// Holds no state between scrapes besides the source itself.
pub struct Translator<S> {
    source: S,
    mapper: SchemaMapper,
}

impl<S: SnapshotSource> Translator<S> {
    /// `instance` identifies the upstream host in the `instance` label.
    pub fn new(source: S, profile: MappingProfile, instance: impl Into<String>) -> Self {
        Self {
            source,
            mapper: SchemaMapper::new(profile, instance),
        }
    }

    pub fn mapper(&self) -> &SchemaMapper {
        &self.mapper
    }

    /// Fetch status, tasks and instance in sequence and map them.
    ///
    /// The first unreachable fetch short-circuits into the degraded
    /// document; every other failure is returned as an error.
    pub async fn scrape(&self) -> Result<Scrape, ExporterError> {
        let Some(status) = self.fetch::<StatusSnapshot>(Endpoint::Status).await? else {
            return Ok(self.degraded());
        };
        let Some(tasks) = self.fetch::<TaskCollectionSnapshot>(Endpoint::Tasks).await? else {
            return Ok(self.degraded());
        };
        let Some(instance) = self.fetch::<InstanceSnapshot>(Endpoint::Instance).await? else {
            return Ok(self.degraded());
        };

        let mut collections = self.mapper.instance_metrics(&instance);
        collections.extend(self.mapper.status_metrics(&status));
        collections.extend(self.mapper.task_metrics(&tasks));
        Ok(Scrape {
            collections,
            upstream_up: true,
        })
    }

    /// Scrape and render to the text exposition format.
    pub async fn render(&self) -> Result<String, ExporterError> {
        let scrape = self.scrape().await?;
        render(&scrape.collections)
    }

    /// `None` means the upstream could not be reached.
    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
    ) -> Result<Option<T>, ExporterError> {
        match self.source.fetch(endpoint).await? {
            FetchOutcome::Document(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| ExporterError::payload(endpoint.name(), e)),
            FetchOutcome::Unreachable { reason } => {
                warn!(
                    endpoint = %endpoint,
                    reason = %reason,
                    "Upstream unreachable, serving degraded document"
                );
                Ok(None)
            }
        }
    }

    fn degraded(&self) -> Scrape {
        Scrape {
            collections: self.mapper.unreachable(),
            upstream_up: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    /// Serves canned outcomes and records the order of requests.
    struct CannedSource {
        status: FetchOutcome,
        tasks: FetchOutcome,
        instance: FetchOutcome,
        calls: Mutex<Vec<Endpoint>>,
    }

    impl CannedSource {
        fn healthy() -> Self {
            Self {
                status: FetchOutcome::Document(
                    json!({"workers": [], "maxWorkers": 1, "queue": [], "isPaused": false}),
                ),
                tasks: FetchOutcome::Document(json!({"collections": []})),
                instance: FetchOutcome::Document(json!({"version": "1.0", "ok": true})),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Endpoint> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SnapshotSource for CannedSource {
        async fn fetch(&self, endpoint: Endpoint) -> Result<FetchOutcome, ExporterError> {
            self.calls.lock().unwrap().push(endpoint);
            Ok(match endpoint {
                Endpoint::Status => self.status.clone(),
                Endpoint::Tasks => self.tasks.clone(),
                Endpoint::Instance => self.instance.clone(),
            })
        }
    }

    fn unreachable() -> FetchOutcome {
        FetchOutcome::Unreachable {
            reason: "connection refused".into(),
        }
    }

    #[tokio::test]
    async fn healthy_scrape_fetches_in_order() {
        let translator = Translator::new(CannedSource::healthy(), MappingProfile::default(), "h");
        let scrape = translator.scrape().await.unwrap();
        assert!(scrape.upstream_up);
        assert_eq!(
            translator.source.calls(),
            vec![Endpoint::Status, Endpoint::Tasks, Endpoint::Instance]
        );
        let names: Vec<&str> = scrape.collections.iter().map(|c| c.name()).collect();
        assert_eq!(&names[..6], &[
            "ummon_version",
            "ummon_ok",
            "ummon_current_workers",
            "ummon_max_workers",
            "ummon_queue_length",
            "ummon_is_paused",
        ]);
    }

    #[tokio::test]
    async fn unreachable_status_skips_remaining_fetches() {
        let source = CannedSource {
            status: unreachable(),
            ..CannedSource::healthy()
        };
        let translator = Translator::new(source, MappingProfile::default(), "h");
        let scrape = translator.scrape().await.unwrap();
        assert!(!scrape.upstream_up);
        assert_eq!(scrape.collections.len(), 1);
        assert_eq!(translator.source.calls(), vec![Endpoint::Status]);
    }

    #[tokio::test]
    async fn unreachable_tasks_skips_instance_fetch() {
        let source = CannedSource {
            tasks: unreachable(),
            ..CannedSource::healthy()
        };
        let translator = Translator::new(source, MappingProfile::default(), "h");
        let scrape = translator.scrape().await.unwrap();
        assert!(!scrape.upstream_up);
        assert_eq!(scrape.collections.len(), 1);
        assert_eq!(
            translator.source.calls(),
            vec![Endpoint::Status, Endpoint::Tasks]
        );
    }

    #[tokio::test]
    async fn unreachable_instance_discards_earlier_documents() {
        let source = CannedSource {
            instance: unreachable(),
            ..CannedSource::healthy()
        };
        let translator = Translator::new(source, MappingProfile::default(), "h");
        let scrape = translator.scrape().await.unwrap();
        assert!(!scrape.upstream_up);
        assert_eq!(scrape.collections.len(), 1);
        assert_eq!(scrape.collections[0].name(), "ummon_ok");
        assert_eq!(
            translator.source.calls(),
            vec![Endpoint::Status, Endpoint::Tasks, Endpoint::Instance]
        );
    }

    #[tokio::test]
    async fn malformed_status_is_fatal() {
        let source = CannedSource {
            status: FetchOutcome::Document(Value::String("nope".into())),
            ..CannedSource::healthy()
        };
        let translator = Translator::new(source, MappingProfile::default(), "h");
        let err = translator.scrape().await.unwrap_err();
        assert!(matches!(err, ExporterError::Payload { ref endpoint, .. } if endpoint == "status"));
        assert_eq!(translator.source.calls(), vec![Endpoint::Status]);
    }

    #[tokio::test]
    async fn source_errors_propagate() {
        struct Failing;

        #[async_trait]
        impl SnapshotSource for Failing {
            async fn fetch(&self, endpoint: Endpoint) -> Result<FetchOutcome, ExporterError> {
                Err(ExporterError::UpstreamStatus {
                    endpoint: endpoint.to_string(),
                    status: 401,
                })
            }
        }

        let translator = Translator::new(Failing, MappingProfile::default(), "h");
        let err = translator.render().await.unwrap_err();
        assert!(matches!(err, ExporterError::UpstreamStatus { status: 401, .. }));
    }
}
