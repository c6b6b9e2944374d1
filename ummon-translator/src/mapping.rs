//! Fixed metric schema over the ummon-server snapshots.
//!
//! Label order is part of the output contract: `instance` first when
//! enabled, then `version` or `collection`/`task`. Unchanged upstream
//! state therefore renders to byte-identical documents.

use ummon_core::profile::MappingProfile;
use ummon_core::snapshot::{InstanceSnapshot, StatusSnapshot, TaskCollectionSnapshot};
use ummon_exposition::{MetricCollection, Sample};

pub const VERSION: &str = "ummon_version";
pub const OK: &str = "ummon_ok";
pub const CURRENT_WORKERS: &str = "ummon_current_workers";
pub const MAX_WORKERS: &str = "ummon_max_workers";
pub const QUEUE_LENGTH: &str = "ummon_queue_length";
pub const IS_PAUSED: &str = "ummon_is_paused";
pub const TASK_LAST_SUCCESSFUL_RUN: &str = "ummon_task_last_successful_run";
pub const TASK_LAST_EXIT_STATUS: &str = "ummon_task_last_exit_status";
pub const TASK_SUCCESSFUL_RUNS: &str = "ummon_task_successful_runs";
pub const TASK_FAILED_RUNS: &str = "ummon_task_failed_runs";

const OK_HELP: &str = "Is the server up?";

/// Builds metric collections for one upstream instance.
#[derive(Debug, Clone)]
pub struct SchemaMapper {
    profile: MappingProfile,
    instance: String,
}

impl SchemaMapper {
    pub fn new(profile: MappingProfile, instance: impl Into<String>) -> Self {
        Self {
            profile,
            instance: instance.into(),
        }
    }

    pub fn profile(&self) -> &MappingProfile {
        &self.profile
    }

    /// Every sample starts here so the instance label always comes first.
    fn sample(&self, value: f64) -> Sample {
        let sample = Sample::new(value);
        if self.profile.include_instance_label {
            sample.with_label("instance", self.instance.as_str())
        } else {
            sample
        }
    }

    fn single_gauge(&self, name: &str, help: &str, value: f64) -> MetricCollection {
        MetricCollection::gauge(name, help).with_sample(self.sample(value))
    }

    pub fn instance_metrics(&self, instance: &InstanceSnapshot) -> Vec<MetricCollection> {
        vec![
            MetricCollection::gauge(VERSION, "the version string of the server")
                .with_sample(self.sample(1.0).with_label("version", instance.version.as_str())),
            self.single_gauge(OK, OK_HELP, instance.ok.as_gauge()),
        ]
    }

    pub fn status_metrics(&self, status: &StatusSnapshot) -> Vec<MetricCollection> {
        vec![
            self.single_gauge(
                CURRENT_WORKERS,
                "Number of tasks currently being run",
                status.worker_count() as f64,
            ),
            self.single_gauge(MAX_WORKERS, "Max workers available", status.max_workers as f64),
            self.single_gauge(
                QUEUE_LENGTH,
                "Number of tasks waiting in the queue",
                status.queue_length() as f64,
            ),
            self.single_gauge(IS_PAUSED, "Is the server paused?", status.is_paused.as_gauge()),
        ]
    }

    pub fn task_metrics(&self, tasks: &TaskCollectionSnapshot) -> Vec<MetricCollection> {
        let mut last_successful_run = MetricCollection::gauge(
            TASK_LAST_SUCCESSFUL_RUN,
            "Unix Timestamp for the last time a task was successfully run",
        );
        let mut last_exit_status = MetricCollection::gauge(
            TASK_LAST_EXIT_STATUS,
            "Exit code from the last run of the task",
        );
        let mut successful_runs = MetricCollection::counter(
            TASK_SUCCESSFUL_RUNS,
            "Cumulative count of successful runs of a task since last reboot of ummon-server",
        );
        let mut failed_runs = MetricCollection::counter(
            TASK_FAILED_RUNS,
            "Cumulative count of failed runs of a task since last reboot of ummon-server",
        );

        for (collection, task) in tasks.tasks() {
            let sample = |value: f64| {
                self.sample(value)
                    .with_label("collection", collection)
                    .with_label("task", task.id.as_str())
            };

            // A task that never succeeded still reports, as 0.
            let last_run = task
                .last_successful_run
                .filter(|raw| *raw != 0.0)
                .map(|raw| self.profile.to_seconds(raw))
                .unwrap_or(0.0);
            last_successful_run.push(sample(last_run));

            if let Some(code) = task.last_exit_code() {
                last_exit_status.push(sample(code as f64));
            }

            if self.profile.track_run_counters {
                if let Some(total) = task.total_successful_runs {
                    successful_runs.push(sample(total as f64));
                }
                if let Some(total) = task.total_failed_runs {
                    failed_runs.push(sample(total as f64));
                }
            }
        }

        let mut out = vec![last_successful_run, last_exit_status];
        if self.profile.track_run_counters {
            out.push(successful_runs);
            out.push(failed_runs);
        }
        out
    }

    /// The whole document served while the upstream cannot be reached.
    pub fn unreachable(&self) -> Vec<MetricCollection> {
        vec![self.single_gauge(OK, OK_HELP, 0.0)]
    }
}
