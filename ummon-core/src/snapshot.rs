//! Typed views of the three documents served by ummon-server.
//!
//! Every snapshot is rebuilt from a single poll and discarded after the
//! scrape. Optional upstream fields stay `Option` all the way to the
//! mapping layer so that "not reported" never collapses into zero.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Exit code reported when the most recent run left no exit status.
///
/// Real POSIX exit codes are all below 256, so this cannot collide.
pub const UNKNOWN_EXIT_CODE: i64 = 999;

/// A boolean the upstream may send either as `true`/`false` or as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "RawFlag")]
pub struct Flag(bool);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Number(f64),
}

impl From<RawFlag> for Flag {
    fn from(raw: RawFlag) -> Self {
        match raw {
            RawFlag::Bool(b) => Flag(b),
            RawFlag::Number(n) => Flag(n != 0.0),
        }
    }
}

impl From<bool> for Flag {
    fn from(b: bool) -> Self {
        Flag(b)
    }
}

impl Flag {
    pub fn is_set(self) -> bool {
        self.0
    }

    /// 0/1 gauge value.
    pub fn as_gauge(self) -> f64 {
        if self.is_set() { 1.0 } else { 0.0 }
    }
}

/// `GET /` — instance information.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceSnapshot {
    pub version: String,
    pub ok: Flag,
}

/// `GET /status` — worker pool and queue state.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub workers: Vec<Value>,
    pub max_workers: u64,
    pub queue: Vec<Value>,
    pub is_paused: Flag,
}

impl StatusSnapshot {
    /// Size of the active worker list. Self-reported counts are ignored.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn queue_length(&self) -> usize {
        self.queue.len()
    }
}

/// `GET /tasks` — every collection with its tasks, in upstream order.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskCollectionSnapshot {
    pub collections: Vec<TaskCollection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskCollection {
    pub collection: String,
    pub tasks: Vec<TaskSnapshot>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    pub id: String,
    /// Raw epoch value; its unit depends on the upstream version.
    #[serde(default)]
    pub last_successful_run: Option<f64>,
    #[serde(default)]
    pub total_successful_runs: Option<u64>,
    #[serde(default)]
    pub total_failed_runs: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub recent_exit_codes: Vec<Option<i64>>,
}

impl TaskSnapshot {
    /// Most recent exit code, `None` when the task has no recorded runs.
    pub fn last_exit_code(&self) -> Option<i64> {
        self.recent_exit_codes
            .last()
            .map(|code| code.unwrap_or(UNKNOWN_EXIT_CODE))
    }
}

impl TaskCollectionSnapshot {
    /// Iterate `(collection name, task)` pairs in upstream order.
    pub fn tasks(&self) -> impl Iterator<Item = (&str, &TaskSnapshot)> {
        self.collections.iter().flat_map(|c| {
            c.tasks
                .iter()
                .map(move |task| (c.collection.as_str(), task))
        })
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
