use serde::{Deserialize, Serialize};

/// Unit in which the upstream reports `lastSuccessfulRun`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimestampUnit {
    Seconds,
    Milliseconds,
}

/// Schema knobs that differ between ummon-server deployments.
///
/// Injected once at construction; the mapping never inspects the
/// upstream version string.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MappingProfile {
    #[serde(default = "default_timestamp_unit")]
    pub timestamp_unit: TimestampUnit,
    /// Attach `instance="<upstream host>"` to every sample.
    #[serde(default)]
    pub include_instance_label: bool,
    /// Expose the cumulative run counters when the upstream reports them.
    #[serde(default = "default_true")]
    pub track_run_counters: bool,
}

fn default_timestamp_unit() -> TimestampUnit { TimestampUnit::Milliseconds }
fn default_true() -> bool { true }

impl Default for MappingProfile {
    fn default() -> Self {
        Self {
            timestamp_unit: default_timestamp_unit(),
            include_instance_label: false,
            track_run_counters: true,
        }
    }
}

impl MappingProfile {
    /// Millisecond timestamps, instance label and run counters.
    pub fn labelled() -> Self {
        Self {
            include_instance_label: true,
            ..Self::default()
        }
    }

    /// Older servers: second timestamps, no run counters.
    pub fn legacy() -> Self {
        Self {
            timestamp_unit: TimestampUnit::Seconds,
            include_instance_label: true,
            track_run_counters: false,
        }
    }

    /// Convert a raw upstream epoch value to seconds.
    pub fn to_seconds(&self, raw: f64) -> f64 {
        match self.timestamp_unit {
            TimestampUnit::Seconds => raw,
            TimestampUnit::Milliseconds => raw / 1000.0,
        }
    }
}
