use serde::{Deserialize, Serialize};

/// Schedule metadata for one pipeline, as listed by the upstream
/// scheduler's DAG collection endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DagInfo {
    pub dag_id: String,
    pub schedule_interval: Option<ScheduleInterval>,
    #[serde(default)]
    pub is_paused: bool,
}

/// Upstream wraps the schedule expression in an object; only the
/// human-readable `value` is of interest here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduleInterval {
    pub value: Option<String>,
}

impl DagInfo {
    /// The currently active schedule expression.
    /// ---
    /// A paused pipeline reports no active schedule, even when one is
    /// configured upstream.
    pub fn schedule(&self) -> Option<String> {
        if self.is_paused {
            return None;
        }

        self.schedule_interval
            .as_ref()
            .and_then(|interval| interval.value.clone())
    }
}
