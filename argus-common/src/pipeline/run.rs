use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::health::{PipelineHealth, classify};
use crate::task::PipelineTask;

/// One execution attempt of a pipeline, as reported by the upstream
/// scheduler's run listing. `health` and `tasks` are filled in by
/// enrichment; until then they hold their defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineRun {
    /// Absent when the run has not started yet or upstream omits it.
    pub start_date: Option<DateTime<Utc>>,
    pub dag_run_id: String,
    pub state: String,
    #[serde(default)]
    pub health: PipelineHealth,
    #[serde(default)]
    pub tasks: Vec<PipelineTask>,
}

impl PipelineRun {
    /// Returns a new run carrying the given task detail and the health
    /// verdict derived from it. The receiver is consumed rather than
    /// mutated in place, so enriched runs never alias unenriched ones.
    pub fn enriched_with(self, tasks: Vec<PipelineTask>) -> Self {
        let health = classify(&self.state, &tasks);

        Self {
            health,
            tasks,
            ..self
        }
    }
}

/// Latest-view projection for one pipeline.
/// ---
/// `last_completed` refers strictly to the most recent *successful*
/// run; a pipeline currently failing after a past success still
/// reports that success here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineStatus {
    pub last_completed: Option<DateTime<Utc>>,
    pub health: PipelineHealth,
    pub schedule: Option<String>,
}

impl PipelineStatus {
    /// Projection for a pipeline with no successful run on record.
    pub fn never_succeeded(schedule: Option<String>) -> Self {
        Self {
            last_completed: None,
            health: PipelineHealth::Unknown,
            schedule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrichment_computes_health() {
        let run = PipelineRun {
            start_date: None,
            dag_run_id: "manual__2024-01-01".into(),
            state: "success".into(),
            health: PipelineHealth::Unknown,
            tasks: vec![],
        };

        let enriched = run.enriched_with(vec![PipelineTask::new("extract", "failed")]);

        assert_eq!(enriched.health, PipelineHealth::Orange);
        assert_eq!(enriched.tasks.len(), 1);
    }

    #[test]
    fn test_run_deserializes_without_enrichment_fields() {
        let payload = r#"{
            "start_date": "2024-03-01T06:00:00+00:00",
            "dag_run_id": "scheduled__2024-03-01",
            "state": "running"
        }"#;

        let run: PipelineRun = serde_json::from_str(payload).unwrap();

        assert_eq!(run.state, "running");
        assert_eq!(run.health, PipelineHealth::Unknown);
        assert!(run.tasks.is_empty());
    }

    #[test]
    fn test_never_succeeded_projection() {
        let status = PipelineStatus::never_succeeded(Some("@daily".into()));

        assert!(status.last_completed.is_none());
        assert_eq!(status.health, PipelineHealth::Unknown);
        assert_eq!(status.schedule.as_deref(), Some("@daily"));
    }
}
