use std::{collections::BTreeMap, sync::Arc};

use argus_airflow::{AirflowApi, fetch_all_runs};
use argus_common::{
    error::Error,
    pipeline::{DagInfo, PipelineRun, PipelineStatus},
};
use futures::{StreamExt, TryStreamExt, stream};
use tracing::info;

/// Read model over the upstream scheduler: assembles per-pipeline
/// schedule metadata, latest-success status and full run history.
///
/// Holds no state between calls; every view is derived fresh from
/// upstream at query time. Any upstream error aborts the whole view
/// so a partial health picture is never presented as complete.
pub struct StatusRepository {
    api: Arc<dyn AirflowApi>,
    page_size: u64,
    max_concurrency: usize,
}

impl StatusRepository {
    pub fn new(api: Arc<dyn AirflowApi>, page_size: u64, max_concurrency: usize) -> Self {
        Self {
            api,
            page_size,
            max_concurrency,
        }
    }

    /// Maps every known pipeline to its active schedule expression.
    /// The DAG listing defines which pipelines exist; a paused DAG
    /// reports no schedule.
    pub async fn list_schedules(&self) -> Result<BTreeMap<String, Option<String>>, Error> {
        let dags = self.api.list_dags().await?;

        Ok(dags
            .into_iter()
            .map(|dag| {
                let schedule = dag.schedule();
                (dag.dag_id, schedule)
            })
            .collect())
    }

    /// Maps every known pipeline to the status of its most recent
    /// *successful* run. A pipeline that is failing right now but
    /// succeeded in the past reports that past success; a pipeline
    /// with no success on record reports the never-succeeded default.
    pub async fn latest_status(&self) -> Result<BTreeMap<String, PipelineStatus>, Error> {
        let dags = self.api.list_dags().await?;

        let statuses = stream::iter(dags)
            .map(|dag| self.status_for(dag))
            .buffer_unordered(self.max_concurrency)
            .try_collect::<BTreeMap<_, _>>()
            .await?;

        info!(pipelines = statuses.len(), "Computed latest status view");

        Ok(statuses)
    }

    /// Maps every known pipeline to its complete run history, every
    /// run enriched with task detail and health. Cost is one task
    /// fetch per historical run; callers needing bounded latency must
    /// window on top of this.
    pub async fn full_history(&self) -> Result<BTreeMap<String, Vec<PipelineRun>>, Error> {
        let dags = self.api.list_dags().await?;

        let histories = stream::iter(dags)
            .map(|dag| self.history_for(dag))
            .buffer_unordered(self.max_concurrency)
            .try_collect::<BTreeMap<_, _>>()
            .await?;

        info!(pipelines = histories.len(), "Computed full history view");

        Ok(histories)
    }

    async fn status_for(&self, dag: DagInfo) -> Result<(String, PipelineStatus), Error> {
        let schedule = dag.schedule();
        let dag_id = dag.dag_id;

        let runs = fetch_all_runs(self.api.as_ref(), &dag_id, self.page_size).await?;

        // History arrives in descending start-date order, so the first
        // success is the most recent one
        let status = match runs.into_iter().find(|run| run.state == "success") {
            Some(run) => {
                let run = self.enrich(&dag_id, run).await?;

                PipelineStatus {
                    last_completed: run.start_date,
                    health: run.health,
                    schedule,
                }
            }
            None => PipelineStatus::never_succeeded(schedule),
        };

        Ok((dag_id, status))
    }

    async fn history_for(&self, dag: DagInfo) -> Result<(String, Vec<PipelineRun>), Error> {
        let dag_id = dag.dag_id;

        let runs = fetch_all_runs(self.api.as_ref(), &dag_id, self.page_size).await?;

        let enriched = stream::iter(runs)
            .map(|run| self.enrich(&dag_id, run))
            .buffered(self.max_concurrency)
            .try_collect::<Vec<_>>()
            .await?;

        Ok((dag_id, enriched))
    }

    /// Fetches a run's task detail and returns the enriched run.
    async fn enrich(&self, dag_id: &str, run: PipelineRun) -> Result<PipelineRun, Error> {
        let tasks = self.api.list_task_instances(dag_id, &run.dag_run_id).await?;

        Ok(run.enriched_with(tasks))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use argus_common::{
        common::Pagination,
        pipeline::{PipelineHealth, ScheduleInterval},
        task::PipelineTask,
    };
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;

    struct FakeAirflow {
        dags: Vec<DagInfo>,
        runs: HashMap<String, Vec<PipelineRun>>,
        tasks: HashMap<(String, String), Vec<PipelineTask>>,
        task_calls: AtomicUsize,
        unavailable: bool,
    }

    impl FakeAirflow {
        fn new() -> Self {
            Self {
                dags: vec![],
                runs: HashMap::new(),
                tasks: HashMap::new(),
                task_calls: AtomicUsize::new(0),
                unavailable: false,
            }
        }

        fn unavailable() -> Self {
            Self {
                unavailable: true,
                ..Self::new()
            }
        }

        fn with_dag(mut self, dag_id: &str, schedule: Option<&str>, is_paused: bool) -> Self {
            self.dags.push(DagInfo {
                dag_id: dag_id.into(),
                schedule_interval: schedule.map(|value| ScheduleInterval {
                    value: Some(value.into()),
                }),
                is_paused,
            });
            self.runs.entry(dag_id.into()).or_default();
            self
        }

        fn with_run(
            mut self,
            dag_id: &str,
            run_id: &str,
            state: &str,
            start_date: Option<DateTime<Utc>>,
            tasks: Vec<PipelineTask>,
        ) -> Self {
            self.runs.entry(dag_id.into()).or_default().push(PipelineRun {
                start_date,
                dag_run_id: run_id.into(),
                state: state.into(),
                health: Default::default(),
                tasks: vec![],
            });
            self.tasks.insert((dag_id.into(), run_id.into()), tasks);
            self
        }

        fn repository(self) -> StatusRepository {
            StatusRepository::new(Arc::new(self), 100, 4)
        }
    }

    #[async_trait]
    impl AirflowApi for FakeAirflow {
        async fn list_dags(&self) -> Result<Vec<DagInfo>, Error> {
            if self.unavailable {
                return Err(Error::UpstreamUnavailable);
            }

            Ok(self.dags.clone())
        }

        async fn list_dag_runs(
            &self,
            dag_id: &str,
            page: &Pagination,
        ) -> Result<Vec<PipelineRun>, Error> {
            if self.unavailable {
                return Err(Error::UpstreamUnavailable);
            }

            let runs = self
                .runs
                .get(dag_id)
                .ok_or_else(|| Error::UnknownPipeline(dag_id.to_string()))?;

            let start = (page.offset as usize).min(runs.len());
            let end = (start + page.limit as usize).min(runs.len());

            Ok(runs[start..end].to_vec())
        }

        async fn list_task_instances(
            &self,
            dag_id: &str,
            dag_run_id: &str,
        ) -> Result<Vec<PipelineTask>, Error> {
            if self.unavailable {
                return Err(Error::UpstreamUnavailable);
            }

            self.task_calls.fetch_add(1, Ordering::SeqCst);

            Ok(self
                .tasks
                .get(&(dag_id.to_string(), dag_run_id.to_string()))
                .cloned()
                .unwrap_or_default())
        }
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 6, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_latest_status_reports_most_recent_success() {
        // Descending start-date order, the way upstream returns runs:
        // a fresh failure sits above an older success
        let repo = FakeAirflow::new()
            .with_dag("dreem", Some("0 6 * * *"), false)
            .with_run("dreem", "run-3", "failed", Some(at(3)), vec![])
            .with_run(
                "dreem",
                "run-2",
                "success",
                Some(at(2)),
                vec![PipelineTask::new("extract", "success")],
            )
            .with_run("dreem", "run-1", "success", Some(at(1)), vec![])
            .repository();

        let statuses = repo.latest_status().await.unwrap();
        let status = &statuses["dreem"];

        assert_eq!(status.last_completed, Some(at(2)));
        assert_eq!(status.health, PipelineHealth::Green);
        assert_eq!(status.schedule.as_deref(), Some("0 6 * * *"));
    }

    #[tokio::test]
    async fn test_latest_status_uses_task_detail_of_that_success() {
        let repo = FakeAirflow::new()
            .with_dag("cantab", None, false)
            .with_run(
                "cantab",
                "run-1",
                "success",
                Some(at(1)),
                vec![
                    PipelineTask::new("extract", "success"),
                    PipelineTask::new("load", "upstream_failed"),
                ],
            )
            .repository();

        let statuses = repo.latest_status().await.unwrap();

        assert_eq!(statuses["cantab"].health, PipelineHealth::Orange);
    }

    #[tokio::test]
    async fn test_pipeline_without_success_reports_default() {
        let repo = FakeAirflow::new()
            .with_dag("wildkeys", Some("@daily"), false)
            .with_run("wildkeys", "run-1", "failed", Some(at(1)), vec![])
            .with_dag("stressmonitor", Some("@weekly"), false)
            .repository();

        let statuses = repo.latest_status().await.unwrap();

        let failing = &statuses["wildkeys"];
        assert_eq!(failing.last_completed, None);
        assert_eq!(failing.health, PipelineHealth::Unknown);
        assert_eq!(failing.schedule.as_deref(), Some("@daily"));

        let never_ran = &statuses["stressmonitor"];
        assert_eq!(never_ran.last_completed, None);
        assert_eq!(never_ran.health, PipelineHealth::Unknown);
    }

    #[tokio::test]
    async fn test_paused_pipeline_reports_no_schedule() {
        let repo = FakeAirflow::new()
            .with_dag("dreem", Some("0 6 * * *"), true)
            .repository();

        let statuses = repo.latest_status().await.unwrap();
        assert_eq!(statuses["dreem"].schedule, None);

        let schedules = repo.list_schedules().await.unwrap();
        assert_eq!(schedules["dreem"], None);
    }

    #[tokio::test]
    async fn test_full_history_enriches_every_run() {
        let api = Arc::new(
            FakeAirflow::new()
                .with_dag("dreem", None, false)
                .with_run("dreem", "run-2", "running", Some(at(2)), vec![])
                .with_run(
                    "dreem",
                    "run-1",
                    "success",
                    Some(at(1)),
                    vec![PipelineTask::new("extract", "failed")],
                )
                .with_dag("cantab", None, false)
                .with_run("cantab", "run-1", "failed", Some(at(1)), vec![]),
        );
        let repo = StatusRepository::new(api.clone(), 100, 4);

        let histories = repo.full_history().await.unwrap();

        assert_eq!(histories["dreem"].len(), 2);
        assert_eq!(histories["cantab"].len(), 1);

        // Order preserved, every run classified
        assert_eq!(histories["dreem"][0].health, PipelineHealth::Unknown);
        assert_eq!(histories["dreem"][1].health, PipelineHealth::Orange);
        assert_eq!(histories["dreem"][1].tasks.len(), 1);
        assert_eq!(histories["cantab"][0].health, PipelineHealth::Red);

        let total_runs = histories.values().map(Vec::len).sum::<usize>();
        assert_eq!(
            api.task_calls.load(Ordering::SeqCst),
            total_runs,
            "one task fetch per historical run"
        );
    }

    #[tokio::test]
    async fn test_unavailable_upstream_fails_every_view() {
        let repo = FakeAirflow::unavailable().repository();

        assert!(matches!(
            repo.latest_status().await,
            Err(Error::UpstreamUnavailable)
        ));
        assert!(matches!(
            repo.full_history().await,
            Err(Error::UpstreamUnavailable)
        ));
        assert!(matches!(
            repo.list_schedules().await,
            Err(Error::UpstreamUnavailable)
        ));
    }
}
