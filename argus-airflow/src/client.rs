use argus_common::{
    common::Pagination,
    error::Error,
    pipeline::{DagInfo, PipelineRun},
    task::PipelineTask,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    config::AirflowConfig,
    wire::{DagCollection, DagRunCollection, TaskInstanceCollection},
};

/// Read-only interface onto the upstream scheduler's REST API.
/// ---
/// Should be used through dyn dispatch at the top level so the
/// repository and its tests can run against an in-memory fake.
#[async_trait]
pub trait AirflowApi: Send + Sync {
    /// Lists every DAG the scheduler knows about, with its schedule
    /// metadata. This listing defines which pipelines exist.
    async fn list_dags(&self) -> Result<Vec<DagInfo>, Error>;

    /// Lists one window of a DAG's run history.
    /// ---
    /// Precondition of this contract: records come back ordered by
    /// descending start date, stable across windows within one walk.
    async fn list_dag_runs(
        &self,
        dag_id: &str,
        page: &Pagination,
    ) -> Result<Vec<PipelineRun>, Error>;

    /// Lists the task instances of one run.
    async fn list_task_instances(
        &self,
        dag_id: &str,
        dag_run_id: &str,
    ) -> Result<Vec<PipelineTask>, Error>;
}

/// Reqwest-backed [`AirflowApi`] using basic auth against
/// `{base_url}/api/v1`. No retries at this layer; retry policy belongs
/// to the caller.
#[derive(Clone, Debug)]
pub struct AirflowClient {
    http: reqwest::Client,
    config: AirflowConfig,
}

impl AirflowClient {
    pub fn new(config: AirflowConfig) -> Result<Self, Error> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &AirflowConfig {
        &self.config
    }

    /// Issues one authenticated GET against the API and decodes the
    /// JSON body. Transport-level failures (connection refused,
    /// timeout) become [`Error::UpstreamUnavailable`]; a reachable
    /// upstream answering with a non-2xx status becomes
    /// [`Error::UpstreamRequestFailed`].
    async fn fetch<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, Error> {
        let url = format!(
            "{}/api/v1{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        );

        debug!(endpoint, "Fetching from Airflow");

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint, error = %e, "Airflow request failed in transport");
                Error::UpstreamUnavailable
            })?;

        let status = response.status();

        if !status.is_success() {
            return Err(Error::UpstreamRequestFailed {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        // A 2xx answer with an undecodable body is still the upstream
        // misbehaving, not a gateway fault
        response
            .json::<T>()
            .await
            .map_err(|e| Error::UpstreamInvalidResponse {
                endpoint: endpoint.to_string(),
                detail: e.to_string(),
            })
    }
}

#[async_trait]
impl AirflowApi for AirflowClient {
    async fn list_dags(&self) -> Result<Vec<DagInfo>, Error> {
        let collection: DagCollection = self.fetch("/dags").await?;

        Ok(collection.dags)
    }

    async fn list_dag_runs(
        &self,
        dag_id: &str,
        page: &Pagination,
    ) -> Result<Vec<PipelineRun>, Error> {
        let endpoint = format!(
            "/dags/{}/dagRuns?order_by=-start_date&limit={}&offset={}",
            dag_id, page.limit, page.offset
        );

        let collection: DagRunCollection = self.fetch(&endpoint).await?;

        Ok(collection.dag_runs)
    }

    async fn list_task_instances(
        &self,
        dag_id: &str,
        dag_run_id: &str,
    ) -> Result<Vec<PipelineTask>, Error> {
        let endpoint = format!("/dags/{}/dagRuns/{}/taskInstances", dag_id, dag_run_id);

        let collection: TaskInstanceCollection = self.fetch(&endpoint).await?;

        Ok(collection.task_instances)
    }
}
