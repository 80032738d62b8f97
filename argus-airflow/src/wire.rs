use argus_common::{
    pipeline::{DagInfo, PipelineRun},
    task::PipelineTask,
};
use serde::Deserialize;

// Collection envelopes as returned by the Airflow REST API. Each
// endpoint wraps its records in a single named field.

#[derive(Debug, Deserialize)]
pub struct DagCollection {
    pub dags: Vec<DagInfo>,
}

#[derive(Debug, Deserialize)]
pub struct DagRunCollection {
    pub dag_runs: Vec<PipelineRun>,
}

#[derive(Debug, Deserialize)]
pub struct TaskInstanceCollection {
    pub task_instances: Vec<PipelineTask>,
}
