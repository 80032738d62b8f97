use serde::{Deserialize, Serialize};

/// One task instance within a pipeline run, as reported by the
/// upstream scheduler. A run's task list is flat; tasks have no
/// children of their own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineTask {
    pub task_id: String,
    pub state: String,
}

impl PipelineTask {
    pub fn new(task_id: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            state: state.into(),
        }
    }
}
