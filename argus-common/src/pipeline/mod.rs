mod dag;
mod health;
mod run;

pub use dag::{DagInfo, ScheduleInterval};
pub use health::{PipelineHealth, classify};
pub use run::{PipelineRun, PipelineStatus};
