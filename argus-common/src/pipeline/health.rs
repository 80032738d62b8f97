use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::task::PipelineTask;

// It is used by strum to convert the enum to a string
// but the compiler complains that it is unused
#[allow(unused_imports)]
use std::str::FromStr;

/// Traffic light verdict summarising the outcome of a pipeline run.
#[derive(
    Clone, Debug, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PipelineHealth {
    /// The run itself reported failure.
    Red,
    /// The run did not fail, but at least one task within it did.
    Orange,
    /// The run and every task in it succeeded.
    Green,
    /// Health has not been evaluated, or the outcome cannot be
    /// determined (e.g. the run is still in progress).
    #[default]
    Unknown,
}

/// Derives the health verdict for one run from its upstream-reported
/// state and the states of its task instances. First match wins:
/// a failing run state outranks task failures, which outrank success.
///
/// Upstream failure states are matched by substring so that variants
/// such as `upstream_failed` count as failures too.
pub fn classify(run_state: &str, tasks: &[PipelineTask]) -> PipelineHealth {
    if state_indicates_failure(run_state) {
        PipelineHealth::Red
    } else if tasks.iter().any(|t| state_indicates_failure(&t.state)) {
        PipelineHealth::Orange
    } else if run_state == "success" {
        PipelineHealth::Green
    } else {
        PipelineHealth::Unknown
    }
}

fn state_indicates_failure(state: &str) -> bool {
    state.contains("failed")
}
