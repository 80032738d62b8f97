pub mod common;
pub mod error;
pub mod pipeline;
pub mod task;
