mod instance;

pub use instance::PipelineTask;
