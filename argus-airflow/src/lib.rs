pub mod client;
pub mod config;
pub mod walker;
mod wire;

pub use client::{AirflowApi, AirflowClient};
pub use config::AirflowConfig;
pub use walker::fetch_all_runs;
