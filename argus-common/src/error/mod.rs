use std::fmt::Debug;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error with Apache Airflow Connection")]
    UpstreamUnavailable,

    #[error("Upstream Request Failed: {endpoint} returned status {status}")]
    UpstreamRequestFailed { endpoint: String, status: u16 },

    #[error("Invalid Upstream Response: {endpoint}: {detail}")]
    UpstreamInvalidResponse { endpoint: String, detail: String },

    #[error("Unknown Pipeline: {0}")]
    UnknownPipeline(String),

    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Internal Error: {0}")]
    Internal(String),
}
