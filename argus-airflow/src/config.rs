use std::{env, time::Duration};

use argus_common::error::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PAGE_SIZE: u64 = 100;
const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Connection settings for the upstream Airflow REST API.
/// ---
/// Built once at startup and injected into the client; nothing reads
/// the environment at call time.
#[derive(Clone, Debug)]
pub struct AirflowConfig {
    /// Base URL of the Airflow webserver, without the `/api/v1` suffix.
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Per-request timeout. There is no automatic retry; a slow
    /// upstream fails the request rather than blocking indefinitely.
    pub timeout: Duration,
    /// Window size used when walking a pipeline's run history.
    pub page_size: u64,
    /// Upper bound on parallel upstream requests per view computation.
    pub max_concurrency: usize,
}

impl AirflowConfig {
    /// Reads the configuration from the process environment.
    ///
    /// `AIRFLOW_BASE_URL`, `AIRFLOW_USERNAME` and `AIRFLOW_PASSWORD`
    /// are required; `AIRFLOW_TIMEOUT_SECS`, `AIRFLOW_PAGE_SIZE` and
    /// `AIRFLOW_MAX_CONCURRENCY` override the defaults.
    pub fn from_env() -> Result<Self, Error> {
        let config = Self {
            base_url: require_var("AIRFLOW_BASE_URL")?,
            username: require_var("AIRFLOW_USERNAME")?,
            password: require_var("AIRFLOW_PASSWORD")?,
            timeout: Duration::from_secs(parse_var("AIRFLOW_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?),
            page_size: parse_var("AIRFLOW_PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            max_concurrency: parse_var("AIRFLOW_MAX_CONCURRENCY", DEFAULT_MAX_CONCURRENCY)?,
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.base_url.trim().is_empty() {
            return Err(Error::Config("base_url must not be empty".into()));
        }

        if self.page_size == 0 {
            return Err(Error::Config("page_size must be greater than zero".into()));
        }

        if self.max_concurrency == 0 {
            return Err(Error::Config(
                "max_concurrency must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

fn require_var(name: &str) -> Result<String, Error> {
    env::var(name).map_err(|_| Error::Config(format!("{} must be set", name)))
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, Error> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("{} is not a valid value", name))),
        Err(_) => Ok(default),
    }
}
