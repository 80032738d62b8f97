mod repository;
mod server;

use std::sync::Arc;

use argus_airflow::{AirflowClient, AirflowConfig};
use argus_common::error::Error;
use clap::{Arg, Command};
use repository::StatusRepository;
use server::StatusServer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_level(true)
        .with_target(true)
        .init();

    let matches = Command::new("argus")
        .about("Pipeline status gateway over Apache Airflow")
        .version("0.1.0")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("serve")
                .about("Starts the status gateway")
                .arg(
                    Arg::new("listen_addr")
                        .short('l')
                        .long("listen_addr")
                        .help("Address to listen on")
                        .default_value("0.0.0.0:8000")
                        .action(clap::ArgAction::Set),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("serve", serve_matches)) => {
            let listen_addr = serve_matches
                .get_one::<String>("listen_addr")
                .cloned()
                .ok_or_else(|| Error::Config("listen_addr must be set".into()))?;

            let config = AirflowConfig::from_env()?;

            info!(base_url = %config.base_url, "Connecting to Airflow");

            let page_size = config.page_size;
            let max_concurrency = config.max_concurrency;
            let client = AirflowClient::new(config)?;

            let repository = Arc::new(StatusRepository::new(
                Arc::new(client),
                page_size,
                max_concurrency,
            ));

            let status_server = StatusServer::new(repository, listen_addr)?;

            status_server.serve().await?;
        }
        _ => unreachable!("subcommand is required"),
    }

    Ok(())
}
