//! imovia-sync — reconcile property media records with storage contents.
//!
//! Reads configuration from the environment (see imovia-core::Config).
//! `run` executes one reconciliation batch and prints the report as JSON;
//! `watch` keeps running batches on the configured interval.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use imovia_cli::init_tracing;
use imovia_core::Config;
use imovia_db::{PgMediaStore, PgPropertyStore};
use imovia_services::{MediaArraySync, ReconcileConfig, ReconcileService};
use imovia_storage::create_storage;
use sqlx::postgres::PgPoolOptions;

#[derive(Parser)]
#[command(name = "imovia-sync", about = "Media reconciliation for Imovia listings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation batch and exit
    Run,
    /// Run reconciliation batches on the configured interval
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let storage = create_storage(&config)
        .await
        .context("Failed to create storage backend")?;

    let media = Arc::new(PgMediaStore::new(pool.clone()));
    let properties = Arc::new(PgPropertyStore::new(pool));
    let sync = MediaArraySync::new(media.clone(), properties.clone());

    let service = Arc::new(ReconcileService::new(
        storage,
        media,
        properties,
        sync,
        ReconcileConfig::from(&config),
    ));

    match cli.command {
        Commands::Run => {
            let report = service.run_once().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Watch => {
            tracing::info!(
                interval_secs = config.reconcile_interval.as_secs(),
                "Starting reconciliation loop"
            );
            let handle = service.start();
            handle.await.context("Reconciliation loop exited")?;
        }
    }

    Ok(())
}
