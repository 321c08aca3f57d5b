//! Charity fund CLI — entry point.
//!
//! Every command opens the SQLite ledger, performs one operation, and prints
//! the result as JSON on stdout. `watch` instead keeps running allocations
//! in the background until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use charity_fund::config::Config;
use charity_fund::{db, watcher, Ledger, NewDonation, NewProject, ProjectUpdate};

#[derive(Parser)]
#[command(name = "charity-fund")]
#[command(about = "Charity fund ledger: projects, donations, and allocation runs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage charity projects
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    /// Make a donation; it is allocated immediately
    Donate {
        #[arg(long)]
        amount: i64,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Inspect donations
    Donation {
        #[command(subcommand)]
        command: DonationCommand,
    },
    /// Run one allocation over the open pools
    Invest,
    /// Closed projects ordered by collection time
    Report,
    /// Run allocations periodically until interrupted
    Watch,
}

#[derive(Subcommand)]
enum ProjectCommand {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        amount: i64,
    },
    List,
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        amount: Option<i64>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum DonationCommand {
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    let pool = db::init_pool(&config.database_url, config.max_connections).await?;
    let ledger = Arc::new(Ledger::new(pool));

    match cli.command {
        Commands::Project { command } => match command {
            ProjectCommand::Create {
                name,
                description,
                amount,
            } => {
                let project = ledger
                    .create_project(NewProject {
                        name,
                        description,
                        full_amount: amount,
                    })
                    .await?;
                print_json(&project)?;
            }
            ProjectCommand::List => print_json(&ledger.list_projects().await?)?,
            ProjectCommand::Update {
                id,
                name,
                description,
                amount,
            } => {
                let project = ledger
                    .update_project(
                        id,
                        ProjectUpdate {
                            name,
                            description,
                            full_amount: amount,
                        },
                    )
                    .await?;
                print_json(&project)?;
            }
            ProjectCommand::Delete { id } => print_json(&ledger.delete_project(id).await?)?,
        },
        Commands::Donate { amount, comment } => {
            let donation = ledger
                .create_donation(NewDonation {
                    full_amount: amount,
                    comment,
                })
                .await?;
            print_json(&donation)?;
        }
        Commands::Donation {
            command: DonationCommand::List,
        } => print_json(&ledger.list_donations().await?)?,
        Commands::Invest => print_json(&ledger.invest().await?)?,
        Commands::Report => print_json(&ledger.report().await?)?,
        Commands::Watch => {
            let shutdown = CancellationToken::new();
            let on_signal = shutdown.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Ctrl-C received, shutting down");
                    on_signal.cancel();
                }
            });

            let interval = Duration::from_secs(config.allocation_interval_secs);
            watcher::run(ledger, interval, shutdown).await;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
