//! Operator CLI for the tour operations API.

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

use cmd::Ctx;
use tourops_cli::ApiClient;

#[derive(Parser)]
#[command(name = "tourops")]
#[command(about = "Tour operations: tours, itineraries and schedules")]
#[command(version)]
struct Cli {
    /// Base URL of the tour operations API
    #[arg(long, global = true, env = "TOUROPS_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search tours
    Tours {
        /// Earliest start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Latest start date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Invoice substring
        #[arg(long)]
        invoice: Option<String>,

        /// Guest name substring
        #[arg(long)]
        name: Option<String>,
    },

    /// Show a tour's itinerary
    Itinerary {
        /// Tour id
        id: String,

        /// Write the printable page to this file instead
        #[arg(long, value_name = "FILE")]
        html: Option<std::path::PathBuf>,
    },

    /// Activity, arrival and departure counts per day
    Monthly {
        /// Month as YYYY-MM
        #[arg(long, conflicts_with_all = ["from", "to"])]
        month: Option<String>,

        #[arg(long, requires = "to")]
        from: Option<String>,

        #[arg(long, requires = "from")]
        to: Option<String>,
    },

    /// Interactive schedule planning for one tour
    Plan,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let ctx = Ctx::new(ApiClient::new(&cli.api_url));

    match cli.command {
        Some(Commands::Tours {
            from,
            to,
            invoice,
            name,
        }) => cmd::tours::run(&ctx, from, to, invoice, name).await,
        Some(Commands::Itinerary { id, html }) => cmd::itinerary::run(&ctx, &id, html).await,
        Some(Commands::Monthly { month, from, to }) => cmd::monthly::run(&ctx, month, from, to).await,
        Some(Commands::Plan) | None => cmd::plan::run(&ctx).await,
    }
}
