use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(
    name = "pubtrend-cli",
    about = "PubMed publication trends by topic, manufacturer and year",
    long_about = "Search PubMed with sampled statistics, count publications per medical-device \
                  manufacturer and year, and export the count matrix as CSV"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// API key for NCBI E-utilities (increases rate limit)
    #[arg(long, env = "PUBMED_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Contact email sent with NCBI requests
    #[arg(long, env = "CONTACT_EMAIL", global = true)]
    email: Option<String>,

    /// Tool name for NCBI requests
    #[arg(long, env = "PUBTREND_TOOL", default_value = "PubMedHelper", global = true)]
    tool: String,

    /// Manufacturer name configuration (JSON)
    #[arg(
        long,
        env = "PUBTREND_COMPANY_CONFIG",
        default_value = "config/manufacturer_config.json",
        global = true
    )]
    company_config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Search PubMed with optional sampled statistics
    Search(Box<commands::search::Search>),
    /// Count publications per manufacturer and year
    Trends(commands::trends::Trends),
    /// List the articles behind one manufacturer/year count
    Details(commands::details::Details),
    /// Manage the manufacturer name configuration
    Companies(commands::companies::Companies),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing with indicatif layer for progress bars
    let filter = if cli.verbose { "debug" } else { "info" };

    let indicatif_layer = IndicatifLayer::new();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(indicatif_layer.get_stderr_writer()),
        )
        .with(indicatif_layer)
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let api_key = cli.api_key.as_deref();
    let email = cli.email.as_deref();
    let tool = &cli.tool;

    match &cli.command {
        Commands::Search(cmd) => {
            cmd.execute_with_config(api_key, email, tool, &cli.company_config)
                .await
        }
        Commands::Trends(cmd) => {
            cmd.execute_with_config(api_key, email, tool, &cli.company_config)
                .await
        }
        Commands::Details(cmd) => {
            cmd.execute_with_config(api_key, email, tool, &cli.company_config)
                .await
        }
        Commands::Companies(cmd) => cmd.execute(&cli.company_config),
    }
}
