mod batch;
mod commands;
mod retry;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "addrscore")]
#[command(about = "Match free-text addresses against a geocoder and score the match")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Geocode one address and print the best match with its score.
    Match {
        address: String,
        /// Print the full outcome, including the score breakdown.
        #[arg(long)]
        explain: bool,
    },
    /// Match every line of a file, printing one JSON record per line.
    Batch {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
        #[arg(long, default_value_t = 2)]
        max_retries: u32,
    },
    /// Score a raw address against a candidate without calling the geocoder.
    Score {
        raw: String,
        candidate: String,
        #[arg(long, env = "ADDRSCORE_WEIGHTS_PATH")]
        weights: Option<PathBuf>,
    },
    /// Show the normalized form and extracted structure of an address.
    Normalize { text: String },
    /// Evaluate scoring weights against a labelled JSONL set.
    Eval {
        #[arg(long)]
        labels: PathBuf,
        #[arg(long, default_value_t = 0.6)]
        threshold: f64,
        #[arg(long, env = "ADDRSCORE_WEIGHTS_PATH")]
        weights: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries JSON output only.
    let log_level = std::env::var("ADDRSCORE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Match { address, explain } => {
            let config = addrscore_core::load_app_config_from_env()?;
            commands::run_match(&config, &address, explain).await
        }
        Commands::Batch {
            input,
            concurrency,
            max_retries,
        } => {
            let config = addrscore_core::load_app_config_from_env()?;
            commands::run_batch_file(&config, &input, concurrency, max_retries).await
        }
        Commands::Score {
            raw,
            candidate,
            weights,
        } => commands::run_score(&raw, &candidate, weights.as_deref()),
        Commands::Normalize { text } => commands::run_normalize(&text),
        Commands::Eval {
            labels,
            threshold,
            weights,
        } => commands::run_eval(&labels, threshold, weights.as_deref()),
    }
}
