//! ClinMesh CLI — the main entry point.
//!
//! Commands:
//! - `chain`        — Run the multi-agent reasoning chain for a query
//! - `interactions` — Check medications for interactions and conflicts
//! - `evidence`     — Query the built-in guideline corpus

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "clinmesh",
    about = "ClinMesh — clinical multi-agent reasoning runtime",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reasoning chain for a clinical query
    Chain {
        /// The clinical question or proposed treatment
        #[arg(short, long)]
        query: String,

        /// Patient context as a TOML file
        #[arg(short, long)]
        context: Option<std::path::PathBuf>,

        /// Print the formatted report instead of JSON verdicts
        #[arg(short, long)]
        report: bool,
    },

    /// Check medications for interactions, contraindications, and allergies
    Interactions {
        /// Medications, comma-separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        meds: Vec<String>,

        /// Known allergies, comma-separated
        #[arg(short, long, value_delimiter = ',')]
        allergies: Vec<String>,

        /// Diagnosed conditions, comma-separated
        #[arg(short, long, value_delimiter = ',')]
        conditions: Vec<String>,

        /// Include pregnancy safety categories
        #[arg(short, long)]
        pregnant: bool,
    },

    /// Query the built-in guideline corpus
    Evidence {
        /// Search query
        #[arg(short, long)]
        query: String,

        /// Number of results to return
        #[arg(short = 'k', long, default_value_t = 3)]
        top_k: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Chain {
            query,
            context,
            report,
        } => commands::chain::run(&query, context.as_deref(), report).await?,
        Commands::Interactions {
            meds,
            allergies,
            conditions,
            pregnant,
        } => commands::interactions::run(&meds, &conditions, &allergies, pregnant)?,
        Commands::Evidence { query, top_k } => commands::evidence::run(&query, top_k).await?,
    }

    Ok(())
}
