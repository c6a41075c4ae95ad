//! CLI entry point for postrev

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use postrev::commands::{self, Strictness};

#[derive(Parser)]
#[command(name = "postrev")]
#[command(version)]
#[command(about = "A versioned front-matter document store for Jekyll-style blogs", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Copy)]
struct StrictArgs {
    /// Fail if any content error was found
    #[arg(long)]
    strict: bool,

    /// Fail on warnings as well as errors
    #[arg(long)]
    deny_warnings: bool,
}

impl From<StrictArgs> for Strictness {
    fn from(args: StrictArgs) -> Self {
        Strictness {
            strict: args.strict,
            deny_warnings: args.deny_warnings,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest content and report diagnostics
    Check {
        #[command(flatten)]
        strictness: StrictArgs,
    },

    /// List documents
    #[command(alias = "ls")]
    List {
        /// Sort order (discovery, date, revisions)
        #[arg(short, long, default_value = "discovery")]
        sort: String,
    },

    /// Show the revision history of a document
    History {
        /// Document identity
        identity: String,
    },

    /// Write the canonical revision of every document
    #[command(alias = "p")]
    Publish {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,

        #[command(flatten)]
        strictness: StrictArgs,
    },

    /// Remove published output
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "postrev=debug,info"
    } else {
        "postrev=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Check { strictness } => {
            let app = postrev::Postrev::new(&base_dir)?;
            commands::check::run(&app, strictness.into()).await?;
        }

        Commands::List { sort } => {
            let app = postrev::Postrev::new(&base_dir)?;
            commands::list::run(&app, &sort).await?;
        }

        Commands::History { identity } => {
            let app = postrev::Postrev::new(&base_dir)?;
            commands::history::run(&app, &identity).await?;
        }

        Commands::Publish { watch, strictness } => {
            let app = postrev::Postrev::new(&base_dir)?;
            tracing::info!("Publishing documents...");

            let manifest = commands::publish::run(&app, strictness.into()).await?;
            println!(
                "Published {} documents to {:?}",
                manifest.documents.len(),
                app.destination_dir
            );

            if watch {
                tracing::info!("Watching for file changes...");
                commands::publish::watch(&base_dir, strictness.into()).await?;
            }
        }

        Commands::Clean => {
            let app = postrev::Postrev::new(&base_dir)?;
            tracing::info!("Cleaning destination folder...");
            commands::clean::run(&app)?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("postrev version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
