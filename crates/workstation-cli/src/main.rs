use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "workstation")]
#[command(about = "Workstation CLI - run, preview and inspect projects against the execution backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a project directory and stream its output
    Run {
        /// Project directory
        dir: PathBuf,
        /// Load and save project state in the state directory
        #[arg(long)]
        persist: bool,
    },
    /// Stop and release a running session
    Stop {
        session_id: String,
    },
    /// Check that the execution backend is up
    Health,
    /// Bundle a simple-web project into one HTML document
    Bundle {
        /// Project directory
        dir: PathBuf,
        /// Entrypoint file name
        #[arg(long)]
        entry: Option<String>,
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Rebuild the output file whenever the directory changes
        #[arg(long, requires = "output")]
        watch: bool,
    },
    /// Print the detected project type
    Detect {
        /// Project directory
        dir: PathBuf,
    },
    /// Notebook utilities
    Notebook {
        #[command(subcommand)]
        action: NotebookAction,
    },
}

#[derive(Subcommand)]
enum NotebookAction {
    /// Parse a notebook file and summarize its cells
    Check {
        file: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { dir, persist } => commands::run::run(&dir, persist).await?,
        Commands::Stop { session_id } => commands::session::stop(&session_id).await?,
        Commands::Health => commands::session::health().await?,
        Commands::Bundle {
            dir,
            entry,
            output,
            watch,
        } => match output {
            Some(output) if watch => {
                commands::bundle::watch(&dir, entry.as_deref(), &output).await?
            }
            output => commands::bundle::bundle(&dir, entry.as_deref(), output.as_deref()).await?,
        },
        Commands::Detect { dir } => commands::bundle::detect(&dir).await?,
        Commands::Notebook { action } => match action {
            NotebookAction::Check { file } => commands::notebook::check(&file).await?,
        },
    }

    Ok(())
}
