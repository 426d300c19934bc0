use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use session_chronicle::cli::{list, view};
use session_chronicle::config::Config;
use session_chronicle::render::OutputFormat;

#[derive(Parser)]
#[command(name = "session-chronicle")]
#[command(about = "Dated digest of Claude Code session history", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format: json, markdown (md, table) or text (plain)
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// Save output to a file instead of stdout
    #[arg(short, long, global = true)]
    save: Option<PathBuf>,

    /// Projects directory (default: ~/.claude/projects)
    #[arg(short, long, global = true)]
    projects_dir: Option<PathBuf>,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List all sessions grouped by date (default)
    List,

    /// View one session's conversation
    View {
        /// Session ID (partial match OK, case-sensitive)
        session_id: String,

        /// Show only the last N messages (0 = unlimited)
        #[arg(short, long, default_value_t = 0)]
        max_messages: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "session_chronicle=warn".into()),
        )
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Resolve configuration before touching the projects directory
    let config = Config::load(cli.config.as_deref())?;
    let format = match &cli.output {
        Some(output) => output.parse::<OutputFormat>()?,
        None => config.output_format()?,
    };
    let root = cli
        .projects_dir
        .clone()
        .unwrap_or_else(|| config.projects_dir());
    let options = config.scan_options();
    let save = cli.save.as_deref();

    match cli.command.unwrap_or(Commands::List) {
        Commands::List => {
            list::run(&root, options, format, save)?;
        }
        Commands::View {
            session_id,
            max_messages,
        } => {
            view::run(&root, options, format, save, &session_id, max_messages)?;
        }
    }

    Ok(())
}
