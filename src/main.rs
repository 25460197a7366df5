mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use postgen_core::config::PostgenConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "postgen")]
#[command(about = "Turn the community event spreadsheet into a markdown post")]
struct Cli {
    /// Read configuration from this file instead of ~/.config/postgen/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log every removed submission and probe
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the sheet and render the post
    Generate {
        /// Reuse the last post when the sheet has not changed
        #[arg(long)]
        use_cache: bool,

        /// Write the post to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the fingerprint of the current sheet
    Fingerprint,
    /// Show where postgen reads and writes its files
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => PostgenConfig::load_from(path)?,
        None => PostgenConfig::load()?,
    };

    match cli.command {
        Commands::Generate { use_cache, output } => {
            commands::generate::run(&config, use_cache, output.as_deref())
        }
        Commands::Fingerprint => commands::fingerprint::run(&config),
        Commands::Config => commands::config::run(&config, cli.config.as_deref()),
    }
}

/// Logs go to stderr so the post on stdout can be piped.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "postgen=debug,postgen_core=debug"
    } else {
        "postgen=info,postgen_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
