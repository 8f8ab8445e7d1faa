//! Recast CLI - batch image format conversion with resize and quality controls.
//!
//! # Usage
//!
//! ```bash
//! # Convert a folder of photos to WebP at 80% quality
//! recast convert ./photos --to webp -q 0.8
//!
//! # Shrink to 1280px wide, keeping proportions, and write a report
//! recast convert a.png b.jpg --to jpg --width 1280 --report report.json
//!
//! # List output formats
//! recast formats
//!
//! # View configuration
//! recast config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Recast - batch image format conversion.
#[derive(Parser, Debug)]
#[command(name = "recast")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert images to another format
    Convert(cli::convert::ConvertArgs),

    /// List output formats and their capabilities
    Formats,

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match recast_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `recast config path`."
            );
            recast_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Recast v{}", recast_core::VERSION);

    match cli.command {
        Commands::Convert(args) => cli::convert::execute(args, config).await,
        Commands::Formats => cli::formats::execute(),
        Commands::Config(args) => cli::config::execute(args, config).await,
    }
}
