//! neurotab CLI - extract neuroimaging metadata from papers into a CSV table.

use clap::Parser;
use neurotab_cli::commands;
use neurotab_cli::{Cli, Command, Config, Formatter};
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> neurotab_cli::Result<()> {
    // API keys may live in a .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    // The progress bar replaces the per-paper log lines
    let show_progress = match &cli.command {
        Command::Run(args) => {
            config.settings.progress
                && !args.no_progress
                && !cli.verbose
                && std::io::stderr().is_terminal()
        }
        _ => false,
    };
    init_tracing(cli.verbose, show_progress);

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Run(args) => {
            commands::execute_run(args, &mut config, &formatter, show_progress).await?;
        }
        Command::Extract(args) => {
            commands::execute_extract(args, &mut config, &formatter).await?;
        }
        Command::Segment(args) => {
            commands::execute_segment(args, &mut config, &formatter)?;
        }
        Command::Schema(args) => {
            commands::execute_schema(args, &mut config, &formatter)?;
        }
        Command::Init(args) => {
            commands::execute_init(args, &formatter)?;
        }
    }

    Ok(())
}

/// Log to stderr. RUST_LOG wins over the default level.
fn init_tracing(verbose: bool, quiet: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
