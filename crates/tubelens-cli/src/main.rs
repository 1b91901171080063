mod analyze;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::analyze::AnalyzeArgs;

#[derive(Debug, Parser)]
#[command(name = "tubelens")]
#[command(about = "YouTube performance analytics with AI-generated insights")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch videos, aggregate their metrics and print a report
    Analyze(AnalyzeArgs),
    /// Print the loaded configuration with credentials redacted
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.command.is_none() {
        Cli::command().print_help()?;
        return Ok(());
    }

    let config = tubelens_core::load_app_config()?;
    init_tracing(&config.log_level);

    match cli.command {
        Some(Commands::Analyze(args)) => analyze::run_analyze(&config, args).await?,
        Some(Commands::Check) => println!("{config:#?}"),
        None => {}
    }

    Ok(())
}

/// Logs go to stderr so `--format json` output on stdout stays parseable.
/// `RUST_LOG` wins over the configured level.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
