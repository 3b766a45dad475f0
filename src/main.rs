//! bound - blocklist generator for the unbound DNS resolver

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use bound::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Update(args) => bound::commands::update::run(args, cli.config.as_deref()).await,
        Commands::Parse { files, explain } => bound::commands::parse::run(files, explain).await,
        Commands::Version => {
            println!("bound {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
