//! Update command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{error, info, warn};

use crate::aggregator::{aggregate, subtract};
use crate::cli::UpdateArgs;
use crate::cmd_abstraction::{CommandExecutor, RealCommandExecutor};
use crate::config::Config;
use crate::emitter::{emit, render};
use crate::error::BoundError;
use crate::fetcher::{Fetcher, Transport};
use crate::fs_abstraction::{real_fs, FileSystem};
use crate::lock::LockGuard;
use crate::resolver::Resolver;
use crate::utils::format_count;

/// What one update run produced
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub blocklisted: usize,
    pub allowlisted: usize,
    /// Directives in the generated config
    pub refused: usize,
    /// Rendered config, only kept on dry runs
    pub rendered: Option<String>,
}

/// Run the update command
pub async fn run(args: UpdateArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = match config_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => Config::default(),
    };
    config
        .apply_overrides(args.overrides())
        .map_err(|e| BoundError::Config(format!("{:#}", e)))?;

    if config.blocklist.is_empty() {
        warn!("No blocklist source configured, the generated config will be empty");
    }

    let _lock = if args.dry_run {
        None
    } else {
        Some(LockGuard::acquire(&config.output)?)
    };

    let fetcher = Fetcher::new(&config.fetch)?;
    let executor = RealCommandExecutor::new();

    let summary = match execute(&config, &fetcher, real_fs(), &executor, args.dry_run).await {
        Ok(summary) => summary,
        Err(e) => {
            if e.is_pre_output() {
                error!("Aborted before writing {}", config.output.display());
            }
            return Err(e.into());
        }
    };

    match summary.rendered {
        Some(rendered) => print!("{}", rendered),
        None => {
            println!();
            println!(
                "[OK] {} domains refused ({} blocklisted, {} allowlisted)",
                format_count(summary.refused),
                format_count(summary.blocklisted),
                format_count(summary.allowlisted)
            );
        }
    }

    Ok(())
}

/// Build both lists, write the refuse config and restart the resolver.
///
/// Nothing is written unless both lists were built successfully. On a dry
/// run the rendered config is returned instead of written and the resolver
/// is left alone.
pub async fn execute<T: Transport>(
    config: &Config,
    fetcher: &Fetcher<T>,
    fs: &dyn FileSystem,
    executor: &dyn CommandExecutor,
    dry_run: bool,
) -> Result<UpdateSummary, BoundError> {
    info!("Building blocklist and allowlist...");
    let (blocklist, allowlist) = tokio::try_join!(
        aggregate(fetcher, fs, &config.blocklist),
        aggregate(fetcher, fs, &config.allowlist),
    )?;
    info!(
        "Blocklist: {} domains, allowlist: {} domains",
        format_count(blocklist.len()),
        format_count(allowlist.len())
    );

    let domains = subtract(&blocklist, &allowlist);
    let mut summary = UpdateSummary {
        blocklisted: blocklist.len(),
        allowlisted: allowlist.len(),
        refused: domains.len(),
        rendered: None,
    };
    // Raw sets are no longer needed once the difference exists
    drop(blocklist);
    drop(allowlist);

    if dry_run {
        info!("Dry-run mode: not writing {}", config.output.display());
        summary.rendered = Some(render(&domains));
        return Ok(summary);
    }

    emit(fs, &domains, &config.output)?;

    if config.restart {
        Resolver::new(executor, fs, config.init).validate_and_reload()?;
    } else {
        info!("Not restarting unbound");
    }

    Ok(summary)
}
