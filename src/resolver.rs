//! unbound configuration check and restart.

use tracing::{error, info};

use crate::cmd_abstraction::{args_to_strings, CommandExecutor, CommandOutput};
use crate::config::InitSystem;
use crate::error::BoundError;
use crate::fs_abstraction::FileSystem;

const CHECKCONF: &str = "unbound-checkconf";
const SYSV_SCRIPT: &str = "/etc/init.d/unbound";

/// Controls the local unbound daemon.
pub struct Resolver<'a> {
    executor: &'a dyn CommandExecutor,
    fs: &'a dyn FileSystem,
    init: InitSystem,
}

impl<'a> Resolver<'a> {
    pub fn new(executor: &'a dyn CommandExecutor, fs: &'a dyn FileSystem, init: InitSystem) -> Self {
        Self { executor, fs, init }
    }

    /// Run `unbound-checkconf`.
    ///
    /// `Ok(false)` means the checker ran and rejected the configuration.
    pub fn validate_config(&self) -> Result<bool, BoundError> {
        let output = self.executor.execute(CHECKCONF, &[]).map_err(|e| {
            BoundError::ResolverCheckFailed(format!(
                "Error calling {}: {}. Are you running as root?",
                CHECKCONF, e
            ))
        })?;

        if !output.success {
            error!("{} rejected the configuration: {}", CHECKCONF, details(&output));
        }
        Ok(output.success)
    }

    /// Restart unbound through the configured init system.
    ///
    /// Without a known init system the operator is asked to restart unbound
    /// by hand; that is not an error.
    pub fn reload(&self) -> Result<(), BoundError> {
        let Some((program, args)) = self.restart_command() else {
            error!("No known init system found. Please restart unbound!");
            return Ok(());
        };

        info!("Restarting unbound ({} {})", program, args.join(" "));
        let output = self
            .executor
            .execute(program, &args_to_strings(&args))
            .map_err(|e| {
                BoundError::ResolverReloadFailed(format!(
                    "Error calling init: {}. Are you running as root?",
                    e
                ))
            })?;

        if !output.success {
            return Err(BoundError::ResolverReloadFailed(format!(
                "{} exited with {}: {}",
                program,
                output
                    .code
                    .map_or_else(|| "signal".to_string(), |c| c.to_string()),
                details(&output)
            )));
        }
        Ok(())
    }

    /// Check the configuration and restart only if it is valid.
    pub fn validate_and_reload(&self) -> Result<(), BoundError> {
        if !self.validate_config()? {
            return Err(BoundError::ResolverCheckFailed(
                "Something is wrong with unbound configuration!".to_string(),
            ));
        }
        self.reload()
    }

    fn restart_command(&self) -> Option<(&'static str, Vec<&'static str>)> {
        match self.init {
            InitSystem::Systemd => Some(("systemctl", vec!["restart", "unbound"])),
            InitSystem::Upstart => Some(("service", vec!["unbound", "restart"])),
            InitSystem::Sysv if self.fs.exists(std::path::Path::new(SYSV_SCRIPT)) => {
                Some((SYSV_SCRIPT, vec!["restart"]))
            }
            InitSystem::Sysv => None,
        }
    }
}

fn details(output: &CommandOutput) -> &str {
    let stderr = output.stderr.trim();
    if stderr.is_empty() {
        output.stdout.trim()
    } else {
        stderr
    }
}
