//! Configuration management for bound.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The "ticked" list from The Big Blocklist Collection
pub const DEFAULT_BLOCKLIST_URL: &str = "https://v.firebog.net/hosts/lists.php?type=tick";

/// Where unbound picks up drop-in configuration
pub const DEFAULT_OUTPUT: &str = "/etc/unbound/unbound.conf.d/blocklist.conf";

/// Upper bound for retries; backoff doubles each attempt
const MAX_RETRIES_LIMIT: u32 = 10;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Domains to refuse
    pub blocklist: ListSource,

    /// Domains never refused, even if blocklisted
    pub allowlist: ListSource,

    /// Generated unbound config fragment
    pub output: PathBuf,

    /// Init system used to restart unbound
    pub init: InitSystem,

    /// Check and restart unbound after writing the output
    pub restart: bool,

    /// HTTP settings
    pub fetch: FetchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            blocklist: ListSource {
                url: Some(DEFAULT_BLOCKLIST_URL.to_string()),
                file: None,
            },
            allowlist: ListSource::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            init: InitSystem::Systemd,
            restart: true,
            fetch: FetchConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        for (kind, source) in [("blocklist", &self.blocklist), ("allowlist", &self.allowlist)] {
            if let Some(url) = &source.url {
                if !is_http_url(url) {
                    anyhow::bail!("{} URL must use http or https: {}", kind, url);
                }
            }
        }

        if self.output.as_os_str().is_empty() {
            anyhow::bail!("Output path must not be empty");
        }

        if self.fetch.timeout_secs == 0 {
            anyhow::bail!("fetch.timeout_secs must be greater than 0");
        }

        if self.fetch.max_concurrent == 0 {
            anyhow::bail!("fetch.max_concurrent must be greater than 0");
        }

        if self.fetch.max_retries > MAX_RETRIES_LIMIT {
            anyhow::bail!(
                "fetch.max_retries must be at most {} (got {})",
                MAX_RETRIES_LIMIT,
                self.fetch.max_retries
            );
        }

        Ok(())
    }
}

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub blocklist_url: Option<String>,
    pub blocklist_file: Option<PathBuf>,
    pub no_default_blocklist: bool,
    pub allowlist_url: Option<String>,
    pub allowlist_file: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub init: Option<InitSystem>,
    pub no_restart: bool,
}

impl Config {
    /// Merge command-line overrides, then re-validate.
    ///
    /// `no_default_blocklist` only drops [`DEFAULT_BLOCKLIST_URL`]; a URL
    /// from the config file or the command line is kept.
    pub fn apply_overrides(&mut self, overrides: Overrides) -> Result<()> {
        if overrides.no_default_blocklist
            && self.blocklist.url.as_deref() == Some(DEFAULT_BLOCKLIST_URL)
        {
            self.blocklist.url = None;
        }
        if let Some(url) = overrides.blocklist_url {
            self.blocklist.url = Some(url);
        }
        if let Some(file) = overrides.blocklist_file {
            self.blocklist.file = Some(file);
        }
        if let Some(url) = overrides.allowlist_url {
            self.allowlist.url = Some(url);
        }
        if let Some(file) = overrides.allowlist_file {
            self.allowlist.file = Some(file);
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if let Some(init) = overrides.init {
            self.init = init;
        }
        if overrides.no_restart {
            self.restart = false;
        }

        self.validate()
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

/// A list-of-lists URL, a local file, both or neither
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ListSource {
    /// URL whose body lists further list URLs, one per line
    pub url: Option<String>,
    /// Local list file
    pub file: Option<PathBuf>,
}

impl ListSource {
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.file.is_none()
    }
}

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum InitSystem {
    /// systemctl restart unbound
    #[default]
    Systemd,
    /// service unbound restart
    Upstart,
    /// /etc/init.d/unbound restart
    Sysv,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Initial backoff, doubled on each retry
    pub retry_delay_ms: u64,
    /// Lists fetched in parallel
    pub max_concurrent: usize,
    /// Largest accepted list body in bytes
    pub max_list_size: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 2000,
            max_concurrent: 8,
            max_list_size: 32 * 1024 * 1024,
        }
    }
}
