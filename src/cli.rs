//! CLI argument parsing with clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{InitSystem, Overrides};

#[derive(Parser)]
#[command(name = "bound")]
#[command(author, version, about = "Blocklist generator for the unbound DNS resolver")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (built-in defaults when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Quiet mode (for cron/systemd timer)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch lists, write the unbound blocklist and restart unbound
    Update(UpdateArgs),

    /// Parse local list files and print the domains found
    Parse {
        /// List files to parse
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print the dialect matched by every line instead
        #[arg(long)]
        explain: bool,
    },

    /// Show version
    Version,
}

#[derive(Args, Debug, Default, Clone)]
pub struct UpdateArgs {
    /// URL of blocklist URLs to parse (defaults to the "ticked" list from The Big Blocklist Collection)
    #[arg(short = 'b', long)]
    pub blocklist_url: Option<String>,

    /// Local blocklist file to parse
    #[arg(short = 'B', long)]
    pub blocklist_file: Option<PathBuf>,

    /// Do not fetch the default blocklist URL
    #[arg(long)]
    pub no_default_blocklist: bool,

    /// URL of allowlist URLs to parse
    #[arg(short = 's', long, visible_alias = "whitelist-url", alias = "safelist-url")]
    pub allowlist_url: Option<String>,

    /// Local allowlist file to parse
    #[arg(
        short = 'S',
        long,
        visible_alias = "whitelist-file",
        alias = "safelist-file"
    )]
    pub allowlist_file: Option<PathBuf>,

    /// Where to write the processed list
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Init system used to restart unbound
    #[arg(short, long, value_enum)]
    pub init: Option<InitSystem>,

    /// Do not check or restart unbound
    #[arg(short, long)]
    pub no_restart: bool,

    /// Print the generated configuration instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

impl UpdateArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            blocklist_url: self.blocklist_url.clone(),
            blocklist_file: self.blocklist_file.clone(),
            no_default_blocklist: self.no_default_blocklist,
            allowlist_url: self.allowlist_url.clone(),
            allowlist_file: self.allowlist_file.clone(),
            output: self.output.clone(),
            init: self.init,
            no_restart: self.no_restart,
        }
    }
}
