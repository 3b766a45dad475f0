//! # bound - blocklist generator for the unbound DNS resolver
//!
//! Builds a domain blocklist from community list sources and turns it into
//! an unbound configuration fragment that refuses every listed domain.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         bound                               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: update, parse, version                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)                                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Fetcher (reqwest + rustls)                                 │
//! │    └── List-of-lists index, nested lists in parallel        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Classifier / Parser (regex)                                │
//! │    └── Bare, numeric-prefix, trailing-comment, hosts lines  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Aggregator                                                 │
//! │    └── Set union and allowlist subtraction                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Emitter + Resolver                                         │
//! │    └── local-zone refuse lines, unbound-checkconf, restart  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use bound::aggregator::{aggregate, subtract};
//! use bound::config::Config;
//! use bound::emitter::emit;
//! use bound::fetcher::Fetcher;
//! use bound::fs_abstraction::real_fs;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let fetcher = Fetcher::new(&config.fetch)?;
//!
//!     let blocklist = aggregate(&fetcher, real_fs(), &config.blocklist).await?;
//!     let allowlist = aggregate(&fetcher, real_fs(), &config.allowlist).await?;
//!     let domains = subtract(&blocklist, &allowlist);
//!
//!     emit(real_fs(), &domains, &config.output)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`aggregator`] - Domain set union and allowlist subtraction
//! - [`classifier`] - Per-line dialect recognition
//! - [`cli`] - Command-line interface definitions
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration parsing and validation
//! - [`emitter`] - unbound `local-zone` rendering
//! - [`fetcher`] - HTTP client for list indexes and lists
//! - [`lock`] - File locking for concurrent execution prevention
//! - [`parser`] - Domain extraction from list content
//! - [`resolver`] - unbound check and restart
//! - [`utils`] - Common utility functions (formatting)

pub mod aggregator;
pub mod classifier;
pub mod cli;
pub mod cmd_abstraction;
pub mod commands;
pub mod config;
pub mod emitter;
pub mod error;
pub mod fetcher;
pub mod fs_abstraction;
pub mod lock;
pub mod parser;
pub mod resolver;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::BoundError;
