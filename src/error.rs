//! Error types for bound.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoundError {
    #[error("Cannot read list source {path:?}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to fetch list of lists {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Failed to write output {path:?}: {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Resolver configuration check failed: {0}")]
    ResolverCheckFailed(String),

    #[error("Resolver reload failed: {0}")]
    ResolverReloadFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BoundError {
    /// Whether the error aborted the run before any output was written
    pub fn is_pre_output(&self) -> bool {
        matches!(
            self,
            BoundError::SourceUnreadable { .. }
                | BoundError::FetchFailed { .. }
                | BoundError::Config(_)
        )
    }
}
