//! Turning list sources into domains.
//!
//! A source is either a local file or a [`ListBlob`] fetched over HTTP.
//! Both end up as text that is split into lines, trimmed and handed to
//! [`classify`](crate::classifier::classify). Duplicates are kept here;
//! deduplication happens in the aggregator.

use std::path::Path;
use tracing::debug;

use crate::classifier::classify;
use crate::error::BoundError;
use crate::fs_abstraction::FileSystem;

/// Identifier for a fetched list, unique within one run.
pub type BlobId = u64;

/// A fetched list body kept in memory.
///
/// The id is synthetic; `origin` is the URL it came from and is only used in
/// log messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListBlob {
    id: BlobId,
    origin: String,
    bytes: Vec<u8>,
}

impl ListBlob {
    pub fn new(id: BlobId, origin: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            id,
            origin: origin.into(),
            bytes,
        }
    }

    pub fn id(&self) -> BlobId {
        self.id
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode the body as ISO-8859-1, one char per byte.
    ///
    /// Community lists contain arbitrary bytes; this never fails.
    pub fn text(&self) -> String {
        self.bytes.iter().map(|&b| char::from(b)).collect()
    }
}

/// Split text on `\n`, `\r\n` and lone `\r` line endings.
pub fn split_lines(content: &str) -> impl Iterator<Item = &str> {
    content.lines().flat_map(|line| line.split('\r'))
}

/// Extract every domain from list text, in line order.
pub fn parse_content(content: &str) -> Vec<String> {
    split_lines(content)
        .filter_map(|line| classify(line.trim()))
        .map(str::to_string)
        .collect()
}

/// Extract domains from a fetched list.
pub fn parse_blob(blob: &ListBlob) -> Vec<String> {
    let domains = parse_content(&blob.text());
    debug!(
        "list #{} ({}): {} domains",
        blob.id(),
        blob.origin(),
        domains.len()
    );
    domains
}

/// Extract domains from a local file.
///
/// An unreadable file aborts the run: a mandatory source must not silently
/// contribute nothing.
pub fn parse_file(fs: &dyn FileSystem, path: &Path) -> Result<Vec<String>, BoundError> {
    let content = fs
        .read_to_string(path)
        .map_err(|source| BoundError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

    let domains = parse_content(&content);
    debug!("{}: {} domains", path.display(), domains.len());
    Ok(domains)
}
