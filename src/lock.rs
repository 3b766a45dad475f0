//! File-based locking to prevent concurrent runs.
//!
//! Two runs writing the same output would race on the final rename and on
//! the unbound restart. The lock lives next to the output file as
//! `<output>.lock`.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Holds an exclusive lock; released when dropped.
pub struct LockGuard {
    _file: File,
    path: PathBuf,
}

impl LockGuard {
    /// Lock path for an output file
    pub fn path_for(output: &Path) -> PathBuf {
        let mut name = output
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "bound".into());
        name.push(".lock");
        output.with_file_name(name)
    }

    /// Attempt to acquire the lock for `output` without blocking.
    pub fn acquire(output: &Path) -> Result<Self> {
        let path = Self::path_for(output);

        // create+read+write without truncate avoids a race between create and lock
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to open lock file: {}", path.display()))?;

        file.try_lock_exclusive().map_err(|_| {
            anyhow::anyhow!(
                "Another instance of bound is already writing {}.\n\
                 If you believe this is an error, remove the lock file: {}",
                output.display(),
                path.display()
            )
        })?;

        Ok(Self { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
