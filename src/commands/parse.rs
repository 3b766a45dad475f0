//! Parse command implementation.

use anyhow::Result;
use std::fmt::Write;
use std::path::PathBuf;

use crate::aggregator::{union, DomainSet};
use crate::classifier::{classify_with_dialect, Classification};
use crate::error::BoundError;
use crate::fs_abstraction::{real_fs, FileSystem};
use crate::parser::{parse_file, split_lines};

/// Run the parse command
pub async fn run(files: Vec<PathBuf>, explain: bool) -> Result<()> {
    let fs = real_fs();
    let output = if explain {
        explain_files(fs, &files)?
    } else {
        domains_in(fs, &files)?
            .into_iter()
            .fold(String::new(), |mut out, domain| {
                out.push_str(&domain);
                out.push('\n');
                out
            })
    };
    print!("{}", output);
    Ok(())
}

/// Union of the domains found in every file
pub fn domains_in(fs: &dyn FileSystem, files: &[PathBuf]) -> Result<DomainSet, BoundError> {
    let parsed = files
        .iter()
        .map(|path| parse_file(fs, path))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(union(parsed))
}

/// One line per input line: `file:line: dialect domain`
pub fn explain_files(fs: &dyn FileSystem, files: &[PathBuf]) -> Result<String, BoundError> {
    let mut out = String::new();
    for path in files {
        let content = fs
            .read_to_string(path)
            .map_err(|source| BoundError::SourceUnreadable {
                path: path.clone(),
                source,
            })?;

        for (number, line) in split_lines(&content).enumerate() {
            let verdict = match classify_with_dialect(line.trim()) {
                Classification::Domain { dialect, domain } => format!("{} {}", dialect, domain),
                Classification::Excluded { dialect } => format!("{} (excluded)", dialect),
                Classification::Unmatched => "-".to_string(),
            };
            // Writing to a String cannot fail
            let _ = writeln!(out, "{}:{}: {}", path.display(), number + 1, verdict);
        }
    }
    Ok(out)
}
