//! Rendering domains as unbound `local-zone` directives.

use std::path::Path;
use tracing::info;

use crate::error::BoundError;
use crate::fs_abstraction::FileSystem;
use crate::utils::format_count;

/// One refuse directive for an exact domain
pub fn directive(domain: &str) -> String {
    format!("local-zone: \"{}\" refuse", domain)
}

/// Render one directive line per domain, in iteration order.
pub fn render<'a, I>(domains: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let mut out = String::new();
    for domain in domains {
        out.push_str(&directive(domain));
        out.push('\n');
    }
    out
}

/// Replace `destination` with the rendered directives.
///
/// Returns the number of directives written.
pub fn emit<'a, I>(
    fs: &dyn FileSystem,
    domains: I,
    destination: &Path,
) -> Result<usize, BoundError>
where
    I: IntoIterator<Item = &'a String>,
    I::IntoIter: ExactSizeIterator,
{
    let domains = domains.into_iter();
    let count = domains.len();
    let rendered = render(domains);

    fs.write_atomic(destination, rendered.as_bytes())
        .map_err(|source| BoundError::OutputWriteFailed {
            path: destination.to_path_buf(),
            source,
        })?;

    info!(
        "Wrote {} refuse directives to {}",
        format_count(count),
        destination.display()
    );
    Ok(count)
}
