//! Domain aggregation and allowlist subtraction.

use std::collections::BTreeSet;
use tracing::info;

use crate::config::ListSource;
use crate::error::BoundError;
use crate::fetcher::{Fetcher, Transport};
use crate::fs_abstraction::FileSystem;
use crate::parser::{parse_blob, parse_file};
use crate::utils::format_count;

/// Unique domains, iterated in sorted order.
pub type DomainSet = BTreeSet<String>;

/// Build the domain set for one list source.
///
/// The local file is read first so a missing file fails the run before any
/// network traffic. A source with neither URL nor file yields an empty set.
/// Fetched blobs are dropped before this returns, on success or error.
pub async fn aggregate<T: Transport>(
    fetcher: &Fetcher<T>,
    fs: &dyn FileSystem,
    source: &ListSource,
) -> Result<DomainSet, BoundError> {
    let mut domains = DomainSet::new();

    if let Some(path) = &source.file {
        domains.extend(parse_file(fs, path)?);
    }

    if let Some(url) = &source.url {
        let report = fetcher.fetch_list_of_lists(url).await?;
        for blob in &report.blobs {
            domains.extend(parse_blob(blob));
        }
    }

    Ok(domains)
}

/// Union any number of domain collections.
pub fn union<I, D>(sets: I) -> DomainSet
where
    I: IntoIterator<Item = D>,
    D: IntoIterator<Item = String>,
{
    sets.into_iter().flatten().collect()
}

/// Remove allowlisted domains from a blocklist.
///
/// Exact string match only: allowing `example.com` does not allow
/// `ads.example.com`.
pub fn subtract(blocklist: &DomainSet, allowlist: &DomainSet) -> DomainSet {
    if allowlist.is_empty() {
        return blocklist.clone();
    }

    let result: DomainSet = blocklist.difference(allowlist).cloned().collect();
    info!(
        "Allowlist removed {} of {} domains",
        format_count(blocklist.len() - result.len()),
        format_count(blocklist.len())
    );
    result
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn domain_vec_strategy(max_size: usize) -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-e]{1,3}\\.(com|net)", 0..max_size)
    }

    proptest! {
        /// Union does not depend on source order
        #[test]
        fn prop_union_order_independent(
            a in domain_vec_strategy(30),
            b in domain_vec_strategy(30),
            c in domain_vec_strategy(30),
        ) {
            let forward = union(vec![a.clone(), b.clone(), c.clone()]);
            let backward = union(vec![c, b, a]);
            prop_assert_eq!(forward, backward);
        }

        /// Re-aggregating an aggregate changes nothing
        #[test]
        fn prop_union_idempotent(a in domain_vec_strategy(30)) {
            let once = union(vec![a]);
            let twice = union(vec![once.iter().cloned().collect::<Vec<_>>(), once.iter().cloned().collect()]);
            prop_assert_eq!(once, twice);
        }

        /// Subtraction is a true set difference
        #[test]
        fn prop_subtract_is_difference(
            blocklist in domain_vec_strategy(50),
            allowlist in domain_vec_strategy(20),
        ) {
            let blocklist = union(vec![blocklist]);
            let allowlist = union(vec![allowlist]);
            let result = subtract(&blocklist, &allowlist);

            for domain in &result {
                prop_assert!(!allowlist.contains(domain));
                prop_assert!(blocklist.contains(domain));
            }
            for domain in &blocklist {
                if !allowlist.contains(domain) {
                    prop_assert!(result.contains(domain));
                }
            }
        }

        #[test]
        fn prop_subtract_empty_allowlist_identity(blocklist in domain_vec_strategy(50)) {
            let blocklist = union(vec![blocklist]);
            prop_assert_eq!(subtract(&blocklist, &DomainSet::new()), blocklist);
        }
    }
}
