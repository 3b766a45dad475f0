//! Line classification for domain list dialects.
//!
//! Community blocklists come in a handful of text formats. Each format is a
//! [`Dialect`]; a trimmed line is tried against [`DIALECTS`] in order and the
//! first dialect that recognizes it decides the outcome:
//!
//! 1. Markup (`#`, `<`, `::` prefixes) - never a domain
//! 2. Bare domain (`ads.example.com`)
//! 3. Numeric prefix (`0 ads.example.com`)
//! 4. Trailing comment (`ads.example.com # tracker`)
//! 5. Hosts file (`0.0.0.0 ads.example.com`), except `localhost`/`broadcasthost`

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static BARE_DOMAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.-]+$").expect("valid bare domain regex"));

static NUMERIC_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d\s+([\w.-]+)$").expect("valid numeric prefix regex"));

static TRAILING_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\w.-]+)\s+#").expect("valid trailing comment regex"));

static HOSTS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\s+(.*)$").expect("valid hosts regex")
});

/// Hostnames every hosts file maps to loopback; never blocked.
const HOSTS_RESERVED: &[&str] = &["localhost", "broadcasthost"];

/// Line prefixes for comments and HTML/IPv6 noise.
const MARKUP_PREFIXES: &[&str] = &["#", "<", "::"];

/// A known list line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Markup,
    BareDomain,
    NumericPrefix,
    TrailingComment,
    Hosts,
}

/// Dialects in precedence order.
pub const DIALECTS: [Dialect; 5] = [
    Dialect::Markup,
    Dialect::BareDomain,
    Dialect::NumericPrefix,
    Dialect::TrailingComment,
    Dialect::Hosts,
];

/// Outcome of classifying one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    /// The dialect recognized the line and extracted a domain
    Domain { dialect: Dialect, domain: &'a str },
    /// The dialect recognized the line but it carries no domain
    Excluded { dialect: Dialect },
    /// Blank or no dialect recognized the line
    Unmatched,
}

impl<'a> Classification<'a> {
    pub fn domain(&self) -> Option<&'a str> {
        match *self {
            Classification::Domain { domain, .. } => Some(domain),
            _ => None,
        }
    }

    pub fn dialect(&self) -> Option<Dialect> {
        match *self {
            Classification::Domain { dialect, .. } | Classification::Excluded { dialect } => {
                Some(dialect)
            }
            Classification::Unmatched => None,
        }
    }
}

impl Dialect {
    /// Try this dialect on a trimmed, non-empty line.
    ///
    /// Returns `None` when the line is not in this dialect, so the next
    /// dialect gets a chance.
    pub fn recognize(self, line: &str) -> Option<Classification<'_>> {
        match self {
            Dialect::Markup => MARKUP_PREFIXES
                .iter()
                .any(|prefix| line.starts_with(prefix))
                .then_some(Classification::Excluded { dialect: self }),
            Dialect::BareDomain => BARE_DOMAIN.is_match(line).then_some(Classification::Domain {
                dialect: self,
                domain: line,
            }),
            Dialect::NumericPrefix => capture(&NUMERIC_PREFIX, line).map(|domain| {
                Classification::Domain {
                    dialect: self,
                    domain,
                }
            }),
            Dialect::TrailingComment => capture(&TRAILING_COMMENT, line).map(|domain| {
                Classification::Domain {
                    dialect: self,
                    domain,
                }
            }),
            Dialect::Hosts => capture(&HOSTS_LINE, line).map(|host| {
                if HOSTS_RESERVED.contains(&host) {
                    Classification::Excluded { dialect: self }
                } else {
                    Classification::Domain {
                        dialect: self,
                        domain: host,
                    }
                }
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Markup => "markup",
            Dialect::BareDomain => "bare-domain",
            Dialect::NumericPrefix => "numeric-prefix",
            Dialect::TrailingComment => "trailing-comment",
            Dialect::Hosts => "hosts",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn capture<'a>(re: &Regex, line: &'a str) -> Option<&'a str> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Classify a trimmed line, reporting which dialect decided.
pub fn classify_with_dialect(line: &str) -> Classification<'_> {
    if line.is_empty() {
        return Classification::Unmatched;
    }

    DIALECTS
        .iter()
        .find_map(|dialect| dialect.recognize(line))
        .unwrap_or(Classification::Unmatched)
}

/// Extract the domain from a trimmed line, if it carries one.
pub fn classify(line: &str) -> Option<&str> {
    classify_with_dialect(line).domain()
}
