//! HTTP fetcher for lists of lists.
//!
//! A list-of-lists URL returns an index: one list URL per line. The index
//! itself must be reachable, but every list it names is fetched
//! independently and a failing list is logged and skipped.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::FetchConfig;
use crate::error::BoundError;
use crate::parser::{split_lines, BlobId, ListBlob};
use crate::utils::{format_count, format_size};

#[cfg(test)]
use mockall::automock;

/// Status and body of one HTTP GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A list body over the configured size limit.
///
/// Retrying cannot help, so the fetcher gives up on the first one.
#[derive(Debug, thiserror::Error)]
#[error("Response too large: {size} bytes (max: {max} bytes)")]
pub struct ResponseTooLarge {
    pub size: u64,
    pub max: usize,
}

/// HTTP transport used by the fetcher.
///
/// Implementations must refuse bodies larger than `max_size` bytes with
/// [`ResponseTooLarge`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, max_size: usize) -> Result<HttpResponse>;
}

/// reqwest-based transport (rustls, no OpenSSL)
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("bound/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, max_size: usize) -> Result<HttpResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();

        if let Some(content_length) = response.content_length() {
            if content_length as usize > max_size {
                return Err(ResponseTooLarge {
                    size: content_length,
                    max: max_size,
                }
                .into());
            }
        }

        let body = response
            .bytes()
            .await
            .context("Failed to read response body")?;

        // Content-Length may be missing or wrong
        if body.len() > max_size {
            return Err(ResponseTooLarge {
                size: body.len() as u64,
                max: max_size,
            }
            .into());
        }

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// A nested list that could not be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub url: String,
    pub reason: String,
}

/// Everything retrieved for one list-of-lists URL
#[derive(Debug, Default)]
pub struct FetchReport {
    pub blobs: Vec<ListBlob>,
    pub failures: Vec<FetchFailure>,
}

/// Fetches list indexes and the lists they name
pub struct Fetcher<T = HttpTransport> {
    transport: T,
    settings: FetchConfig,
    next_id: AtomicU64,
    total_downloaded: AtomicUsize,
}

impl Fetcher<HttpTransport> {
    /// Create a fetcher backed by a real HTTP client
    pub fn new(settings: &FetchConfig) -> Result<Self> {
        let transport = HttpTransport::new(Duration::from_secs(settings.timeout_secs))?;
        Ok(Self::with_transport(transport, settings.clone()))
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn with_transport(transport: T, settings: FetchConfig) -> Self {
        Self {
            transport,
            settings,
            next_id: AtomicU64::new(0),
            total_downloaded: AtomicUsize::new(0),
        }
    }

    /// Total bytes of list bodies downloaded so far
    pub fn total_downloaded(&self) -> usize {
        self.total_downloaded.load(Ordering::Relaxed)
    }

    /// Fetch an index URL and every list it names.
    ///
    /// Fails only when the index itself cannot be retrieved. Nested lists
    /// that fail end up in [`FetchReport::failures`].
    pub async fn fetch_list_of_lists(&self, url: &str) -> Result<FetchReport, BoundError> {
        info!("Fetching list index {}...", url);

        let index = self
            .fetch_with_retry(url)
            .await
            .map_err(|e| BoundError::FetchFailed {
                url: url.to_string(),
                reason: format!("{:#}", e),
            })?;

        let urls = parse_index(&String::from_utf8_lossy(&index));
        info!("Index lists {} URLs", urls.len());

        // Each future owns its own Result, so one failure never cancels the rest
        let fetches = urls.into_iter().map(|list_url| async move {
            let result = self.fetch_with_retry(&list_url).await;
            (list_url, result)
        });
        let results: Vec<(String, Result<Vec<u8>>)> = stream::iter(fetches)
            .buffer_unordered(self.settings.max_concurrent.max(1))
            .collect()
            .await;

        let mut report = FetchReport::default();
        for (list_url, result) in results {
            match result {
                Ok(bytes) => {
                    let id = self.next_blob_id();
                    debug!(
                        "Fetched list #{} from {} ({})",
                        id,
                        list_url,
                        format_size(bytes.len() as u64)
                    );
                    report.blobs.push(ListBlob::new(id, list_url, bytes));
                }
                Err(e) => {
                    warn!("Skipping {}: {:#}", list_url, e);
                    report.failures.push(FetchFailure {
                        url: list_url,
                        reason: format!("{:#}", e),
                    });
                }
            }
        }

        info!(
            "Fetched {} lists ({} failed, {} total)",
            format_count(report.blobs.len()),
            report.failures.len(),
            format_size(self.total_downloaded() as u64)
        );

        Ok(report)
    }

    fn next_blob_id(&self) -> BlobId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// GET with exponential backoff on transport errors and bad statuses
    async fn fetch_with_retry(&self, url: &str) -> Result<Vec<u8>> {
        let mut last_error = None;

        for attempt in 0..=self.settings.max_retries {
            if attempt > 0 {
                let delay = self.settings.retry_delay_ms * (1 << (attempt - 1));
                debug!("Retry {} after {}ms for {}", attempt, delay, url);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match self.transport.get(url, self.settings.max_list_size).await {
                Ok(response) if response.is_success() => {
                    self.total_downloaded
                        .fetch_add(response.body.len(), Ordering::Relaxed);
                    return Ok(response.body);
                }
                Ok(response) => {
                    last_error = Some(anyhow::anyhow!("HTTP {}", response.status));
                }
                Err(e) if e.is::<ResponseTooLarge>() => return Err(e),
                Err(e) => {
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Unknown error")))
    }
}

/// Split a list-of-lists body into URLs, skipping blanks and `#` comments
pub fn parse_index(content: &str) -> Vec<String> {
    split_lines(content)
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// In-memory transport keyed by URL; unknown URLs fail like a dead host
    #[derive(Default)]
    struct FakeTransport {
        responses: HashMap<String, (u16, Vec<u8>)>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        fn with(mut self, url: &str, status: u16, body: &str) -> Self {
            self.responses
                .insert(url.to_string(), (status, body.as_bytes().to_vec()));
            self
        }

        fn calls_to(&self, url: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn get(&self, url: &str, max_size: usize) -> Result<HttpResponse> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.responses.get(url) {
                Some((_, body)) if body.len() > max_size => Err(ResponseTooLarge {
                    size: body.len() as u64,
                    max: max_size,
                }
                .into()),
                Some((status, body)) => Ok(HttpResponse {
                    status: *status,
                    body: body.clone(),
                }),
                None => anyhow::bail!("connection refused"),
            }
        }
    }

    fn settings() -> FetchConfig {
        FetchConfig {
            max_retries: 1,
            retry_delay_ms: 0,
            ..FetchConfig::default()
        }
    }

    const INDEX: &str = "https://lists.example.org/index";

    #[tokio::test]
    async fn test_fetch_all_nested_lists() {
        let transport = FakeTransport::default()
            .with(INDEX, 200, "https://a.example/list\nhttps://b.example/list\n")
            .with("https://a.example/list", 200, "a.com\n")
            .with("https://b.example/list", 200, "0.0.0.0 b.com\n");
        let fetcher = Fetcher::with_transport(transport, settings());

        let report = fetcher.fetch_list_of_lists(INDEX).await.unwrap();
        assert_eq!(report.blobs.len(), 2);
        assert!(report.failures.is_empty());
        assert_eq!(fetcher.total_downloaded(), 66);
    }

    #[tokio::test]
    async fn test_nested_failure_is_skipped() {
        let transport = FakeTransport::default()
            .with(
                INDEX,
                200,
                "https://a.example/list\nhttps://down.example/list\nhttps://c.example/list\n",
            )
            .with("https://a.example/list", 200, "a.com\n")
            .with("https://c.example/list", 200, "c.com\n");
        let fetcher = Fetcher::with_transport(transport, settings());

        let report = fetcher.fetch_list_of_lists(INDEX).await.unwrap();
        assert_eq!(report.blobs.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].url, "https://down.example/list");
        assert!(report.failures[0].reason.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_nested_http_error_is_skipped() {
        let transport = FakeTransport::default()
            .with(INDEX, 200, "https://a.example/list\nhttps://gone.example/list\n")
            .with("https://a.example/list", 200, "a.com\n")
            .with("https://gone.example/list", 404, "not found");
        let fetcher = Fetcher::with_transport(transport, settings());

        let report = fetcher.fetch_list_of_lists(INDEX).await.unwrap();
        assert_eq!(report.blobs.len(), 1);
        assert_eq!(report.failures[0].reason, "HTTP 404");
        // One retry after the first attempt
        assert_eq!(fetcher.transport.calls_to("https://gone.example/list"), 2);
    }

    #[tokio::test]
    async fn test_index_failure_is_fatal() {
        let transport = FakeTransport::default().with(INDEX, 500, "oops");
        let fetcher = Fetcher::with_transport(transport, settings());

        match fetcher.fetch_list_of_lists(INDEX).await {
            Err(BoundError::FetchFailed { url, reason }) => {
                assert_eq!(url, INDEX);
                assert_eq!(reason, "HTTP 500");
            }
            other => panic!("Expected FetchFailed, got {:?}", other.map(|r| r.blobs.len())),
        }
    }

    #[tokio::test]
    async fn test_index_unreachable_is_fatal() {
        let fetcher = Fetcher::with_transport(FakeTransport::default(), settings());
        let result = fetcher.fetch_list_of_lists(INDEX).await;
        assert!(matches!(result, Err(BoundError::FetchFailed { .. })));
    }

    #[tokio::test]
    async fn test_oversized_list_is_skipped() {
        let big = "x.com\n".repeat(100);
        let transport = FakeTransport::default()
            .with(INDEX, 200, "https://big.example/list\nhttps://a.example/list\n")
            .with("https://big.example/list", 200, &big)
            .with("https://a.example/list", 200, "a.com\n");
        let fetcher = Fetcher::with_transport(
            transport,
            FetchConfig {
                max_list_size: 100,
                ..settings()
            },
        );

        let report = fetcher.fetch_list_of_lists(INDEX).await.unwrap();
        assert_eq!(report.blobs.len(), 1);
        assert_eq!(report.blobs[0].origin(), "https://a.example/list");
        assert!(report.failures[0].reason.contains("too large"));
        assert_eq!(fetcher.transport.calls_to("https://big.example/list"), 1);
    }

    #[tokio::test]
    async fn test_oversized_list_not_retried_with_defaults() {
        let mut mock = MockTransport::new();
        mock.expect_get()
            .withf(|url, _| url == INDEX)
            .times(1)
            .returning(|_, _| {
                Ok(HttpResponse {
                    status: 200,
                    body: b"https://big.example/list\n".to_vec(),
                })
            });
        mock.expect_get()
            .withf(|url, _| url == "https://big.example/list")
            .times(1)
            .returning(|_, max| {
                Err(ResponseTooLarge {
                    size: max as u64 + 1,
                    max,
                }
                .into())
            });
        let fetcher = Fetcher::with_transport(
            mock,
            FetchConfig {
                retry_delay_ms: 0,
                ..FetchConfig::default()
            },
        );

        let report = fetcher.fetch_list_of_lists(INDEX).await.unwrap();
        assert!(report.blobs.is_empty());
        assert_eq!(report.failures.len(), 1);
    }

    #[tokio::test]
    async fn test_blob_ids_unique() {
        // Two URLs that would collide once sanitized into file names
        let transport = FakeTransport::default()
            .with(INDEX, 200, "https://x.example/a/b\nhttps://x.example/a_b\n")
            .with("https://x.example/a/b", 200, "a.com\n")
            .with("https://x.example/a_b", 200, "b.com\n");
        let fetcher = Fetcher::with_transport(transport, settings());

        let first = fetcher.fetch_list_of_lists(INDEX).await.unwrap();
        let second = fetcher.fetch_list_of_lists(INDEX).await.unwrap();
        let ids: HashSet<BlobId> = first
            .blobs
            .iter()
            .chain(second.blobs.iter())
            .map(|b| b.id())
            .collect();
        assert_eq!(ids.len(), 4);
    }

    #[tokio::test]
    async fn test_retry_then_success() {
        let mut mock = MockTransport::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(anyhow::anyhow!("timed out")));
        mock.expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Ok(HttpResponse {
                    status: 200,
                    body: Vec::new(),
                })
            });
        let fetcher = Fetcher::with_transport(mock, settings());

        let report = fetcher.fetch_list_of_lists(INDEX).await.unwrap();
        assert!(report.blobs.is_empty());
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_no_retry_when_disabled() {
        let mut mock = MockTransport::new();
        mock.expect_get()
            .withf(|url, _| url == INDEX)
            .times(1)
            .returning(|_, _| {
                Ok(HttpResponse {
                    status: 503,
                    body: Vec::new(),
                })
            });
        let fetcher = Fetcher::with_transport(
            mock,
            FetchConfig {
                max_retries: 0,
                ..settings()
            },
        );

        assert!(fetcher.fetch_list_of_lists(INDEX).await.is_err());
    }

    #[test]
    fn test_parse_index() {
        let content = "# The Big Blocklist Collection\n\nhttps://a.example/list\r\n  https://b.example/list  \n";
        assert_eq!(
            parse_index(content),
            vec!["https://a.example/list", "https://b.example/list"]
        );
    }

    #[test]
    fn test_parse_index_carriage_return_endings() {
        assert_eq!(
            parse_index("https://a.example/list\rhttps://b.example/list\r"),
            vec!["https://a.example/list", "https://b.example/list"]
        );
    }

    #[test]
    fn test_http_response_success_range() {
        let ok = HttpResponse {
            status: 204,
            body: Vec::new(),
        };
        let redirect = HttpResponse {
            status: 301,
            body: Vec::new(),
        };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }

    #[test]
    fn test_http_transport_new() {
        assert!(HttpTransport::new(Duration::from_secs(5)).is_ok());
    }
}
