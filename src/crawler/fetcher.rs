//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with the configured user agent and timeout
//! - Reading HTML bodies up to a byte cap and flagging truncation
//! - Sniffing only the first few KiB of non-HTML bodies
//! - Folding network errors into a status-0 result
//!
//! A fetch never fails from the caller's point of view: every outcome is a
//! `FetchResult` that can be logged.

use crate::config::{ContentConfig, CrawlerConfig};
use reqwest::{Client, Response};
use std::time::{Duration, Instant};

/// Number of body bytes read from non-HTML responses
pub const SNIFF_BYTES: usize = 4096;

/// Wall-clock breakdown of a single fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchTiming {
    /// Time until response headers arrived
    pub connect_ms: u64,
    /// Time spent reading the body
    pub read_ms: u64,
    /// Total time
    pub elapsed_ms: u64,
}

/// Outcome of a fetch
#[derive(Debug, Clone, Default)]
pub struct FetchResult {
    /// HTTP status code, or 0 for a network-level failure
    pub status: u16,

    /// Content-Type header value (empty if absent)
    pub content_type: String,

    /// Body bytes read, bounded by the HTML cap or the sniff size
    pub body: Vec<u8>,

    /// Declared Content-Length, or the number of bytes read when absent
    pub content_length: u64,

    /// True when an HTML body hit the byte cap
    pub truncated: bool,

    pub timing: FetchTiming,
}

impl FetchResult {
    fn network_failure(started: Instant) -> Self {
        let elapsed_ms = millis(started.elapsed());
        Self {
            timing: FetchTiming {
                connect_ms: elapsed_ms,
                read_ms: 0,
                elapsed_ms,
            },
            ..Self::default()
        }
    }

    /// Returns true if no HTTP response was received
    pub fn is_network_failure(&self) -> bool {
        self.status == 0
    }

    /// Returns true if the Content-Type starts with `html_prefix`
    pub fn is_html(&self, html_prefix: &str) -> bool {
        is_html_content_type(&self.content_type, html_prefix)
    }
}

/// Builds the HTTP client shared by all workers
///
/// # Arguments
///
/// * `config` - Crawler identity and timeout settings
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use driftnet::config::CrawlerConfig;
/// use driftnet::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages and applies the body-size policy
pub struct Fetcher {
    client: Client,
    html_prefix: String,
    max_html_bytes: usize,
}

impl Fetcher {
    /// Creates a fetcher over a shared client
    pub fn new(client: Client, content: &ContentConfig) -> Self {
        Self {
            client,
            html_prefix: content.html_mime_prefix.clone(),
            max_html_bytes: content.max_html_bytes,
        }
    }

    /// Fetches a URL
    ///
    /// # Body Policy
    ///
    /// | Response | Body read |
    /// |----------|-----------|
    /// | Status >= 400 | nothing |
    /// | HTML | up to `max_html_bytes`, `truncated` set when the cap is reached |
    /// | Anything else | up to `SNIFF_BYTES` |
    /// | Network error (before or during the body) | nothing, status 0 |
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let started = Instant::now();

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Fetch of {} failed: {}", url, e);
                return FetchResult::network_failure(started);
            }
        };

        let connect_ms = millis(started.elapsed());
        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if status.is_client_error() || status.is_server_error() {
            return FetchResult {
                status: status.as_u16(),
                content_type,
                timing: FetchTiming {
                    connect_ms,
                    read_ms: 0,
                    elapsed_ms: connect_ms,
                },
                ..FetchResult::default()
            };
        }

        let declared_length = response.content_length();
        let is_html = is_html_content_type(&content_type, &self.html_prefix);
        let cap = if is_html {
            self.max_html_bytes
        } else {
            SNIFF_BYTES
        };

        let read_started = Instant::now();
        let (body, hit_cap) = match read_capped(response, cap).await {
            Ok(read) => read,
            Err(e) => {
                tracing::debug!("Reading body of {} failed: {}", url, e);
                return FetchResult::network_failure(started);
            }
        };

        FetchResult {
            status: status.as_u16(),
            content_type,
            content_length: declared_length.unwrap_or(body.len() as u64),
            body,
            truncated: is_html && hit_cap,
            timing: FetchTiming {
                connect_ms,
                read_ms: millis(read_started.elapsed()),
                elapsed_ms: millis(started.elapsed()),
            },
        }
    }
}

/// Reads at most `cap` body bytes
///
/// Returns the bytes and whether the cap was reached.
pub(crate) async fn read_capped(mut response: Response, cap: usize) -> Result<(Vec<u8>, bool), reqwest::Error> {
    let mut body = Vec::new();

    while body.len() < cap {
        match response.chunk().await? {
            Some(chunk) => {
                let take = chunk.len().min(cap - body.len());
                body.extend_from_slice(&chunk[..take]);
            }
            None => return Ok((body, false)),
        }
    }

    Ok((body, true))
}

fn is_html_content_type(content_type: &str, html_prefix: &str) -> bool {
    content_type
        .trim_start()
        .to_ascii_lowercase()
        .starts_with(&html_prefix.to_ascii_lowercase())
}

fn millis(duration: Duration) -> u64 {
    duration.as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&CrawlerConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_html_content_type_matching() {
        assert!(is_html_content_type("text/html", "text/html"));
        assert!(is_html_content_type("text/html; charset=utf-8", "text/html"));
        assert!(is_html_content_type("Text/HTML", "text/html"));
        assert!(!is_html_content_type("application/xhtml+xml", "text/html"));
        assert!(!is_html_content_type("", "text/html"));
    }

    #[test]
    fn test_network_failure_result() {
        let result = FetchResult::network_failure(Instant::now());
        assert!(result.is_network_failure());
        assert!(result.body.is_empty());
        assert_eq!(result.content_length, 0);
        assert!(!result.truncated);
    }

    #[test]
    fn test_is_html() {
        let result = FetchResult {
            status: 200,
            content_type: "text/html; charset=iso-8859-1".to_string(),
            ..FetchResult::default()
        };
        assert!(result.is_html("text/html"));
        assert!(!result.is_network_failure());
    }

    // Body reading and timeouts are exercised against wiremock in the
    // integration tests
}
