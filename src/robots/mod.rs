//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching
//! robots.txt files. Policies are fetched once per host and cached for the
//! rest of the run; any fetch or parse failure is treated as allow-all.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::{robots_agent, ParsedRobots};

use crate::crawler::{decode_lossy, read_capped};
use crate::CrawlerError;
use reqwest::Client;
use url::Url;

/// Largest robots.txt body read per host; rules past it are ignored
pub const ROBOTS_MAX_BYTES: usize = 500 * 1024;

/// Returns the robots.txt URL serving the given page
///
/// Scheme, host and port are kept; path, query and fragment are replaced.
pub fn robots_url(page_url: &str) -> Result<Url, CrawlerError> {
    let page = Url::parse(page_url)?;
    Ok(page.join("/robots.txt")?)
}

/// Fetches and parses robots.txt for the host serving `page_url`
///
/// # Arguments
///
/// * `client` - HTTP client carrying the crawler's user agent and timeout
/// * `page_url` - Any URL on the host whose policy is wanted
///
/// # Returns
///
/// * `Ok(ParsedRobots)` - Successfully fetched and parsed robots.txt
/// * `Err(CrawlerError)` - Network failure or non-success status
pub async fn fetch_robots(client: &Client, page_url: &str) -> Result<ParsedRobots, CrawlerError> {
    let url = robots_url(page_url)?;

    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|source| CrawlerError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(CrawlerError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let (body, truncated) = read_capped(response, ROBOTS_MAX_BYTES)
        .await
        .map_err(|source| CrawlerError::Http {
            url: url.to_string(),
            source,
        })?;
    if truncated {
        tracing::debug!("{} exceeds {} bytes, ignoring the rest", url, ROBOTS_MAX_BYTES);
    }

    Ok(ParsedRobots::from_content(&decode_lossy(&body)))
}
