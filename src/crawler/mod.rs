//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The priority frontier and visited set
//! - HTTP fetching with body-size caps
//! - HTML link extraction (tree-building and streaming strategies)
//! - The worker pool and per-URL processing

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod scanner;

pub use coordinator::{Coordinator, StopHandle, POLL_INTERVAL};
pub use fetcher::{build_http_client, FetchResult, FetchTiming, Fetcher, SNIFF_BYTES};
pub(crate) use fetcher::read_capped;
pub use frontier::{
    priority_for, Claim, Frontier, FrontierEntry, Lease, Reservation, HOST_FAILURE_LIMIT,
};
pub use parser::{decode_lossy, extractor_for, resolve_links, HtmlTreeExtractor, LinkExtractor};
pub use scanner::StreamingExtractor;

use crate::config::Config;
use crate::output::{LogSink, RunSummary};
use crate::CrawlerError;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// Seeds a fresh coordinator and runs it to completion. Use `Coordinator`
/// directly when the crawl must be stoppable from outside.
///
/// # Arguments
///
/// * `config` - The validated run configuration
/// * `seeds` - Start URLs, enqueued at depth 0
/// * `sink` - Destination for visit records and the run summary
///
/// # Returns
///
/// * `Ok(RunSummary)` - Crawl completed
/// * `Err(CrawlerError)` - No seed was accepted or the run could not start
pub async fn crawl<S: AsRef<str>>(
    config: Config,
    seeds: &[S],
    sink: Arc<dyn LogSink>,
) -> Result<RunSummary, CrawlerError> {
    let coordinator = Coordinator::new(config, sink)?;
    if coordinator.seed(seeds) == 0 {
        return Err(CrawlerError::NoSeeds);
    }
    coordinator.run().await
}
