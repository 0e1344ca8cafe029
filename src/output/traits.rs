//! Log sink traits and types
//!
//! This module defines the trait interface for visit log sinks and the
//! records they receive: one `VisitRecord` per fetched page and one
//! `RunSummary` at the end of the run.

use chrono::{DateTime, Local};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Extra per-page measurements, written only in extended mode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetrics {
    /// Content-Type header value
    pub content_type: String,

    /// Time until response headers arrived
    pub connect_ms: u64,

    /// Time spent reading the body
    pub read_ms: u64,

    /// Time spent extracting links
    pub parse_ms: u64,

    /// Links the extractor returned
    pub links_found: usize,

    /// Links the frontier accepted
    pub links_enqueued: usize,

    /// Whether the HTML body hit the byte cap
    pub truncated: bool,
}

/// One line of the visit log
#[derive(Debug, Clone, PartialEq)]
pub struct VisitRecord {
    pub timestamp: DateTime<Local>,

    /// Canonical URL that was fetched
    pub url: String,

    /// HTTP status, 0 for a network failure
    pub status: u16,

    /// Declared or observed body size
    pub bytes: u64,

    pub depth: u32,

    /// Priority the URL was dequeued with
    pub priority: f64,

    pub host: String,

    /// Visits to `host` including this one
    pub host_visits: u64,

    pub superdomain: String,

    /// Visits to `superdomain` including this one
    pub superdomain_visits: u64,

    /// Total fetch time
    pub elapsed_ms: u64,

    pub metrics: PageMetrics,
}

/// Aggregate figures for a finished run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Pages fetched (successful or not)
    pub pages_crawled: u64,

    /// Sum of the `bytes` column
    pub total_bytes: u64,

    /// Wall-clock duration of the run
    pub elapsed: Duration,

    /// Responses with status 404
    pub not_found: u64,

    /// Responses with status 403
    pub forbidden: u64,
}

impl RunSummary {
    /// Returns the run duration in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Returns the crawl rate, guarding against a zero duration
    pub fn pages_per_sec(&self) -> f64 {
        self.pages_crawled as f64 / self.elapsed_secs().max(1e-9)
    }
}

/// Trait for visit log sinks
///
/// Sinks receive records from every worker concurrently, so implementations
/// must be thread-safe. `emit` must not fail the crawl: a sink that cannot
/// write reports the problem through diagnostics and carries on.
pub trait LogSink: Send + Sync {
    /// Records one fetched page
    fn emit(&self, record: &VisitRecord);

    /// Writes the end-of-run summary and flushes
    fn finish(&self, summary: &RunSummary) -> OutputResult<()>;
}
