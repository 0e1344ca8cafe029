//! Run-wide counters
//!
//! Tracks the figures that end up in the summary block of the visit log.
//! Workers update these concurrently; the page count doubles as the stop
//! condition for the page budget.

use crate::output::traits::RunSummary;
use parking_lot::Mutex;
use std::time::Instant;

#[derive(Debug, Default)]
struct Totals {
    pages: u64,
    bytes: u64,
    not_found: u64,
    forbidden: u64,
}

/// Thread-safe run totals
#[derive(Debug)]
pub struct RunTotals {
    totals: Mutex<Totals>,
    started: Instant,
}

impl RunTotals {
    /// Starts the run clock
    pub fn new() -> Self {
        Self {
            totals: Mutex::new(Totals::default()),
            started: Instant::now(),
        }
    }

    /// Tallies 404 and 403 responses
    pub fn record_status(&self, status: u16) {
        let mut totals = self.totals.lock();
        match status {
            404 => totals.not_found += 1,
            403 => totals.forbidden += 1,
            _ => {}
        }
    }

    /// Counts a finished page and its size
    ///
    /// # Returns
    ///
    /// The number of pages crawled so far, including this one
    pub fn record_page(&self, bytes: u64) -> u64 {
        let mut totals = self.totals.lock();
        totals.pages += 1;
        totals.bytes += bytes;
        totals.pages
    }

    /// Returns the number of pages crawled so far
    pub fn pages_crawled(&self) -> u64 {
        self.totals.lock().pages
    }

    /// Returns the current crawl rate
    pub fn pages_per_sec(&self) -> f64 {
        self.summary().pages_per_sec()
    }

    /// Snapshots the totals with the elapsed run time
    pub fn summary(&self) -> RunSummary {
        let totals = self.totals.lock();
        RunSummary {
            pages_crawled: totals.pages,
            total_bytes: totals.bytes,
            elapsed: self.started.elapsed(),
            not_found: totals.not_found,
            forbidden: totals.forbidden,
        }
    }
}

impl Default for RunTotals {
    fn default() -> Self {
        Self::new()
    }
}
