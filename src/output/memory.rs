//! In-memory log sink

use crate::output::traits::{LogSink, OutputResult, RunSummary, VisitRecord};
use parking_lot::Mutex;

/// Collects visit records in memory
///
/// Useful for embedding the crawler and for tests that inspect what was
/// visited without parsing a log file.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<VisitRecord>>,
    summary: Mutex<Option<RunSummary>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the records emitted so far
    pub fn records(&self) -> Vec<VisitRecord> {
        self.records.lock().clone()
    }

    /// Returns the URLs emitted so far, in emission order
    pub fn urls(&self) -> Vec<String> {
        self.records.lock().iter().map(|r| r.url.clone()).collect()
    }

    /// Returns the summary passed to `finish`, if the run has ended
    pub fn summary(&self) -> Option<RunSummary> {
        self.summary.lock().clone()
    }
}

impl LogSink for MemorySink {
    fn emit(&self, record: &VisitRecord) {
        self.records.lock().push(record.clone());
    }

    fn finish(&self, summary: &RunSummary) -> OutputResult<()> {
        *self.summary.lock() = Some(summary.clone());
        Ok(())
    }
}
