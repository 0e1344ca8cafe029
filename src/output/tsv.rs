//! Tab-separated visit log
//!
//! Layout:
//!
//! ```text
//! timestamp  url  status  bytes  depth  priority  domain  domain_count  superdomain  super_count  elapsed_ms  [extended columns]
//! ...one row per fetched page...
//!
//! STAT  pages_crawled       <n>
//! STAT  total_bytes         <n>
//! STAT  elapsed_sec         <3 decimals>
//! STAT  rate_pages_per_sec  <2 decimals>
//! STAT  num_404             <n>
//! STAT  num_403             <n>
//! ```

use crate::output::traits::{LogSink, OutputError, OutputResult, RunSummary, VisitRecord};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const BASE_COLUMNS: &[&str] = &[
    "timestamp",
    "url",
    "status",
    "bytes",
    "depth",
    "priority",
    "domain",
    "domain_count",
    "superdomain",
    "super_count",
    "elapsed_ms",
];

const EXTENDED_COLUMNS: &[&str] = &[
    "ct",
    "t_connect_ms",
    "t_read_ms",
    "t_parse_ms",
    "links_found",
    "links_enqueued",
    "html_truncated",
];

/// Writes visit records to a TSV file
pub struct TsvLogSink {
    writer: Mutex<BufWriter<File>>,
    extended: bool,
}

impl TsvLogSink {
    /// Creates (or truncates) the log file and writes the header row
    ///
    /// # Arguments
    ///
    /// * `path` - Destination file; its parent directory must exist
    /// * `extended` - Append the timing and link-count columns
    pub fn create(path: &Path, extended: bool) -> OutputResult<Self> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "{}", header_row(extended))?;

        Ok(Self {
            writer: Mutex::new(writer),
            extended,
        })
    }
}

impl LogSink for TsvLogSink {
    fn emit(&self, record: &VisitRecord) {
        let row = format_row(record, self.extended);
        let mut writer = self.writer.lock();
        if let Err(e) = writeln!(writer, "{}", row) {
            tracing::warn!("Failed to write visit record for {}: {}", record.url, e);
        }
    }

    fn finish(&self, summary: &RunSummary) -> OutputResult<()> {
        let mut writer = self.writer.lock();
        writer.write_all(summary_block(summary).as_bytes())?;
        writer
            .flush()
            .map_err(|e| OutputError::Write(format!("flush failed: {}", e)))
    }
}

/// Returns the header row without a trailing newline
pub fn header_row(extended: bool) -> String {
    let mut columns = BASE_COLUMNS.to_vec();
    if extended {
        columns.extend_from_slice(EXTENDED_COLUMNS);
    }
    columns.join("\t")
}

/// Formats one record as a row without a trailing newline
pub fn format_row(record: &VisitRecord, extended: bool) -> String {
    let mut fields = vec![
        record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        field(&record.url),
        record.status.to_string(),
        record.bytes.to_string(),
        record.depth.to_string(),
        format!("{:.6}", record.priority),
        field(&record.host),
        record.host_visits.to_string(),
        field(&record.superdomain),
        record.superdomain_visits.to_string(),
        record.elapsed_ms.to_string(),
    ];

    if extended {
        let metrics = &record.metrics;
        fields.extend([
            field(&metrics.content_type),
            metrics.connect_ms.to_string(),
            metrics.read_ms.to_string(),
            metrics.parse_ms.to_string(),
            metrics.links_found.to_string(),
            metrics.links_enqueued.to_string(),
            u8::from(metrics.truncated).to_string(),
        ]);
    }

    fields.join("\t")
}

/// Formats the blank separator line and the STAT rows
pub fn summary_block(summary: &RunSummary) -> String {
    format!(
        "\nSTAT\tpages_crawled\t{}\nSTAT\ttotal_bytes\t{}\nSTAT\telapsed_sec\t{:.3}\nSTAT\trate_pages_per_sec\t{:.2}\nSTAT\tnum_404\t{}\nSTAT\tnum_403\t{}\n",
        summary.pages_crawled,
        summary.total_bytes,
        summary.elapsed_secs(),
        summary.pages_per_sec(),
        summary.not_found,
        summary.forbidden,
    )
}

// Tabs and line breaks would shift columns
fn field(value: &str) -> String {
    value.replace(['\t', '\r', '\n'], " ")
}
