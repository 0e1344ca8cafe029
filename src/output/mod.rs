//! Output module for the visit log
//!
//! This module handles:
//! - The `LogSink` interface workers report fetched pages through
//! - Writing the TSV visit log and its summary block
//! - Collecting records in memory
//! - Tracking run-wide totals

mod memory;
pub mod stats;
mod traits;
mod tsv;

pub use memory::MemorySink;
pub use stats::RunTotals;
pub use traits::{LogSink, OutputError, OutputResult, PageMetrics, RunSummary, VisitRecord};
pub use tsv::{format_row, header_row, summary_block, TsvLogSink};
