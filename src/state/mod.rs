//! State module for tracking crawl progress
//!
//! This module provides the per-host and per-superdomain counters that feed
//! the frontier's priority formula and failure backoff. The counters live for
//! one run and are never persisted.

mod domain_state;

// Re-export main types
pub use domain_state::{DomainStats, HostCounters};
