//! Configuration module for Driftnet
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, plus reading the seed list. Every key has a default, so an empty
//! file (or no file at all) yields a usable configuration.
//!
//! # Example
//!
//! ```no_run
//! use driftnet::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("driftnet.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_disallowed_extensions, Config, ContentConfig, CrawlerConfig, OutputConfig,
    ParserStrategy, PriorityConfig, MAX_TIMEOUT_SECS,
};

// Re-export parser functions
pub use parser::{load_config, load_seeds, parse_config, parse_seeds};
pub use validation::validate;
