use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;

/// File extensions that are never enqueued
const DEFAULT_DISALLOWED_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".webp", ".ico", // images
    ".pdf", ".ps", ".eps", // documents
    ".mp3", ".wav", ".ogg", ".flac", // audio
    ".mp4", ".mkv", ".avi", ".mov", ".wmv", ".webm", // video
    ".css", ".js", ".mjs", ".ts", // assets
    ".zip", ".tar", ".gz", ".tgz", ".rar", ".7z", // archives
    ".apk", ".dmg", ".exe", ".bin", ".iso", // binaries
    ".xml", ".rss", ".json", ".txt", ".csv", // data
];

/// Longest accepted per-request timeout, in seconds
pub const MAX_TIMEOUT_SECS: f64 = 3600.0;

/// Returns the default extension blacklist
pub fn default_disallowed_extensions() -> BTreeSet<String> {
    DEFAULT_DISALLOWED_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

/// Main configuration structure for Driftnet
///
/// Built once before any worker starts and shared read-only afterwards.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub content: ContentConfig,
    pub priority: PriorityConfig,
    pub output: OutputConfig,
}

/// Crawler identity, politeness and limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Whether robots.txt rules are honored
    pub respect_robots: bool,

    /// Timeout for an entire request, in seconds
    pub timeout_secs: f64,

    /// Number of concurrent workers
    pub threads: usize,

    /// Stop after this many pages have been crawled
    pub max_pages: u64,

    /// Links are only followed from pages shallower than this
    pub max_depth: u32,

    /// Maximum number of hosts kept in the robots cache
    pub robots_cache_size: usize,
}

impl CrawlerConfig {
    /// Returns the per-request timeout as a Duration
    ///
    /// Values above `MAX_TIMEOUT_SECS` are clamped; a value that is not a
    /// positive number falls back to the default timeout.
    pub fn timeout(&self) -> Duration {
        let fallback = Duration::from_secs_f64(Self::default().timeout_secs);
        if self.timeout_secs > 0.0 {
            Duration::try_from_secs_f64(self.timeout_secs.min(MAX_TIMEOUT_SECS))
                .unwrap_or(fallback)
        } else {
            fallback
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: "driftnet/0.1 (+https://example.com/bot)".to_string(),
            respect_robots: true,
            timeout_secs: 5.0,
            threads: 16,
            max_pages: 5000,
            max_depth: 10,
            robots_cache_size: 2048,
        }
    }
}

/// Which link extractor runs over fetched HTML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ParserStrategy {
    /// Full HTML5 tree builder, tolerant of malformed markup
    Robust,
    /// Streaming tag scanner
    #[default]
    Fast,
}

/// Content policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ContentConfig {
    /// Content-Type prefix identifying HTML responses
    pub html_mime_prefix: String,

    /// Paths ending in one of these are never enqueued
    pub disallowed_extensions: BTreeSet<String>,

    /// Maximum number of HTML body bytes read per page
    pub max_html_bytes: usize,

    /// Link extraction strategy
    pub parser: ParserStrategy,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            html_mime_prefix: "text/html".to_string(),
            disallowed_extensions: default_disallowed_extensions(),
            max_html_bytes: 256 * 1024,
            parser: ParserStrategy::default(),
        }
    }
}

/// Frontier priority knobs (depth-dominant with a small novelty bonus)
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PriorityConfig {
    pub novelty_weight_domain: f64,
    pub novelty_weight_superdomain: f64,
    /// Lower values stay closer to pure breadth-first order
    pub novelty_scale: f64,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            novelty_weight_domain: 1.0,
            novelty_weight_superdomain: 0.3,
            novelty_scale: 0.001,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path of the TSV visit log
    pub log_path: String,

    /// Append timing and link-count columns to every record
    pub debug_metrics: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_path: "logs/run.tsv".to_string(),
            debug_metrics: false,
        }
    }
}
