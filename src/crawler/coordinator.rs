//! Crawler coordinator - worker pool and per-URL processing
//!
//! This module contains the crawl loop that coordinates all aspects of the
//! crawling process, including:
//! - Seeding the frontier
//! - Running a fixed pool of workers over the shared frontier
//! - Robots checks, fetching, link extraction and child enqueueing
//! - Host failure accounting
//! - Emitting one visit record per fetched page
//! - Stopping at the page budget, on a stop request, or when work runs out
//! - Replacing workers that panic

use crate::config::{validate, Config};
use crate::crawler::fetcher::{build_http_client, FetchResult, Fetcher};
use crate::crawler::frontier::{Claim, Frontier, FrontierEntry, Reservation, HOST_FAILURE_LIMIT};
use crate::crawler::parser::{extractor_for, LinkExtractor};
use crate::output::{LogSink, PageMetrics, RunSummary, RunTotals, VisitRecord};
use crate::robots::RobotsCache;
use crate::url::{host_of, superdomain_of};
use crate::CrawlerError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// How long an idle worker waits on the frontier before rechecking exit conditions
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Pages between progress lines
const PROGRESS_INTERVAL: u64 = 50;

/// Cooperative stop flag shared by the coordinator and its workers
///
/// Workers finish the page they are on and exit once it is set.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Requests the crawl to stop
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once a stop has been requested
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Fetch outcomes that count against a host
fn is_host_failure(status: u16) -> bool {
    matches!(status, 0 | 401 | 403 | 417 | 429 | 500)
}

/// State shared by every worker
struct CrawlContext {
    config: Config,
    frontier: Frontier,
    robots: RobotsCache,
    fetcher: Fetcher,
    extractor: Arc<dyn LinkExtractor>,
    sink: Arc<dyn LogSink>,
    totals: RunTotals,
    stop: StopHandle,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    context: Arc<CrawlContext>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The run configuration
    /// * `sink` - Destination for visit records and the run summary
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CrawlerError)` - The configuration is invalid or the HTTP client
    ///   could not be built
    pub fn new(config: Config, sink: Arc<dyn LogSink>) -> Result<Self, CrawlerError> {
        let extractor = Arc::from(extractor_for(config.content.parser));
        Self::with_extractor(config, sink, extractor)
    }

    /// Creates a coordinator that uses `extractor` instead of the configured parser
    pub fn with_extractor(
        config: Config,
        sink: Arc<dyn LogSink>,
        extractor: Arc<dyn LinkExtractor>,
    ) -> Result<Self, CrawlerError> {
        validate(&config)?;
        let client = build_http_client(&config.crawler)?;

        let robots = RobotsCache::new(
            client.clone(),
            &config.crawler.user_agent,
            config.crawler.robots_cache_size,
        );
        let fetcher = Fetcher::new(client, &config.content);
        let frontier = Frontier::new(&config);

        Ok(Self {
            context: Arc::new(CrawlContext {
                config,
                frontier,
                robots,
                fetcher,
                extractor,
                sink,
                totals: RunTotals::new(),
                stop: StopHandle::default(),
            }),
        })
    }

    /// Enqueues seed URLs at depth 0
    ///
    /// # Returns
    ///
    /// The number of seeds the frontier accepted
    pub fn seed<S: AsRef<str>>(&self, seeds: &[S]) -> usize {
        seeds
            .iter()
            .filter(|seed| self.context.frontier.enqueue(seed.as_ref(), 0))
            .count()
    }

    /// Returns a handle that stops the crawl when triggered
    pub fn stop_handle(&self) -> StopHandle {
        self.context.stop.clone()
    }

    /// Returns the frontier
    pub fn frontier(&self) -> &Frontier {
        &self.context.frontier
    }

    /// Runs the crawl to completion
    ///
    /// Spawns the configured number of workers, waits for all of them to
    /// exit, then hands the run summary to the sink. A worker that panics is
    /// replaced unless the crawl is stopping.
    pub async fn run(self) -> Result<RunSummary, CrawlerError> {
        let threads = self.context.config.crawler.threads;
        tracing::info!(
            "Starting crawl with {} workers, {} URLs in frontier, parser: {}",
            threads,
            self.context.frontier.len(),
            self.context.extractor.name()
        );

        let mut workers = JoinSet::new();
        for id in 0..threads {
            workers.spawn(run_worker(Arc::clone(&self.context), id));
        }

        let mut next_id = threads;
        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                tracing::error!("Worker task failed: {}", e);
                if e.is_panic() && !self.context.stop.is_stopped() {
                    workers.spawn(run_worker(Arc::clone(&self.context), next_id));
                    next_id += 1;
                }
            }
        }

        let summary = self.context.totals.summary();
        self.context.sink.finish(&summary)?;

        tracing::info!(
            "Crawl complete: {} pages, {} bytes in {:.1}s ({:.2} pages/sec), {} not found, {} forbidden",
            summary.pages_crawled,
            summary.total_bytes,
            summary.elapsed_secs(),
            summary.pages_per_sec(),
            summary.not_found,
            summary.forbidden
        );

        Ok(summary)
    }
}

/// Worker loop: dequeue, process, repeat until there is nothing left to do
async fn run_worker(context: Arc<CrawlContext>, id: usize) {
    tracing::debug!("Worker {} started", id);
    let max_pages = context.config.crawler.max_pages;

    while !context.stop.is_stopped() {
        let Some(lease) = context.frontier.try_dequeue(POLL_INTERVAL).await else {
            if context.totals.pages_crawled() >= max_pages || context.frontier.is_drained() {
                break;
            }
            continue;
        };

        if context.stop.is_stopped() {
            break;
        }

        let claim = context.frontier.claim(&lease.entry().url);
        match claim {
            Claim::Granted(reservation) => context.process(lease.entry(), reservation).await,
            Claim::Visited => tracing::trace!("Skipping {}: already visited", lease.entry().url),
            Claim::BudgetFull => {
                // Pages in flight may still give their unit back
                context.frontier.requeue(lease);
                context.frontier.wait_for_budget(POLL_INTERVAL).await;
            }
        }
    }

    tracing::debug!("Worker {} exiting", id);
}

impl CrawlContext {
    /// Processes one claimed entry
    ///
    /// Every failure here is folded into the visit record; nothing propagates
    /// to the worker loop. The reservation is spent only once the page has
    /// been counted; returning early gives it back.
    async fn process(&self, entry: &FrontierEntry, reservation: Reservation<'_>) {
        let url = entry.url.as_str();

        if self.config.crawler.respect_robots && !self.robots.allowed(url).await {
            tracing::debug!("Skipping {}: disallowed by robots.txt", url);
            return;
        }

        let host = host_of(url);
        let superdomain = superdomain_of(&host);
        let (host_visits, superdomain_visits) = self.frontier.record_visit(&host, &superdomain);

        let mut response = self.fetcher.fetch(url).await;
        tracing::debug!("Fetched {} ({}, {} bytes)", url, response.status, response.content_length);

        self.totals.record_status(response.status);
        if is_host_failure(response.status) {
            let failures = self.frontier.record_failure(&host);
            if failures == HOST_FAILURE_LIMIT {
                tracing::info!("Backing off {} after {} failed fetches", host, failures);
            }
        }

        let mut metrics = PageMetrics {
            content_type: response.content_type.clone(),
            connect_ms: response.timing.connect_ms,
            read_ms: response.timing.read_ms,
            truncated: response.truncated,
            ..PageMetrics::default()
        };

        if self.should_follow_links(entry, &response) {
            let parse_started = Instant::now();
            let links = self.extract_links(std::mem::take(&mut response.body), url).await;

            metrics.links_found = links.len();
            for link in &links {
                if self.frontier.enqueue(link, entry.depth + 1) {
                    metrics.links_enqueued += 1;
                }
            }
            metrics.parse_ms = parse_started.elapsed().as_millis() as u64;
        }

        self.sink.emit(&VisitRecord {
            timestamp: chrono::Local::now(),
            url: url.to_string(),
            status: response.status,
            bytes: response.content_length,
            depth: entry.depth,
            priority: entry.priority,
            host,
            host_visits,
            superdomain,
            superdomain_visits,
            elapsed_ms: response.timing.elapsed_ms,
            metrics,
        });

        let pages = self.totals.record_page(response.content_length);
        reservation.commit();
        if pages >= self.config.crawler.max_pages {
            if !self.stop.is_stopped() {
                tracing::info!("Page budget of {} reached", self.config.crawler.max_pages);
            }
            self.stop.stop();
        }

        if pages % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                "Progress: {} pages crawled, {} in frontier, {:.2} pages/sec",
                pages,
                self.frontier.len(),
                self.totals.pages_per_sec()
            );
        }
    }

    /// Runs the extractor on the blocking pool
    ///
    /// A panicking extractor yields no links for the page.
    async fn extract_links(&self, body: Vec<u8>, url: &str) -> Vec<String> {
        let extractor = Arc::clone(&self.extractor);
        let base_url = url.to_string();

        match tokio::task::spawn_blocking(move || extractor.extract(&body, &base_url)).await {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!("Link extraction for {} failed: {}", url, e);
                Vec::new()
            }
        }
    }

    /// Links are followed only from complete-enough HTML pages above the depth limit
    fn should_follow_links(&self, entry: &FrontierEntry, response: &FetchResult) -> bool {
        response.status == 200
            && response.is_html(&self.config.content.html_mime_prefix)
            && entry.depth < self.config.crawler.max_depth
            && !response.body.is_empty()
    }
}
