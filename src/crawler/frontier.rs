//! Crawl frontier with priority-weighted breadth-first ordering
//!
//! This module handles:
//! - The priority queue of discovered-but-unprocessed URLs
//! - The visited set guaranteeing at-most-once processing per URL
//! - Per-host and per-superdomain visit counters feeding the priority formula
//! - Per-host failure tallies and the permanent backoff rule
//! - Page budget reservation and drain detection for the worker pool
//!
//! All of this state sits behind one lock so that related counters are always
//! read and written together.

use crate::config::{Config, PriorityConfig};
use crate::state::DomainStats;
use crate::url::{canonicalize, has_disallowed_extension, host_of, path_of, superdomain_of};
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashSet};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Number of failed fetches after which a host receives no new entries
pub const HOST_FAILURE_LIMIT: u32 = 5;

/// A URL waiting in the frontier
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    /// Lower values are dequeued first
    pub priority: f64,

    /// Link distance from the seeds
    pub depth: u32,

    /// Canonical URL
    pub url: String,

    /// Enqueue order, used as the final tie-breaker
    pub sequence: u64,
}

// BinaryHeap is a max-heap, so the comparison is reversed: the entry with the
// lowest (priority, depth, sequence) compares greatest.
impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.depth.cmp(&self.depth))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

/// Computes the priority of a URL discovered at `depth`
///
/// ```text
/// novelty  = w_domain / log2(2 + host_visits) + w_super / log2(2 + superdomain_visits)
/// priority = depth - novelty_scale * novelty
/// ```
///
/// Depth dominates, so the crawl stays breadth-first; the novelty term gives
/// less-visited hosts a small head start within a depth level.
pub fn priority_for(
    depth: u32,
    host_visits: u64,
    superdomain_visits: u64,
    weights: &PriorityConfig,
) -> f64 {
    let novelty = weights.novelty_weight_domain / (2.0 + host_visits as f64).log2()
        + weights.novelty_weight_superdomain / (2.0 + superdomain_visits as f64).log2();
    depth as f64 - weights.novelty_scale * novelty
}

#[derive(Debug, Default)]
struct FrontierState {
    queue: BinaryHeap<FrontierEntry>,
    visited: HashSet<String>,
    domains: DomainStats,
    next_sequence: u64,
    /// Entries handed out by `try_dequeue` whose lease is still alive
    in_flight: usize,
    /// Claimed pages, crawled or still being processed
    reserved: u64,
}

impl FrontierState {
    fn pop(&mut self) -> Option<FrontierEntry> {
        let entry = self.queue.pop()?;
        self.in_flight += 1;
        Some(entry)
    }
}

/// Thread-safe crawl frontier shared by all workers
pub struct Frontier {
    state: Mutex<FrontierState>,
    available: Notify,
    budget_released: Notify,
    disallowed_extensions: BTreeSet<String>,
    weights: PriorityConfig,
    max_pages: u64,
}

impl Frontier {
    /// Creates an empty frontier from the run configuration
    pub fn new(config: &Config) -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            available: Notify::new(),
            budget_released: Notify::new(),
            disallowed_extensions: config.content.disallowed_extensions.clone(),
            weights: config.priority.clone(),
            max_pages: config.crawler.max_pages,
        }
    }

    /// Adds a URL to the frontier
    ///
    /// The URL is canonicalized first and silently dropped if its path ends
    /// in a blacklisted extension, its host has reached the failure limit, or
    /// it has already been visited. Otherwise its priority is computed from
    /// the current host counters and fixed for as long as it waits.
    ///
    /// # Returns
    ///
    /// `true` if the URL was inserted
    pub fn enqueue(&self, url: &str, depth: u32) -> bool {
        let canonical = canonicalize(url);

        if has_disallowed_extension(&path_of(&canonical), &self.disallowed_extensions) {
            tracing::trace!("Skipping {}: disallowed extension", canonical);
            return false;
        }

        let host = host_of(&canonical);
        let superdomain = superdomain_of(&host);

        {
            let mut state = self.state.lock();

            if state.domains.host_failures(&host) >= HOST_FAILURE_LIMIT {
                tracing::trace!("Skipping {}: host {} is backed off", canonical, host);
                return false;
            }

            if state.visited.contains(&canonical) {
                return false;
            }

            let priority = priority_for(
                depth,
                state.domains.host_visits(&host),
                state.domains.superdomain_visits(&superdomain),
                &self.weights,
            );

            state.next_sequence += 1;
            let sequence = state.next_sequence;
            state.queue.push(FrontierEntry {
                priority,
                depth,
                url: canonical,
                sequence,
            });
        }

        self.available.notify_one();
        true
    }

    /// Removes the most urgent entry, waiting up to `timeout` for one
    ///
    /// The returned lease counts the entry as in flight until it is dropped,
    /// which keeps `is_drained` false while a worker may still enqueue the
    /// entry's children.
    pub async fn try_dequeue(&self, timeout: Duration) -> Option<Lease<'_>> {
        let deadline = Instant::now() + timeout;

        loop {
            let notified = self.available.notified();

            if let Some(entry) = self.state.lock().pop() {
                return Some(Lease {
                    frontier: self,
                    entry,
                });
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                let entry = self.state.lock().pop()?;
                return Some(Lease {
                    frontier: self,
                    entry,
                });
            }
        }
    }

    /// Claims a URL for processing
    ///
    /// Succeeds only if the URL has not been visited and the page budget
    /// still has room. On success the URL is marked visited and one unit of
    /// the budget is held by the returned [`Reservation`]. This is the single
    /// point that guarantees each canonical URL is processed at most once.
    pub fn claim(&self, url: &str) -> Claim<'_> {
        let mut state = self.state.lock();

        if state.visited.contains(url) {
            return Claim::Visited;
        }
        if state.reserved >= self.max_pages {
            return Claim::BudgetFull;
        }

        state.visited.insert(url.to_string());
        state.reserved += 1;
        Claim::Granted(Reservation {
            frontier: self,
            committed: false,
        })
    }

    /// Puts a leased entry back unchanged
    ///
    /// Used when the entry could not be claimed only because the budget is
    /// fully reserved. Priority and sequence are kept, so the entry is the
    /// first one handed out again.
    pub fn requeue(&self, lease: Lease<'_>) {
        self.state.lock().queue.push(lease.entry.clone());
        drop(lease);
    }

    /// Waits up to `timeout` for a reserved budget unit to be given back
    ///
    /// Returns immediately if the budget has room.
    pub async fn wait_for_budget(&self, timeout: Duration) {
        let released = self.budget_released.notified();
        if !self.budget_reserved() {
            return;
        }
        let _ = tokio::time::timeout(timeout, released).await;
    }

    fn release_budget(&self) {
        {
            let mut state = self.state.lock();
            state.reserved = state.reserved.saturating_sub(1);
        }
        self.budget_released.notify_waiters();
    }

    /// Records a visit to a host before it is fetched
    ///
    /// # Returns
    ///
    /// The updated `(host visits, superdomain visits)` pair
    pub fn record_visit(&self, host: &str, superdomain: &str) -> (u64, u64) {
        self.state.lock().domains.record_visit(host, superdomain)
    }

    /// Records a failed fetch and returns the host's new failure tally
    pub fn record_failure(&self, host: &str) -> u32 {
        self.state.lock().domains.record_failure(host)
    }

    /// Returns true if `host` no longer receives new entries
    pub fn is_backed_off(&self, host: &str) -> bool {
        self.state.lock().domains.host_failures(host) >= HOST_FAILURE_LIMIT
    }

    /// Returns the number of visits recorded for `host`
    pub fn host_visits(&self, host: &str) -> u64 {
        self.state.lock().domains.host_visits(host)
    }

    /// Returns true while every unit of the page budget is held by a claim
    pub fn budget_reserved(&self) -> bool {
        self.state.lock().reserved >= self.max_pages
    }

    /// Returns true when the queue is empty and no dequeued entry is still
    /// being processed, so no more work can appear
    pub fn is_drained(&self) -> bool {
        let state = self.state.lock();
        state.queue.is_empty() && state.in_flight == 0
    }

    /// Returns the number of queued entries
    pub fn len(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.state.lock().queue.is_empty()
    }

    /// Returns the number of URLs marked visited
    pub fn visited_count(&self) -> usize {
        self.state.lock().visited.len()
    }
}

/// A dequeued entry that counts as in flight until dropped
pub struct Lease<'a> {
    frontier: &'a Frontier,
    entry: FrontierEntry,
}

impl Lease<'_> {
    /// Returns the leased entry
    pub fn entry(&self) -> &FrontierEntry {
        &self.entry
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        let mut state = self.frontier.state.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

/// Outcome of [`Frontier::claim`]
pub enum Claim<'a> {
    /// The URL is now visited and holds one unit of the budget
    Granted(Reservation<'a>),
    /// The URL was already claimed
    Visited,
    /// Every unit of the budget is held; the URL is untouched
    BudgetFull,
}

impl Claim<'_> {
    pub fn is_granted(&self) -> bool {
        matches!(self, Claim::Granted(_))
    }
}

/// One unit of the page budget held by a claimed URL
///
/// Dropping the reservation gives the unit back, whether the page was skipped
/// or its worker unwound. `commit` keeps it once the page has been counted.
pub struct Reservation<'a> {
    frontier: &'a Frontier,
    committed: bool,
}

impl Reservation<'_> {
    /// Marks the unit as spent on a crawled page
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.frontier.release_budget();
        }
    }
}
