//! Robots.txt caching implementation
//!
//! Each host's policy is fetched on first query and kept for the rest of the
//! run. Concurrent first queries for one host share a single fetch. The cache
//! holds at most `max_entries` hosts; inserting past that bound evicts one
//! arbitrary existing entry (whichever the map yields first, not the least
//! recently used). An evicted host is simply fetched again if queried later.

use crate::robots::{fetch_robots, robots_agent, ParsedRobots};
use crate::url::host_of;
use parking_lot::Mutex;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

type RobotsSlot = Arc<OnceCell<ParsedRobots>>;

/// Per-host robots.txt policy cache
pub struct RobotsCache {
    client: Client,
    agent: String,
    max_entries: usize,
    entries: Mutex<HashMap<String, RobotsSlot>>,
}

impl RobotsCache {
    /// Creates a new cache
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for robots.txt fetches
    /// * `user_agent` - Full User-Agent string; its product token is matched
    /// * `max_entries` - Maximum number of cached hosts (at least 1)
    pub fn new(client: Client, user_agent: &str, max_entries: usize) -> Self {
        Self {
            client,
            agent: robots_agent(user_agent),
            max_entries: max_entries.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Checks whether the crawler may fetch `url`
    ///
    /// URLs without a parseable host are always denied. A host whose
    /// robots.txt cannot be retrieved is cached as allow-all.
    pub async fn allowed(&self, url: &str) -> bool {
        let host = host_of(url);
        if host.is_empty() {
            return false;
        }

        let slot = self.slot_for(&host);
        let robots = slot
            .get_or_init(|| async {
                match fetch_robots(&self.client, url).await {
                    Ok(robots) => {
                        tracing::debug!("Fetched robots.txt for {}", host);
                        robots
                    }
                    Err(e) => {
                        tracing::debug!("robots.txt unavailable for {} ({}), allowing all", host, e);
                        ParsedRobots::allow_all()
                    }
                }
            })
            .await;

        robots.is_allowed(url, &self.agent)
    }

    /// Returns the number of cached hosts
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if no host is cached
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Returns true if a policy slot exists for `host`
    pub fn contains(&self, host: &str) -> bool {
        self.entries.lock().contains_key(host)
    }

    /// Returns the cache slot for a host, inserting an empty one if needed
    fn slot_for(&self, host: &str) -> RobotsSlot {
        let mut entries = self.entries.lock();

        if let Some(slot) = entries.get(host) {
            return Arc::clone(slot);
        }

        if entries.len() >= self.max_entries {
            if let Some(victim) = entries.keys().next().cloned() {
                tracing::trace!("Evicting robots.txt cache entry for {}", victim);
                entries.remove(&victim);
            }
        }

        let slot = RobotsSlot::default();
        entries.insert(host.to_string(), Arc::clone(&slot));
        slot
    }
}
