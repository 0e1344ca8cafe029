use std::collections::HashMap;

/// Counters kept for a single host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostCounters {
    /// Pages claimed for fetching on this host
    pub visits: u64,

    /// Fetches that ended in a retry-worthy failure
    pub failures: u32,
}

/// Per-host and per-superdomain counters for one crawl run
///
/// `DomainStats` is not synchronized itself; the frontier owns it behind the
/// same lock as the queue and visited set so that priority computation and
/// backoff decisions read a consistent snapshot. Entries are never removed
/// during a run.
#[derive(Debug, Default)]
pub struct DomainStats {
    hosts: HashMap<String, HostCounters>,
    superdomains: HashMap<String, u64>,
}

impl DomainStats {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a visit to a host and its superdomain
    ///
    /// # Returns
    ///
    /// The updated `(host visits, superdomain visits)` pair
    pub fn record_visit(&mut self, host: &str, superdomain: &str) -> (u64, u64) {
        let counters = self.hosts.entry(host.to_string()).or_default();
        counters.visits += 1;
        let host_visits = counters.visits;

        let super_visits = self.superdomains.entry(superdomain.to_string()).or_insert(0);
        *super_visits += 1;

        (host_visits, *super_visits)
    }

    /// Records a failed fetch for a host and returns the new failure tally
    pub fn record_failure(&mut self, host: &str) -> u32 {
        let counters = self.hosts.entry(host.to_string()).or_default();
        counters.failures += 1;
        counters.failures
    }

    /// Returns the counters for a host (zeroes if never seen)
    pub fn host(&self, host: &str) -> HostCounters {
        self.hosts.get(host).copied().unwrap_or_default()
    }

    /// Returns the number of visits recorded for a host
    pub fn host_visits(&self, host: &str) -> u64 {
        self.host(host).visits
    }

    /// Returns the number of failures recorded for a host
    pub fn host_failures(&self, host: &str) -> u32 {
        self.host(host).failures
    }

    /// Returns the number of visits recorded for a superdomain
    pub fn superdomain_visits(&self, superdomain: &str) -> u64 {
        self.superdomains.get(superdomain).copied().unwrap_or(0)
    }

    /// Returns the number of distinct hosts seen
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }
}
