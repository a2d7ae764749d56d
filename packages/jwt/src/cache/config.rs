//! Cache configuration

use std::time::Duration;

/// Bounds and timing of a [`Cache`](super::Cache)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Absolute time-to-live counted from insertion
    pub max_age: Duration,
    /// Sliding time-to-live counted from the last successful get
    pub max_idle: Duration,
    /// Period of the background eviction pass
    pub sweep_interval: Duration,
    /// Maximum number of entries kept
    pub max_entries: usize,
    /// How long a caller waits for the coordinator before giving up
    pub request_timeout: Duration,
    /// Number of requests that may queue for the coordinator
    pub mailbox_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(600),
            max_idle: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(60),
            max_entries: 1024,
            request_timeout: Duration::from_secs(5),
            mailbox_capacity: 64,
        }
    }
}

impl CacheConfig {
    /// Set the absolute time-to-live
    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Set the idle time-to-live
    #[must_use]
    pub fn with_max_idle(mut self, max_idle: Duration) -> Self {
        self.max_idle = max_idle;
        self
    }

    /// Set the sweep period
    #[must_use]
    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }

    /// Set the capacity bound
    #[must_use]
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Set the mailbox capacity
    #[must_use]
    pub fn with_mailbox_capacity(mut self, mailbox_capacity: usize) -> Self {
        self.mailbox_capacity = mailbox_capacity;
        self
    }

    /// Copy with out-of-range values raised to their minimum
    ///
    /// Capacity and mailbox become at least 1, the sweep period at least 1ms.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            sweep_interval: self.sweep_interval.max(Duration::from_millis(1)),
            max_entries: self.max_entries.max(1),
            mailbox_capacity: self.mailbox_capacity.max(1),
            ..self.clone()
        }
    }
}
