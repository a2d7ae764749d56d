//! Cache entry bookkeeping

use crate::token::Token;
use chrono::Duration as Leeway;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Why an entry stopped being live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Expiry {
    /// Older than `max_age`
    Age,
    /// Not read for longer than `max_idle`
    Idle,
    /// The token's own claims are no longer valid
    Claims,
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Expiry::Age => "max age",
            Expiry::Idle => "max idle",
            Expiry::Claims => "claims",
        })
    }
}

/// Token with its insertion and access stamps
#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) token: Arc<Token>,
    pub(crate) inserted_at: Instant,
    pub(crate) last_accessed: Instant,
    // Insertion order, breaks ties between equal stamps.
    pub(crate) sequence: u64,
}

impl Entry {
    pub(crate) fn new(token: Arc<Token>, now: Instant, sequence: u64) -> Self {
        Self {
            token,
            inserted_at: now,
            last_accessed: now,
            sequence,
        }
    }

    pub(crate) fn touch(&mut self, now: Instant) {
        self.last_accessed = now;
    }

    /// First liveness rule this entry violates at `now`
    pub(crate) fn expiry(
        &self,
        now: Instant,
        max_age: Duration,
        max_idle: Duration,
    ) -> Option<Expiry> {
        if now.saturating_duration_since(self.inserted_at) > max_age {
            Some(Expiry::Age)
        } else if now.saturating_duration_since(self.last_accessed) > max_idle {
            Some(Expiry::Idle)
        } else if !self.token.is_valid(Leeway::zero()) {
            Some(Expiry::Claims)
        } else {
            None
        }
    }

    /// Capacity eviction order: least recently accessed, then oldest insertion
    pub(crate) fn eviction_rank(&self) -> (Instant, u64) {
        (self.last_accessed, self.sequence)
    }
}
