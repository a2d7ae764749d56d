//! The task owning the entry map
//!
//! Every request and every sweep runs on this task, one at a time, so the
//! map needs no lock. The loop ends when the governing scope is cancelled or
//! every handle is gone; dropping the mailbox then fails all queued and
//! future requests on the caller side.

use super::config::CacheConfig;
use super::entry::{Entry, Expiry};
use crate::token::Token;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

/// Message accepted by the coordinator
#[derive(Debug)]
pub(crate) enum Request {
    Put {
        token: Arc<Token>,
        reply: oneshot::Sender<usize>,
    },
    Get {
        key: String,
        reply: oneshot::Sender<Option<Arc<Token>>>,
    },
    Len {
        reply: oneshot::Sender<usize>,
    },
}

pub(crate) struct Coordinator {
    entries: HashMap<String, Entry>,
    max_age: Duration,
    max_idle: Duration,
    max_entries: usize,
    next_sequence: u64,
}

impl Coordinator {
    pub(crate) fn new(config: &CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            max_age: config.max_age,
            max_idle: config.max_idle,
            max_entries: config.max_entries,
            next_sequence: 0,
        }
    }

    pub(crate) async fn run(
        mut self,
        scope: CancellationToken,
        mut requests: mpsc::Receiver<Request>,
        sweep_interval: Duration,
    ) {
        let mut sweep = tokio::time::interval_at(Instant::now() + sweep_interval, sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            max_entries = self.max_entries,
            ?sweep_interval,
            "Token cache coordinator started"
        );

        loop {
            tokio::select! {
                biased;
                () = scope.cancelled() => break,
                _ = sweep.tick() => self.sweep(Instant::now()),
                request = requests.recv() => match request {
                    Some(request) => self.handle(request, Instant::now()),
                    None => break,
                },
            }
        }

        requests.close();
        info!(remaining = self.entries.len(), "Token cache coordinator stopped");
    }

    fn handle(&mut self, request: Request, now: Instant) {
        // A caller that gave up has dropped its receiver; nothing to report.
        match request {
            Request::Put { token, reply } => {
                let _ = reply.send(self.put(token, now));
            }
            Request::Get { key, reply } => {
                let _ = reply.send(self.get(&key, now));
            }
            Request::Len { reply } => {
                let _ = reply.send(self.entries.len());
            }
        }
    }

    pub(crate) fn put(&mut self, token: Arc<Token>, now: Instant) -> usize {
        let key = token.as_str().to_string();
        trace!(size = self.entries.len(), "Cache put");
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.insert(key, Entry::new(token, now, sequence));
        self.enforce_capacity();
        self.entries.len()
    }

    pub(crate) fn get(&mut self, key: &str, now: Instant) -> Option<Arc<Token>> {
        let entry = self.entries.get_mut(key)?;
        if let Some(reason) = entry.expiry(now, self.max_age, self.max_idle) {
            self.entries.remove(key);
            debug!(
                evicted = 1,
                remaining = self.entries.len(),
                %reason,
                "Evicted stale token on get"
            );
            return None;
        }
        entry.touch(now);
        trace!("Cache hit");
        Some(Arc::clone(&entry.token))
    }

    pub(crate) fn sweep(&mut self, now: Instant) {
        let (max_age, max_idle) = (self.max_age, self.max_idle);
        let before = self.entries.len();
        let mut reasons: Vec<Expiry> = Vec::new();
        self.entries.retain(|_, entry| match entry.expiry(now, max_age, max_idle) {
            Some(reason) => {
                reasons.push(reason);
                false
            }
            None => true,
        });
        if !reasons.is_empty() {
            debug!(
                evicted = before - self.entries.len(),
                remaining = self.entries.len(),
                reason = "sweep",
                age = reasons.iter().filter(|r| **r == Expiry::Age).count(),
                idle = reasons.iter().filter(|r| **r == Expiry::Idle).count(),
                claims = reasons.iter().filter(|r| **r == Expiry::Claims).count(),
                "Background sweep evicted stale tokens"
            );
        }
        self.enforce_capacity();
    }

    fn enforce_capacity(&mut self) {
        let overflow = self.entries.len().saturating_sub(self.max_entries);
        if overflow == 0 {
            return;
        }
        let mut ranked: Vec<(Instant, u64, String)> = self
            .entries
            .iter()
            .map(|(key, entry)| {
                let (accessed, sequence) = entry.eviction_rank();
                (accessed, sequence, key.clone())
            })
            .collect();
        ranked.sort_unstable();
        for (_, _, key) in ranked.into_iter().take(overflow) {
            self.entries.remove(&key);
        }
        debug!(
            evicted = overflow,
            remaining = self.entries.len(),
            reason = "capacity",
            "Evicted least recently accessed tokens"
        );
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
