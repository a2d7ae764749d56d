//! Token cache
//!
//! [`Cache`] memoizes tokens by compact string. Entries expire after
//! `max_age` since insertion, after `max_idle` without a successful get, or
//! as soon as their claims stop being valid; the entry count never exceeds
//! `max_entries`. A stale entry reads exactly like a miss.
//!
//! All state lives on a single coordinator task. Handles talk to it through a
//! bounded mailbox and wait at most `request_timeout` for an answer; a
//! cancelled or overloaded coordinator surfaces as
//! [`JwtError::CacheActionTimeout`], never as a hang.

mod config;
mod coordinator;
mod entry;

pub use config::CacheConfig;

use crate::error::{JwtError, JwtResult};
use crate::token::Token;
use coordinator::{Coordinator, Request};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Handle to a running token cache
///
/// Cloning is cheap; all clones address the same coordinator.
#[derive(Debug, Clone)]
pub struct Cache {
    requests: mpsc::Sender<Request>,
    request_timeout: Duration,
}

impl Cache {
    /// Start a cache with the default request timeout and mailbox size
    ///
    /// The coordinator runs until `scope` is cancelled or the last handle is
    /// dropped.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn new(
        scope: CancellationToken,
        max_age: Duration,
        max_idle: Duration,
        sweep_interval: Duration,
        max_entries: usize,
    ) -> Self {
        let config = CacheConfig::default()
            .with_max_age(max_age)
            .with_max_idle(max_idle)
            .with_sweep_interval(sweep_interval)
            .with_max_entries(max_entries);
        Self::with_config(scope, config)
    }

    /// Start a cache from a full configuration
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn with_config(scope: CancellationToken, config: CacheConfig) -> Self {
        let config = config.normalized();
        let (tx, rx) = mpsc::channel(config.mailbox_capacity);
        let coordinator = Coordinator::new(&config);
        tokio::spawn(coordinator.run(scope, rx, config.sweep_interval));
        Self {
            requests: tx,
            request_timeout: config.request_timeout,
        }
    }

    /// Insert or replace `token` under its compact string
    ///
    /// Returns the number of entries after any capacity eviction.
    ///
    /// # Errors
    /// Returns [`JwtError::CacheActionTimeout`] if the coordinator does not
    /// answer in time.
    pub async fn put(&self, token: impl Into<Arc<Token>>) -> JwtResult<usize> {
        let token = token.into();
        self.request(|reply| Request::Put { token, reply }).await
    }

    /// Look up a live token by compact string
    ///
    /// `Ok(None)` covers both absent and stale entries.
    ///
    /// # Errors
    /// Returns [`JwtError::CacheActionTimeout`] if the coordinator does not
    /// answer in time.
    pub async fn get(&self, compact: &str) -> JwtResult<Option<Arc<Token>>> {
        let key = compact.to_string();
        self.request(|reply| Request::Get { key, reply }).await
    }

    /// Number of entries currently held, including not yet swept stale ones
    ///
    /// # Errors
    /// Returns [`JwtError::CacheActionTimeout`] if the coordinator does not
    /// answer in time.
    pub async fn len(&self) -> JwtResult<usize> {
        self.request(|reply| Request::Len { reply }).await
    }

    /// Whether the cache holds no entries
    ///
    /// # Errors
    /// See [`Cache::len`].
    pub async fn is_empty(&self) -> JwtResult<bool> {
        Ok(self.len().await? == 0)
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Request) -> JwtResult<T> {
        let (reply, response) = oneshot::channel();
        let exchange = async {
            self.requests
                .send(make(reply))
                .await
                .map_err(|_| JwtError::CacheActionTimeout)?;
            response.await.map_err(|_| JwtError::CacheActionTimeout)
        };
        tokio::time::timeout(self.request_timeout, exchange)
            .await
            .map_err(|_| JwtError::CacheActionTimeout)?
    }
}
