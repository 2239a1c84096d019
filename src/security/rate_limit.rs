//! Sliding-window rate limiting per client.
//!
//! Each [`RateLimiter`] owns a map from [`ClientKey`] to the timestamps of
//! that client's admitted requests, in arrival order. A single mutex guards
//! the whole map; admission checks and compaction serialize on it.
//!
//! # Admission
//! ```text
//! window_start = now - window
//! keep timestamps > window_start     (written back even on rejection)
//! kept >= limit  → reject, nothing appended
//! otherwise      → append now, admit
//! ```
//! The `limit`-th request inside a window is the last one admitted.
//! Rejected requests never consume a slot.
//!
//! # Compaction
//! A background task sweeps the whole map every [`COMPACTION_INTERVAL`] and
//! drops keys whose timestamps have all aged out. The task holds only a weak
//! reference: it ends when the limiter is dropped or [`RateLimiter::stop`] is
//! called. Without either, it lives as long as the runtime.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header::RETRY_AFTER, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;

use crate::http::response::ApiError;
use crate::observability::metrics;
use crate::security::client_ip::{client_key_of, ClientKey};
use crate::security::clock::{Clock, SystemClock};

/// Period of the background sweep.
pub const COMPACTION_INTERVAL: Duration = Duration::from_secs(60);

/// Fixed `Retry-After` hint sent with every rejection.
pub const RETRY_AFTER_SECS: u64 = 60;

/// Immutable limits of one limiter instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Maximum admitted requests per window.
    pub limit: usize,
    /// Length of the trailing window.
    pub window: Duration,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RateLimiterConfigError {
    #[error("rate limit must be positive")]
    ZeroLimit,
    #[error("rate limit window must be positive")]
    ZeroWindow,
}

impl RateLimiterConfig {
    pub fn new(limit: usize, window: Duration) -> Result<Self, RateLimiterConfigError> {
        if limit == 0 {
            return Err(RateLimiterConfigError::ZeroLimit);
        }
        if window.is_zero() {
            return Err(RateLimiterConfigError::ZeroWindow);
        }
        Ok(Self { limit, window })
    }
}

/// Per-client sliding-window limiter.
#[derive(Debug)]
pub struct RateLimiter {
    name: &'static str,
    config: RateLimiterConfig,
    requests: Mutex<HashMap<ClientKey, Vec<Instant>>>,
    clock: Arc<dyn Clock>,
    stop_tx: broadcast::Sender<()>,
}

impl RateLimiter {
    /// Create a limiter without a background sweep.
    pub fn new(name: &'static str, config: RateLimiterConfig, clock: Arc<dyn Clock>) -> Self {
        let (stop_tx, _) = broadcast::channel(1);
        Self {
            name,
            config,
            requests: Mutex::new(HashMap::new()),
            clock,
            stop_tx,
        }
    }

    /// Create a limiter on the system clock and start its compaction task.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn spawn(name: &'static str, config: RateLimiterConfig) -> Arc<Self> {
        let limiter = Arc::new(Self::new(name, config, Arc::new(SystemClock)));
        limiter.spawn_compaction(COMPACTION_INTERVAL);
        limiter
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn config(&self) -> RateLimiterConfig {
        self.config
    }

    /// Decide whether `key` may make one more request now.
    pub fn is_allowed(&self, key: &ClientKey) -> bool {
        let now = self.clock.now();
        let window_start = now.checked_sub(self.config.window);

        let mut requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        let timestamps = requests.entry(key.clone()).or_default();

        if let Some(start) = window_start {
            timestamps.retain(|t| *t > start);
        }

        if timestamps.len() >= self.config.limit {
            return false;
        }

        timestamps.push(now);
        true
    }

    /// Drop every timestamp older than the window and every key left empty.
    ///
    /// Returns the number of keys removed.
    pub fn compact(&self) -> usize {
        let now = self.clock.now();
        let window = self.config.window;

        let mut requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        let before = requests.len();
        requests.retain(|_, timestamps| {
            timestamps.retain(|t| now.saturating_duration_since(*t) <= window);
            !timestamps.is_empty()
        });
        let removed = before - requests.len();
        metrics::record_limiter_keys(self.name, requests.len());
        removed
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Start the periodic sweep on the current runtime.
    pub fn spawn_compaction(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        let mut stop_rx = self.stop_tx.subscribe();
        let name = self.name;

        tokio::spawn(async move {
            let mut ticker = time::interval(every);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let Some(limiter) = weak.upgrade() else {
                            break;
                        };
                        let removed = limiter.compact();
                        if removed > 0 {
                            tracing::debug!(limiter = name, removed, "Compacted rate limiter state");
                        }
                    }
                    _ = stop_rx.recv() => {
                        break;
                    }
                }
            }
            tracing::debug!(limiter = name, "Rate limiter compaction stopped");
        })
    }

    /// Stop the compaction task. Admission checks keep working.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(());
    }
}

/// Reject requests from clients over the limiter's quota.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = client_key_of(&request);

    if limiter.is_allowed(&key) {
        return next.run(request).await;
    }

    tracing::warn!(client = %key, limiter = limiter.name(), "Rate limit exceeded");
    metrics::record_rate_limited(limiter.name());

    let mut response = ApiError::rate_limited().into_response();
    response
        .headers_mut()
        .insert(RETRY_AFTER, HeaderValue::from(RETRY_AFTER_SECS));
    response
}
