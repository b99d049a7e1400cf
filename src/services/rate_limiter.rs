// src/services/rate_limiter.rs
use std::{
    collections::HashMap,
    fmt::Debug,
    net::IpAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::Mutex;

use super::clock::{Clock, SystemClock};
use crate::config::RateLimitConfig;

#[derive(Clone, Copy, Debug)]
struct Counter {
    count: u32,
    window_start: Instant,
}

#[derive(Debug, Default)]
struct Counters {
    by_client: HashMap<IpAddr, Counter>,
    last_purge: Option<Instant>,
}

impl Counters {
    fn purge(&mut self, now: Instant, window: Duration) -> usize {
        let before = self.by_client.len();
        self.by_client.retain(|_, c| now.duration_since(c.window_start) < window);
        self.last_purge = Some(now);
        before - self.by_client.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Admit { remaining: u32 },
    Reject,
}

impl Decision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Decision::Admit { .. })
    }
}

/// Fixed-window counter per client address.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<Counters>>,
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
}

impl Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .finish()
    }
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Counters::default())),
            config,
            clock,
        }
    }

    /// Count one request from `client` and decide whether it may proceed.
    pub async fn check(&self, client: IpAddr) -> Decision {
        let now = self.clock.now();
        let window = self.config.window;
        let mut guard = self.inner.lock().await;

        // A full table is swept at most once per window.
        let sweep_due = guard
            .last_purge
            .is_none_or(|at| now.duration_since(at) >= window);
        if sweep_due
            && !guard.by_client.contains_key(&client)
            && guard.by_client.len() >= self.config.max_tracked
        {
            guard.purge(now, window);
        }

        let counter = guard
            .by_client
            .entry(client)
            .or_insert(Counter { count: 0, window_start: now });
        if counter.count == 0 || now.duration_since(counter.window_start) >= window {
            *counter = Counter { count: 1, window_start: now };
        } else {
            counter.count = counter.count.saturating_add(1);
        }

        if counter.count <= self.config.max_requests {
            Decision::Admit { remaining: self.config.max_requests - counter.count }
        } else {
            Decision::Reject
        }
    }

    /// Drop counters whose window has elapsed. Returns number removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let window = self.config.window;
        self.inner.lock().await.purge(now, window)
    }

    /// Number of tracked clients
    pub async fn len(&self) -> usize {
        self.inner.lock().await.by_client.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
