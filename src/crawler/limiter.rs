//! Politeness and concurrency limits
//!
//! - [`Pacer`] spaces successive events (article fetches in a topic, topic
//!   starts) by a fixed interval using a governor limiter.
//! - [`PacedFetcher`] wraps any [`Fetch`] so that every request through it,
//!   listing or article, first waits on one [`Pacer`].
//! - [`GatedFetcher`] wraps any [`Fetch`] so that every request holds a permit
//!   from one shared semaphore for its whole duration.

use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::crawler::fetcher::{Fetch, FetchedPage};
use crate::utils::error::FetchError;

/// Fixed-interval pacer; the first call passes immediately
pub struct Pacer {
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl Pacer {
    /// A zero interval disables pacing
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        let limiter = Quota::with_period(interval).map(RateLimiter::direct);
        Self { limiter }
    }

    /// A pacer that never waits
    #[must_use]
    pub fn unlimited() -> Self {
        Self { limiter: None }
    }

    /// Wait until the next event is allowed
    pub async fn wait(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }
}

/// Fetcher that caps in-flight requests across every topic
pub struct GatedFetcher {
    inner: Arc<dyn Fetch>,
    permits: Arc<Semaphore>,
}

impl GatedFetcher {
    pub fn new(inner: Arc<dyn Fetch>, max_concurrent_requests: usize) -> Self {
        Self {
            inner,
            permits: Arc::new(Semaphore::new(max_concurrent_requests)),
        }
    }

    /// Permits currently free
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}

#[async_trait]
impl Fetch for GatedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| FetchError::Network("request gate closed".to_string()))?;

        self.inner.fetch(url).await
    }
}

/// Fetcher that spaces its requests with a shared pacer
pub struct PacedFetcher {
    inner: Arc<dyn Fetch>,
    pacer: Arc<Pacer>,
}

impl PacedFetcher {
    pub fn new(inner: Arc<dyn Fetch>, pacer: Arc<Pacer>) -> Self {
        Self { inner, pacer }
    }
}

#[async_trait]
impl Fetch for PacedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        // Wait before taking a gate permit so idle waiting never holds one
        self.pacer.wait().await;
        self.inner.fetch(url).await
    }
}
