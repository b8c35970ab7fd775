//! Pacing of outbound calls.
//!
//! A `Pacer` gates how often a stage may start its next unit of work.
//! `RatePacer` lets the first call through immediately and then admits one
//! call per period.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

/// Waits until the next unit of work may start.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn ready(&self);
}

/// Token-bucket pacer admitting one call per period.
pub struct RatePacer {
    limiter: DefaultDirectRateLimiter,
}

impl RatePacer {
    /// Create a pacer with the given period. Returns `None` for a zero period.
    pub fn new(period: Duration) -> Option<Self> {
        let quota = Quota::with_period(period)?.allow_burst(NonZeroU32::MIN);
        Some(Self {
            limiter: RateLimiter::direct(quota),
        })
    }
}

#[async_trait]
impl Pacer for RatePacer {
    async fn ready(&self) {
        self.limiter.until_ready().await;
    }
}

/// Pacer that never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unpaced;

#[async_trait]
impl Pacer for Unpaced {
    async fn ready(&self) {}
}

/// Pacer for a pause in milliseconds; zero disables pacing.
pub fn pacer_from_millis(pause_ms: u64) -> Arc<dyn Pacer> {
    match RatePacer::new(Duration::from_millis(pause_ms)) {
        Some(pacer) => Arc::new(pacer),
        None => Arc::new(Unpaced),
    }
}
