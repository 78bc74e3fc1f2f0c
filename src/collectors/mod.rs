//! Collectors: one module per external data source. Each combines the
//! Command Runner, a Parser, and (where relevant) a Cache write into a
//! single tick's worth of work.
//!
//! Modeled as a small capability -- `{ name, tier, run(ctx) }` -- rather
//! than introspected at runtime, per the dynamic-dispatch design note:
//! the Scheduler holds a `Vec<Box<dyn Collector>>` per tier and calls
//! `run` on each without needing to know the concrete type.

pub mod activity_log;
pub mod agents;
pub mod attacker_nmap;
pub mod cron;
pub mod dns_geo;
pub mod network;
pub mod platform_status;
pub mod security;
pub mod server_health;
pub mod sitrep;
pub mod top_processes;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex as AsyncMutex;

use crate::cache::SingleFlight;
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Fast,
    Medium,
    Slow,
    Glacial,
}

impl Tier {
    pub fn interval(self) -> Duration {
        match self {
            Tier::Fast => Duration::from_secs(30),
            Tier::Medium => Duration::from_secs(2 * 60),
            Tier::Slow => Duration::from_secs(5 * 60),
            Tier::Glacial => Duration::from_secs(15 * 60),
        }
    }
}

/// Result of one collector invocation. `Ok` means a row was written (or, for
/// cache-only collectors, the cache was refreshed). `Degraded` means the
/// prior value is retained and the UI should show it annotated with its
/// age. `Failed` means a parser crash -- nothing is written and the error is
/// logged.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectorOutcome {
    Ok,
    Degraded { reason: String },
    Failed { error: String },
}

impl CollectorOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, CollectorOutcome::Ok)
    }
}

/// Process-wide counter of in-flight attacker-nmap scans. A counter rather
/// than a bool so overlapping scans (two different IPs queued in the same
/// glacial tick) are tracked correctly; the Renderer shows the Security
/// panel as "scanning" whenever this is nonzero.
#[derive(Clone, Default)]
pub struct NmapActive(Arc<AtomicU32>);

impl NmapActive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn guard(&self) -> NmapActiveGuard<'_> {
        self.0.fetch_add(1, Ordering::SeqCst);
        NmapActiveGuard(&self.0)
    }
}

pub struct NmapActiveGuard<'a>(&'a AtomicU32);

impl Drop for NmapActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Global throttle for the geolocation HTTP API: at most one request per
/// second across all collectors, since the free endpoint enforces this
/// server-side and a burst would just get every caller rate-limited.
#[derive(Clone)]
pub struct GeoRateLimiter(Arc<AsyncMutex<Option<Instant>>>);

impl Default for GeoRateLimiter {
    fn default() -> Self {
        Self(Arc::new(AsyncMutex::new(None)))
    }
}

impl GeoRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn wait(&self) {
        let mut last = self.0.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            let min_interval = Duration::from_secs(1);
            if elapsed < min_interval {
                tokio::time::sleep(min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Shared state every collector may need: the store to write into, the
/// single-flight registry for DNS/geo lookups, an HTTP client, and the
/// nmap-active counter. Cloned cheaply (everything inside is `Arc`-backed)
/// into each tier task.
#[derive(Clone)]
pub struct CollectorContext {
    pub store: Arc<Store>,
    pub single_flight: SingleFlight,
    pub http: reqwest::Client,
    pub nmap_active: NmapActive,
    pub geo_rate_limiter: GeoRateLimiter,
}

#[async_trait]
pub trait Collector: Send + Sync {
    fn name(&self) -> &'static str;
    fn tier(&self) -> Tier;
    async fn run(&self, ctx: &CollectorContext) -> CollectorOutcome;
}
