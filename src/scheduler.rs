//! Scheduler / Daemon: four independent tier loops, each a bounded parallel
//! fan-out over its collectors, joined every tick before the next one is
//! scheduled -- so a tick that overruns its interval never runs
//! concurrently with itself.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use log::{error, info, warn};
use tokio::sync::watch;

use crate::collectors::{Collector, CollectorContext, CollectorOutcome, Tier};

/// A run of >= this many consecutive store-write failures (across all
/// tiers) transitions the daemon to a degraded state exposed via `status`.
const DEGRADED_WRITE_FAILURE_THRESHOLD: u32 = 10;
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Clone, Default)]
pub struct DaemonHealth {
    consecutive_write_failures: Arc<AtomicU32>,
}

impl DaemonHealth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_degraded(&self) -> bool {
        self.consecutive_write_failures.load(Ordering::SeqCst) >= DEGRADED_WRITE_FAILURE_THRESHOLD
    }

    fn record(&self, outcome: &CollectorOutcome) {
        match outcome {
            CollectorOutcome::Failed { .. } => {
                self.consecutive_write_failures.fetch_add(1, Ordering::SeqCst);
            }
            CollectorOutcome::Ok | CollectorOutcome::Degraded { .. } => {
                self.consecutive_write_failures.store(0, Ordering::SeqCst);
            }
        }
    }
}

pub struct Scheduler {
    ctx: CollectorContext,
    health: DaemonHealth,
    tiers: Vec<(Tier, Vec<Arc<dyn Collector>>)>,
}

impl Scheduler {
    pub fn new(ctx: CollectorContext, health: DaemonHealth) -> Self {
        let collectors: Vec<Arc<dyn Collector>> = vec![
            Arc::new(crate::collectors::server_health::ServerHealthCollector),
            Arc::new(crate::collectors::top_processes::TopProcessesCollector),
            Arc::new(crate::collectors::cron::CronCollector),
            Arc::new(crate::collectors::activity_log::ActivityLogCollector),
            Arc::new(crate::collectors::network::NetworkCollector),
            Arc::new(crate::collectors::agents::AgentsCollector),
            Arc::new(crate::collectors::platform_status::openclaw_status()),
            Arc::new(crate::collectors::platform_status::gateway_status()),
            Arc::new(crate::collectors::security::SecurityCollector),
            Arc::new(crate::collectors::sitrep::SitrepCollector),
            Arc::new(crate::collectors::dns_geo::DnsResolutionCollector),
            Arc::new(crate::collectors::dns_geo::GeolocationCollector),
            Arc::new(crate::collectors::attacker_nmap::AttackerNmapCollector),
        ];

        let mut tiers: Vec<(Tier, Vec<Arc<dyn Collector>>)> = vec![
            (Tier::Fast, Vec::new()),
            (Tier::Medium, Vec::new()),
            (Tier::Slow, Vec::new()),
            (Tier::Glacial, Vec::new()),
        ];
        for collector in collectors {
            let tier = collector.tier();
            if let Some((_, bucket)) = tiers.iter_mut().find(|(t, _)| *t == tier) {
                bucket.push(collector);
            }
        }

        Self { ctx, health, tiers }
    }

    /// Runs every collector across every tier exactly once, in parallel,
    /// and returns each one's outcome. Backs the `collect` CLI verb, which
    /// asks for one synchronous cycle rather than the daemon's tier loops.
    pub async fn run_once(&self) -> Vec<(&'static str, CollectorOutcome)> {
        let futures = self.tiers.iter().flat_map(|(_, collectors)| collectors.iter()).map(|c| {
            let ctx = self.ctx.clone();
            let c = c.clone();
            async move { (c.name(), c.run(&ctx).await) }
        });
        let results = join_all(futures).await;
        for (_, outcome) in &results {
            self.health.record(outcome);
        }
        results
    }

    /// Runs all tier loops until `shutdown` is signaled, then gives
    /// in-flight collectors up to 5 seconds to finish before returning.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut handles = Vec::new();
        for (tier, collectors) in self.tiers {
            let ctx = self.ctx.clone();
            let health = self.health.clone();
            let mut shutdown_rx = shutdown.clone();
            handles.push(tokio::spawn(async move {
                run_tier_loop(tier, collectors, ctx, health, &mut shutdown_rx).await;
            }));
        }

        let _ = shutdown.changed().await;
        info!("scheduler: shutdown signaled, waiting up to {:?} for in-flight ticks", SHUTDOWN_GRACE);

        let joined = join_all(handles);
        match tokio::time::timeout(SHUTDOWN_GRACE, joined).await {
            Ok(_) => info!("scheduler: all tiers stopped cleanly"),
            Err(_) => warn!("scheduler: grace period elapsed, some tiers may not have finished"),
        }
    }
}

async fn run_tier_loop(
    tier: Tier,
    collectors: Vec<Arc<dyn Collector>>,
    ctx: CollectorContext,
    health: DaemonHealth,
    shutdown: &mut watch::Receiver<bool>,
) {
    if collectors.is_empty() {
        return;
    }

    let mut interval = tokio::time::interval(tier.interval());
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
        if *shutdown.borrow() {
            break;
        }

        let futures = collectors.iter().map(|c| {
            let ctx = ctx.clone();
            let c = c.clone();
            async move { (c.name(), c.run(&ctx).await) }
        });

        for (name, outcome) in join_all(futures).await {
            health.record(&outcome);
            match &outcome {
                CollectorOutcome::Ok => {}
                CollectorOutcome::Degraded { reason } => {
                    warn!("collector {name} degraded: {reason}");
                }
                CollectorOutcome::Failed { error } => {
                    error!("collector {name} failed: {error}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_health_degrades_after_threshold_consecutive_failures() {
        let health = DaemonHealth::new();
        for _ in 0..DEGRADED_WRITE_FAILURE_THRESHOLD - 1 {
            health.record(&CollectorOutcome::Failed { error: "x".into() });
        }
        assert!(!health.is_degraded());
        health.record(&CollectorOutcome::Failed { error: "x".into() });
        assert!(health.is_degraded());
    }

    #[test]
    fn test_health_resets_on_ok() {
        let health = DaemonHealth::new();
        for _ in 0..DEGRADED_WRITE_FAILURE_THRESHOLD {
            health.record(&CollectorOutcome::Failed { error: "x".into() });
        }
        assert!(health.is_degraded());
        health.record(&CollectorOutcome::Ok);
        assert!(!health.is_degraded());
    }
}
