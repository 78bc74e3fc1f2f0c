//! Server health collector: `free -h`, `df -h`, `uptime` -> one
//! `server_metrics` row per tick.

use std::time::Duration;

use async_trait::async_trait;

use crate::collectors::{Collector, CollectorContext, CollectorOutcome, Tier};
use crate::common::now_secs;
use crate::parsers::{parse_df, parse_free, parse_uptime};
use crate::runner;
use crate::store::ServerMetric;

const TIMEOUT: Duration = Duration::from_secs(5);

pub struct ServerHealthCollector;

#[async_trait]
impl Collector for ServerHealthCollector {
    fn name(&self) -> &'static str {
        "server_health"
    }

    fn tier(&self) -> Tier {
        Tier::Fast
    }

    async fn run(&self, ctx: &CollectorContext) -> CollectorOutcome {
        let free = runner::run(&["free", "-h"], TIMEOUT).await;
        let df = runner::run(&["df", "-h"], TIMEOUT).await;
        let uptime = runner::run(&["uptime"], TIMEOUT).await;

        if free.outcome != runner::Outcome::Ok {
            return CollectorOutcome::Degraded {
                reason: format!("free: {:?}", free.outcome),
            };
        }
        if df.outcome != runner::Outcome::Ok {
            return CollectorOutcome::Degraded {
                reason: format!("df: {:?}", df.outcome),
            };
        }
        if uptime.outcome != runner::Outcome::Ok {
            return CollectorOutcome::Degraded {
                reason: format!("uptime: {:?}", uptime.outcome),
            };
        }

        let Some((mem_used_mb, mem_total_mb)) = parse_free(&free.stdout) else {
            return CollectorOutcome::Failed {
                error: "could not parse `free -h` output".into(),
            };
        };
        let Some((disk_used_gb, disk_total_gb)) = parse_df(&df.stdout) else {
            return CollectorOutcome::Failed {
                error: "could not parse `df -h` output".into(),
            };
        };
        let Some((load_1m, load_5m, load_15m)) = parse_uptime(&uptime.stdout) else {
            return CollectorOutcome::Failed {
                error: "could not parse `uptime` output".into(),
            };
        };

        let metric = ServerMetric {
            timestamp: now_secs(),
            cpu_percent: estimate_cpu_percent(load_1m),
            mem_used_mb,
            mem_total_mb,
            disk_used_gb,
            disk_total_gb,
            load_1m,
            load_5m,
            load_15m,
        };

        match ctx.store.insert_server_metric(&metric) {
            Ok(()) => CollectorOutcome::Ok,
            Err(e) => CollectorOutcome::Failed { error: e.to_string() },
        }
    }
}

/// `uptime` doesn't report instantaneous CPU usage directly; approximate it
/// from the 1-minute load average against an assumed single logical core
/// floor, clamped to 100%. Good enough for the dashboard's coloring
/// threshold, which only cares about "high" vs "normal".
fn estimate_cpu_percent(load_1m: f64) -> f64 {
    (load_1m * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_estimate_cpu_percent_clamped() {
        assert_eq!(estimate_cpu_percent(0.0), 0.0);
        assert_eq!(estimate_cpu_percent(2.0), 100.0);
        assert_eq!(estimate_cpu_percent(0.5), 50.0);
    }
}
