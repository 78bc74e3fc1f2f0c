//! Network collector: `ss -tnp` -> active connection count, unique peer IP
//! count (one `network_metrics` row), and the top-N peers queued for DNS
//! resolution via the single-flight DNS cache.

use std::time::Duration;

use async_trait::async_trait;

use crate::collectors::dns_geo::resolve_dns;
use crate::collectors::{Collector, CollectorContext, CollectorOutcome, Tier};
use crate::common::now_secs;
use crate::parsers::parse_connections;
use crate::runner;
use crate::store::NetworkMetric;

const TIMEOUT: Duration = Duration::from_secs(5);
const TOP_N: usize = 5;

pub struct NetworkCollector;

#[async_trait]
impl Collector for NetworkCollector {
    fn name(&self) -> &'static str {
        "network"
    }

    fn tier(&self) -> Tier {
        Tier::Medium
    }

    async fn run(&self, ctx: &CollectorContext) -> CollectorOutcome {
        let result = runner::run(&["ss", "-tnp"], TIMEOUT).await;
        if result.outcome != runner::Outcome::Ok {
            return CollectorOutcome::Degraded {
                reason: format!("ss -tnp: {:?}", result.outcome),
            };
        }

        let connections = parse_connections(&result.stdout);
        let active_connections: u32 = connections.iter().map(|(_, count)| count).sum();
        let unique_ips = connections.len() as u32;

        let metric = NetworkMetric {
            timestamp: now_secs(),
            active_connections,
            unique_ips,
        };
        if let Err(e) = ctx.store.insert_network_metric(&metric) {
            return CollectorOutcome::Failed { error: e.to_string() };
        }

        // Best-effort DNS resolution for the top peers; a failure here
        // degrades this tick but the connection counts above are already
        // durably written.
        for (ip, _count) in connections.iter().take(TOP_N) {
            if let Err(e) = resolve_dns(ctx, ip).await {
                return CollectorOutcome::Degraded {
                    reason: format!("dns resolve {ip}: {e}"),
                };
            }
        }

        CollectorOutcome::Ok
    }
}
