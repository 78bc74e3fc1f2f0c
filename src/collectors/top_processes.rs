//! Top processes collector: `ps aux --sort=-%cpu`, first 5 rows. Feeds the
//! Server Health panel's process sub-view; has no dedicated time-series
//! table in the data model, so it is cached under `sitrep_cache` the same
//! way platform status is -- a synthetic key, JSON payload, short TTL.

use std::time::Duration;

use async_trait::async_trait;

use crate::collectors::{Collector, CollectorContext, CollectorOutcome, Tier};
use crate::common::now_secs;
use crate::parsers::parse_top_processes;
use crate::runner;
use crate::store::SitrepCacheRow;

const TIMEOUT: Duration = Duration::from_secs(5);
const CACHE_KEY: &str = "panel:top_processes";

pub struct TopProcessesCollector;

#[async_trait]
impl Collector for TopProcessesCollector {
    fn name(&self) -> &'static str {
        "top_processes"
    }

    fn tier(&self) -> Tier {
        Tier::Fast
    }

    async fn run(&self, ctx: &CollectorContext) -> CollectorOutcome {
        let result = runner::run(&["ps", "aux", "--sort=-%cpu"], TIMEOUT).await;
        if result.outcome != runner::Outcome::Ok {
            return CollectorOutcome::Degraded {
                reason: format!("ps: {:?}", result.outcome),
            };
        }

        let processes = parse_top_processes(&result.stdout);
        let payload = match serde_json::to_string(&processes_as_json(&processes)) {
            Ok(p) => p,
            Err(e) => return CollectorOutcome::Failed { error: e.to_string() },
        };

        let row = SitrepCacheRow {
            key: CACHE_KEY.to_string(),
            payload,
            cached_at: now_secs(),
        };
        match ctx.store.put_sitrep_cache(&row) {
            Ok(()) => CollectorOutcome::Ok,
            Err(e) => CollectorOutcome::Failed { error: e.to_string() },
        }
    }
}

fn processes_as_json(processes: &[crate::parsers::ProcessRecord]) -> serde_json::Value {
    serde_json::json!(processes
        .iter()
        .map(|p| serde_json::json!({
            "user": p.user,
            "pid": p.pid,
            "cpu_percent": p.cpu_percent,
            "mem_percent": p.mem_percent,
            "command": p.command,
        }))
        .collect::<Vec<_>>())
}
