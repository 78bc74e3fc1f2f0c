//! Activity log collector: recent OpenClaw logs, SSH events, cron
//! completions, and system events, split into `errors` and `recent`
//! streams. Cached in `sitrep_cache` since the split log stream has no
//! dedicated time-series table -- it is already a derived view over events
//! that are themselves sourced from the other per-tick tables.

use std::time::Duration;

use async_trait::async_trait;

use crate::collectors::{Collector, CollectorContext, CollectorOutcome, Tier};
use crate::common::now_secs;
use crate::parsers::{parse_activity_log, split_errors_and_recent};
use crate::runner;
use crate::store::SitrepCacheRow;

const TIMEOUT: Duration = Duration::from_secs(5);
pub const CACHE_KEY: &str = "panel:activity_log";
const RECENT_LIMIT: usize = 50;

pub struct ActivityLogCollector;

#[async_trait]
impl Collector for ActivityLogCollector {
    fn name(&self) -> &'static str {
        "activity_log"
    }

    fn tier(&self) -> Tier {
        Tier::Medium
    }

    async fn run(&self, ctx: &CollectorContext) -> CollectorOutcome {
        let result = runner::run(&["openclaw", "logs", "--limit", "200"], TIMEOUT).await;
        if result.outcome != runner::Outcome::Ok {
            return CollectorOutcome::Degraded {
                reason: format!("openclaw logs: {:?}", result.outcome),
            };
        }

        let entries = parse_activity_log(&result.stdout);
        let (errors, recent) = split_errors_and_recent(entries);

        let payload = serde_json::json!({
            "errors": errors.iter().map(entry_json).collect::<Vec<_>>(),
            "recent": recent.iter().take(RECENT_LIMIT).map(entry_json).collect::<Vec<_>>(),
        })
        .to_string();

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

fn entry_json(e: &crate::parsers::LogEntry) -> serde_json::Value {
    serde_json::json!({
        "timestamp": e.timestamp,
        "level": e.level,
        "message": e.message,
    })
}
