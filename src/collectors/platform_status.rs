//! OpenClaw and gateway status collectors. Neither has a dedicated
//! time-series table in the data model; both cache their result in
//! `sitrep_cache` under a synthetic per-channel key with the same 5-minute
//! TTL as the SITREP channel-health payload, since that is exactly what
//! they feed.

use std::time::Duration;

use async_trait::async_trait;

use crate::collectors::{Collector, CollectorContext, CollectorOutcome, Tier};
use crate::common::now_secs;
use crate::parsers::parse_service_status;
use crate::runner;
use crate::store::SitrepCacheRow;

const TIMEOUT: Duration = Duration::from_secs(5);

pub fn channel_cache_key(channel: &str) -> String {
    format!("channel:{channel}")
}

pub struct PlatformStatusCollector {
    pub channel: &'static str,
    pub argv: &'static [&'static str],
}

pub fn openclaw_status() -> PlatformStatusCollector {
    PlatformStatusCollector {
        channel: "openclaw",
        argv: &["openclaw", "status"],
    }
}

pub fn gateway_status() -> PlatformStatusCollector {
    PlatformStatusCollector {
        channel: "gateway",
        argv: &["openclaw", "gateway", "status"],
    }
}

#[async_trait]
impl Collector for PlatformStatusCollector {
    fn name(&self) -> &'static str {
        self.channel
    }

    fn tier(&self) -> Tier {
        Tier::Slow
    }

    async fn run(&self, ctx: &CollectorContext) -> CollectorOutcome {
        let result = runner::run(self.argv, TIMEOUT).await;
        if result.outcome != runner::Outcome::Ok {
            return CollectorOutcome::Degraded {
                reason: format!("{}: {:?}", self.channel, result.outcome),
            };
        }

        let status = parse_service_status(&result.stdout);
        let payload = serde_json::json!({
            "running": status.running,
            "detail": status.detail,
        })
        .to_string();

        let row = SitrepCacheRow {
            key: channel_cache_key(self.channel),
            payload,
            cached_at: now_secs(),
        };
        match ctx.store.put_sitrep_cache(&row) {
            Ok(()) => CollectorOutcome::Ok,
            Err(e) => CollectorOutcome::Failed { error: e.to_string() },
        }
    }
}
