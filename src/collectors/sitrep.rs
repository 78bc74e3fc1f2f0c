//! SITREP collector: update availability check and aggregated action items.
//! Channel health itself is populated by the OpenClaw/gateway platform
//! status collectors into `sitrep_cache` under `channel:<name>` keys; this
//! collector only owns the two SITREP-specific sub-payloads.

use std::time::Duration;

use async_trait::async_trait;

use crate::collectors::{Collector, CollectorContext, CollectorOutcome, Tier};
use crate::common::now_secs;
use crate::runner;
use crate::store::SitrepCacheRow;

const TIMEOUT: Duration = Duration::from_secs(5);

pub const UPDATE_CHECK_CACHE_KEY: &str = "sitrep:update_check";
pub const ACTION_ITEMS_CACHE_KEY: &str = "sitrep:action_items";

pub struct SitrepCollector;

#[async_trait]
impl Collector for SitrepCollector {
    fn name(&self) -> &'static str {
        "sitrep"
    }

    fn tier(&self) -> Tier {
        Tier::Slow
    }

    async fn run(&self, ctx: &CollectorContext) -> CollectorOutcome {
        let update_check = runner::run(&["openclaw", "update", "check"], TIMEOUT).await;
        let actions = runner::run(&["openclaw", "sitrep", "action-items"], TIMEOUT).await;

        let mut degraded_reasons = Vec::new();

        if update_check.outcome == runner::Outcome::Ok {
            let update_available = update_check.stdout.to_lowercase().contains("update available");
            let payload = serde_json::json!({ "update_available": update_available }).to_string();
            if let Err(e) = ctx.store.put_sitrep_cache(&SitrepCacheRow {
                key: UPDATE_CHECK_CACHE_KEY.to_string(),
                payload,
                cached_at: now_secs(),
            }) {
                return CollectorOutcome::Failed { error: e.to_string() };
            }
        } else {
            degraded_reasons.push(format!("update check: {:?}", update_check.outcome));
        }

        if actions.outcome == runner::Outcome::Ok {
            let items: Vec<&str> = actions.stdout.lines().filter(|l| !l.trim().is_empty()).collect();
            let payload = serde_json::json!({ "items": items }).to_string();
            if let Err(e) = ctx.store.put_sitrep_cache(&SitrepCacheRow {
                key: ACTION_ITEMS_CACHE_KEY.to_string(),
                payload,
                cached_at: now_secs(),
            }) {
                return CollectorOutcome::Failed { error: e.to_string() };
            }
        } else {
            degraded_reasons.push(format!("action items: {:?}", actions.outcome));
        }

        if degraded_reasons.is_empty() {
            CollectorOutcome::Ok
        } else {
            CollectorOutcome::Degraded {
                reason: degraded_reasons.join("; "),
            }
        }
    }
}
