//! Cron collector: `openclaw cron list` -> one `cron_metrics` row per job
//! per tick.

use std::time::Duration;

use async_trait::async_trait;

use crate::collectors::{Collector, CollectorContext, CollectorOutcome, Tier};
use crate::common::now_secs;
use crate::parsers::{parse_cron, CronStatus};
use crate::runner;
use crate::store::CronMetric;

const TIMEOUT: Duration = Duration::from_secs(5);

pub struct CronCollector;

#[async_trait]
impl Collector for CronCollector {
    fn name(&self) -> &'static str {
        "cron"
    }

    fn tier(&self) -> Tier {
        Tier::Medium
    }

    async fn run(&self, ctx: &CollectorContext) -> CollectorOutcome {
        let result = runner::run(&["openclaw", "cron", "list"], TIMEOUT).await;
        if result.outcome != runner::Outcome::Ok {
            return CollectorOutcome::Degraded {
                reason: format!("openclaw cron list: {:?}", result.outcome),
            };
        }

        let records = parse_cron(&result.stdout);
        if records.is_empty() {
            return CollectorOutcome::Degraded {
                reason: "no cron records parsed".into(),
            };
        }

        let timestamp = now_secs();
        let rows: Vec<CronMetric> = records
            .into_iter()
            .map(|r| CronMetric {
                timestamp,
                job_name: r.job_name,
                status: status_str(r.status).to_string(),
                last_run: r.last_run,
                next_run: r.next_run,
                consecutive_errors: r.consecutive_errors,
            })
            .collect();

        match ctx.store.insert_cron_metrics(&rows) {
            Ok(()) => CollectorOutcome::Ok,
            Err(e) => CollectorOutcome::Failed { error: e.to_string() },
        }
    }
}

fn status_str(status: CronStatus) -> &'static str {
    match status {
        CronStatus::Ok => "ok",
        CronStatus::Error => "error",
        CronStatus::Running => "running",
        CronStatus::Idle => "idle",
    }
}
