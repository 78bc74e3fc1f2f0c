//! Agents collector: `openclaw agents list` -> one `agent_metrics` row per
//! agent per tick.

use std::time::Duration;

use async_trait::async_trait;

use crate::collectors::{Collector, CollectorContext, CollectorOutcome, Tier};
use crate::common::now_secs;
use crate::parsers::parse_agents;
use crate::runner;
use crate::store::AgentMetric;

const TIMEOUT: Duration = Duration::from_secs(5);

pub struct AgentsCollector;

#[async_trait]
impl Collector for AgentsCollector {
    fn name(&self) -> &'static str {
        "agents"
    }

    fn tier(&self) -> Tier {
        Tier::Slow
    }

    async fn run(&self, ctx: &CollectorContext) -> CollectorOutcome {
        let result = runner::run(&["openclaw", "agents", "list"], TIMEOUT).await;
        match result.outcome {
            runner::Outcome::Missing | runner::Outcome::Timeout => {
                return CollectorOutcome::Degraded {
                    reason: format!("openclaw agents list: {:?}", result.outcome),
                };
            }
            runner::Outcome::Nonzero | runner::Outcome::IoError => {
                return CollectorOutcome::Degraded {
                    reason: format!("openclaw agents list: {:?}", result.outcome),
                };
            }
            runner::Outcome::Ok => {}
        }

        let records = parse_agents(&result.stdout);
        let timestamp = now_secs();
        let rows: Vec<AgentMetric> = records
            .into_iter()
            .map(|r| AgentMetric {
                timestamp,
                agent_name: r.name,
                model: r.model,
                tokens_used: r.tokens_used,
                sessions: r.sessions,
                storage_bytes: r.storage_bytes,
                is_default: r.is_default,
            })
            .collect();

        if rows.is_empty() {
            return CollectorOutcome::Degraded {
                reason: "no agent records parsed".into(),
            };
        }

        match ctx.store.insert_agent_metrics(&rows) {
            Ok(()) => CollectorOutcome::Ok,
            Err(e) => CollectorOutcome::Failed { error: e.to_string() },
        }
    }
}
