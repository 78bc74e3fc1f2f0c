//! Attacker nmap collector: a bounded port scan of the top-N failed-SSH
//! source IPs, cached with TTL in `attacker_scans`. The 10-second nmap
//! timeout and the process-wide `nmap_active` counter (so the Security
//! panel title can say "scanning...") both live here.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::cache;
use crate::collectors::security::FAILED_LOGIN_IPS_CACHE_KEY;
use crate::collectors::{Collector, CollectorContext, CollectorOutcome, Tier};
use crate::common::now_secs;
use crate::parsers::parse_nmap;
use crate::runner;
use crate::store::AttackerScanRow;

const NMAP_TIMEOUT: Duration = Duration::from_secs(10);

/// Reads the top-N failed-login IPs cached by the security collector.
/// Returns an empty list (not an error) if no security tick has run yet.
pub fn top_failed_login_ips(ctx: &CollectorContext, limit: usize) -> Result<Vec<String>> {
    let Some(row) = ctx.store.get_sitrep_cache(FAILED_LOGIN_IPS_CACHE_KEY)? else {
        return Ok(Vec::new());
    };
    let ips: Vec<String> = serde_json::from_str(&row.payload)?;
    Ok(ips.into_iter().take(limit).collect())
}

pub struct AttackerNmapCollector;

#[async_trait]
impl Collector for AttackerNmapCollector {
    fn name(&self) -> &'static str {
        "attacker_nmap"
    }

    fn tier(&self) -> Tier {
        Tier::Glacial
    }

    async fn run(&self, ctx: &CollectorContext) -> CollectorOutcome {
        let ips = match top_failed_login_ips(ctx, 3) {
            Ok(ips) => ips,
            Err(e) => return CollectorOutcome::Failed { error: e.to_string() },
        };

        if ips.is_empty() {
            return CollectorOutcome::Ok;
        }

        let mut failures = 0;
        for ip in &ips {
            if let Some(existing) = ctx.store.get_attacker_scan(ip).ok().flatten() {
                if now_secs() - existing.scanned_at <= cache::ATTACKER_SCAN_TTL_SECS {
                    continue;
                }
            }

            let _guard = ctx.nmap_active.guard();
            let result = runner::run(&["nmap", "-sT", "--top-ports", "20", ip], NMAP_TIMEOUT).await;
            if result.outcome != runner::Outcome::Ok {
                failures += 1;
                continue;
            }

            let parsed = parse_nmap(&result.stdout);
            let row = AttackerScanRow {
                ip: ip.clone(),
                open_ports: parsed
                    .open_ports
                    .iter()
                    .map(|(port, service)| format!("{port}/{service}"))
                    .collect::<Vec<_>>()
                    .join(","),
                os_guess: parsed.os_guess,
                scanned_at: now_secs(),
            };
            if let Err(e) = ctx.store.put_attacker_scan(&row) {
                return CollectorOutcome::Failed { error: e.to_string() };
            }
        }

        if failures == ips.len() {
            CollectorOutcome::Degraded {
                reason: "all nmap scans failed or timed out".into(),
            }
        } else {
            CollectorOutcome::Ok
        }
    }
}
