//! Security collector: SSH login summary from the auth log, listening ports
//! from `ss -tlnp`, UFW / fail2ban status, and the sshd root-login policy.
//! Produces one `security_metrics` row plus the `port_scans` rows for the
//! same tick -- `ports_open` is kept equal to the `port_scans` row count by
//! construction, in one transaction.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;

use crate::collectors::{Collector, CollectorContext, CollectorOutcome, Tier};
use crate::common::now_secs;
use crate::parsers::{parse_auth_log, parse_fail2ban_status, parse_listening, parse_root_login_policy, parse_ufw_status};
use crate::runner;
use crate::store::{PortScan, SecurityMetric, SitrepCacheRow};

const TIMEOUT: Duration = Duration::from_secs(5);

/// Cache key holding the top-N failed-login IPs from the most recent tick,
/// as a JSON array of strings -- read by the glacial-tier attacker-nmap and
/// geolocation collectors, which have no time-series table of their own to
/// source candidate IPs from.
pub const FAILED_LOGIN_IPS_CACHE_KEY: &str = "security:failed_login_ips";
const TOP_FAILED_IPS: usize = 3;

pub struct SecurityCollector;

#[async_trait]
impl Collector for SecurityCollector {
    fn name(&self) -> &'static str {
        "security"
    }

    fn tier(&self) -> Tier {
        Tier::Slow
    }

    async fn run(&self, ctx: &CollectorContext) -> CollectorOutcome {
        let auth_log = runner::run(&["cat", "/var/log/auth.log"], TIMEOUT).await;
        let listening = runner::run(&["ss", "-tlnp"], TIMEOUT).await;
        let ufw = runner::run(&["ufw", "status"], TIMEOUT).await;
        let fail2ban = runner::run(&["systemctl", "is-active", "fail2ban"], TIMEOUT).await;
        let sshd_config = runner::run(&["cat", "/etc/ssh/sshd_config"], TIMEOUT).await;

        let (ssh_intrusions_24h, top_failed_ips) = if auth_log.outcome == runner::Outcome::Ok {
            let summary = parse_auth_log(&auth_log.stdout, Local::now());
            let total = summary.failed.iter().map(|(_, count, _)| *count).sum::<u32>();
            let top: Vec<String> = summary
                .failed
                .iter()
                .take(TOP_FAILED_IPS)
                .map(|(ip, _, _)| ip.clone())
                .collect();
            (total, top)
        } else {
            (0, Vec::new())
        };

        let ports = if listening.outcome == runner::Outcome::Ok {
            parse_listening(&listening.stdout)
        } else {
            Vec::new()
        };

        // UFW/fail2ban/root-login each degrade independently to "unknown
        // treated as inactive" rather than failing the whole tick -- a
        // missing `ufw` binary shouldn't blank out the rest of the panel.
        let ufw_active = ufw.outcome == runner::Outcome::Ok && parse_ufw_status(&ufw.stdout);
        let fail2ban_active =
            fail2ban.outcome == runner::Outcome::Ok && parse_fail2ban_status(&fail2ban.stdout);
        let root_login_enabled =
            sshd_config.outcome == runner::Outcome::Ok && parse_root_login_policy(&sshd_config.stdout);

        let timestamp = now_secs();
        let scans: Vec<PortScan> = ports
            .into_iter()
            .map(|p| PortScan {
                timestamp,
                port: p.port,
                service: p.service,
                state: p.state,
            })
            .collect();

        let metric = SecurityMetric {
            timestamp,
            ssh_intrusions_24h,
            ports_open: scans.len() as u32,
            ufw_active,
            fail2ban_active,
            root_login_enabled,
        };

        if let Err(e) = ctx.store.insert_port_scans(&scans) {
            return CollectorOutcome::Failed { error: e.to_string() };
        }
        if let Err(e) = ctx.store.insert_security_metric(&metric) {
            return CollectorOutcome::Failed { error: e.to_string() };
        }

        if !top_failed_ips.is_empty() {
            let payload = serde_json::json!(top_failed_ips).to_string();
            if let Err(e) = ctx.store.put_sitrep_cache(&SitrepCacheRow {
                key: FAILED_LOGIN_IPS_CACHE_KEY.to_string(),
                payload,
                cached_at: timestamp,
            }) {
                return CollectorOutcome::Failed { error: e.to_string() };
            }
        }

        CollectorOutcome::Ok
    }
}
