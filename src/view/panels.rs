//! Panel data objects: the Renderer Contract says the dashboard draws six
//! panels from data the Query Layer hands it, never computing metrics
//! itself. Each `*Panel` struct here is exactly that handoff shape.

use crate::query;
use crate::store::Store;

#[derive(Debug, Clone, PartialEq)]
pub struct AgentRow {
    pub name: String,
    pub is_default: bool,
    pub model: String,
    pub sessions: u64,
    pub tokens_used: u64,
    pub tokens_per_hour: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgentFleetPanel {
    pub agents: Vec<AgentRow>,
    pub total_sessions: u64,
    pub total_tokens: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerHealthPanel {
    pub cpu_percent: f64,
    pub mem_used_mb: f64,
    pub mem_total_mb: f64,
    pub disk_used_gb: f64,
    pub disk_total_gb: f64,
    pub load_1m: f64,
    pub load_5m: f64,
    pub load_15m: f64,
    pub cpu_sparkline: String,
    pub mem_sparkline: String,
    pub mem_role: Role,
}

/// Semantic display role, independent of theme: the palette maps this onto
/// actual colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Normal,
    Warning,
    Error,
    Dim,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CronJobRow {
    pub job_name: String,
    pub status: String,
    pub consecutive_errors: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CronJobsPanel {
    pub jobs: Vec<CronJobRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortScanRow {
    pub port: u16,
    pub service: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SecurityPanel {
    pub ssh_intrusions_24h: u32,
    pub ports_open: u32,
    pub ufw_active: bool,
    pub fail2ban_active: bool,
    pub root_login_enabled: bool,
    pub listening_ports: Vec<PortScanRow>,
    pub nmap_scanning: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub timestamp: f64,
    pub level: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActivityLogPanel {
    pub errors: Vec<LogRow>,
    pub recent: Vec<LogRow>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SitrepPanel {
    pub openclaw_running: bool,
    pub gateway_running: bool,
    pub update_available: bool,
    pub action_items: Vec<String>,
}

/// Surfaced when the store itself is unreadable; a prominent, dismissable
/// banner rather than a crash (Error Handling Design category 5).
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBanner {
    pub message: String,
}

const NA: &str = "N/A";

pub fn build_agent_fleet_panel(store: &Store) -> anyhow::Result<AgentFleetPanel> {
    let latest = store.latest_agent_metrics()?;
    let mut agents = Vec::with_capacity(latest.len());
    let mut total_sessions = 0;
    let mut total_tokens = 0;

    for row in &latest {
        total_sessions += row.sessions;
        total_tokens += row.tokens_used;
        let rate = query::tokens_per_hour(store, &row.agent_name, 3600.0)?;
        agents.push(AgentRow {
            name: row.agent_name.clone(),
            is_default: row.is_default,
            model: row.model.clone(),
            sessions: row.sessions,
            tokens_used: row.tokens_used,
            tokens_per_hour: rate,
        });
    }

    Ok(AgentFleetPanel {
        agents,
        total_sessions,
        total_tokens,
    })
}

pub fn build_server_health_panel(store: &Store) -> anyhow::Result<Option<ServerHealthPanel>> {
    let recent = query::recent_server_metrics(store, 1.0, 60)?;
    let Some(latest) = recent.first() else {
        return Ok(None);
    };

    let cpu_values: Vec<f64> = recent.iter().rev().map(|r| r.cpu_percent).collect();
    let mem_values: Vec<f64> = recent
        .iter()
        .rev()
        .map(|r| 100.0 * r.mem_used_mb / r.mem_total_mb.max(1.0))
        .collect();

    let mem_percent = 100.0 * latest.mem_used_mb / latest.mem_total_mb.max(1.0);
    let mem_role = if mem_percent > 90.0 {
        Role::Error
    } else if mem_percent > 75.0 {
        Role::Warning
    } else {
        Role::Normal
    };

    Ok(Some(ServerHealthPanel {
        cpu_percent: latest.cpu_percent,
        mem_used_mb: latest.mem_used_mb,
        mem_total_mb: latest.mem_total_mb,
        disk_used_gb: latest.disk_used_gb,
        disk_total_gb: latest.disk_total_gb,
        load_1m: latest.load_1m,
        load_5m: latest.load_5m,
        load_15m: latest.load_15m,
        cpu_sparkline: query::sparkline(&cpu_values, 30),
        mem_sparkline: query::sparkline(&mem_values, 30),
        mem_role,
    }))
}

pub fn build_cron_jobs_panel(store: &Store) -> anyhow::Result<CronJobsPanel> {
    let since = crate::common::now_secs() - 24.0 * 3600.0;
    let rows = store.recent_cron_metrics(since)?;

    let mut latest_by_job: std::collections::HashMap<String, CronJobRow> = std::collections::HashMap::new();
    for row in rows {
        latest_by_job.insert(
            row.job_name.clone(),
            CronJobRow {
                job_name: row.job_name,
                status: row.status,
                consecutive_errors: row.consecutive_errors,
            },
        );
    }

    let mut jobs: Vec<CronJobRow> = latest_by_job.into_values().collect();
    jobs.sort_by(|a, b| a.job_name.cmp(&b.job_name));
    Ok(CronJobsPanel { jobs })
}

pub fn build_security_panel(store: &Store, nmap_active: u32) -> anyhow::Result<SecurityPanel> {
    let Some(latest) = store.latest_security_metric()? else {
        return Ok(SecurityPanel {
            nmap_scanning: nmap_active > 0,
            ..Default::default()
        });
    };

    let ports = store.port_scans_at(latest.timestamp)?;
    let listening_ports = ports
        .into_iter()
        .map(|p| PortScanRow {
            port: p.port,
            service: p.service,
            state: p.state,
        })
        .collect();

    Ok(SecurityPanel {
        ssh_intrusions_24h: latest.ssh_intrusions_24h,
        ports_open: latest.ports_open,
        ufw_active: latest.ufw_active,
        fail2ban_active: latest.fail2ban_active,
        root_login_enabled: latest.root_login_enabled,
        listening_ports,
        nmap_scanning: nmap_active > 0,
    })
}

pub fn build_activity_log_panel(store: &Store) -> anyhow::Result<ActivityLogPanel> {
    let Some(row) = store.get_sitrep_cache(crate::collectors::activity_log::CACHE_KEY)? else {
        return Ok(ActivityLogPanel::default());
    };

    let parsed: serde_json::Value = serde_json::from_str(&row.payload)?;
    let to_rows = |value: &serde_json::Value| -> Vec<LogRow> {
        value
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| {
                        Some(LogRow {
                            timestamp: v.get("timestamp")?.as_f64()?,
                            level: v.get("level")?.as_str()?.to_string(),
                            message: v.get("message")?.as_str()?.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    };

    Ok(ActivityLogPanel {
        errors: to_rows(parsed.get("errors").unwrap_or(&serde_json::Value::Null)),
        recent: to_rows(parsed.get("recent").unwrap_or(&serde_json::Value::Null)),
    })
}

pub fn build_sitrep_panel(store: &Store) -> anyhow::Result<SitrepPanel> {
    let channel_running = |channel: &str| -> anyhow::Result<bool> {
        let key = crate::collectors::platform_status::channel_cache_key(channel);
        Ok(store
            .get_sitrep_cache(&key)?
            .and_then(|row| serde_json::from_str::<serde_json::Value>(&row.payload).ok())
            .and_then(|v| v.get("running").and_then(|b| b.as_bool()))
            .unwrap_or(false))
    };

    let update_available = store
        .get_sitrep_cache(crate::collectors::sitrep::UPDATE_CHECK_CACHE_KEY)?
        .and_then(|row| serde_json::from_str::<serde_json::Value>(&row.payload).ok())
        .and_then(|v| v.get("update_available").and_then(|b| b.as_bool()))
        .unwrap_or(false);

    let action_items = store
        .get_sitrep_cache(crate::collectors::sitrep::ACTION_ITEMS_CACHE_KEY)?
        .and_then(|row| serde_json::from_str::<serde_json::Value>(&row.payload).ok())
        .and_then(|v| v.get("items").and_then(|a| a.as_array()).cloned())
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();

    Ok(SitrepPanel {
        openclaw_running: channel_running("openclaw")?,
        gateway_running: channel_running("gateway")?,
        update_available,
        action_items,
    })
}

/// Formats a token count the way the Agent Fleet panel totals line does:
/// `359000 -> "359k"`. Values under 1000 are shown bare.
pub fn format_tokens(tokens: u64) -> String {
    if tokens >= 1000 {
        format!("{}k", tokens / 1000)
    } else {
        tokens.to_string()
    }
}

pub fn format_rate_or_dash(rate: Option<f64>) -> String {
    match rate {
        Some(r) => format!("{:.0}/hr", r),
        None => NA.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scenario_agent_listing_totals() {
        assert_eq!(format_tokens(126000 + 65000 + 168000), "359k");
    }

    #[test]
    fn test_format_rate_dash_on_none() {
        assert_eq!(format_rate_or_dash(None), "N/A");
    }
}
