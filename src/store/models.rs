//! Row types for the metrics store. Each mirrors one time-series table; the
//! Query Layer reads these back out, the Collectors build them.

#[derive(Debug, Clone, PartialEq)]
pub struct ServerMetric {
    pub timestamp: f64,
    pub cpu_percent: f64,
    pub mem_used_mb: f64,
    pub mem_total_mb: f64,
    pub disk_used_gb: f64,
    pub disk_total_gb: f64,
    pub load_1m: f64,
    pub load_5m: f64,
    pub load_15m: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentMetric {
    pub timestamp: f64,
    pub agent_name: String,
    pub model: String,
    pub tokens_used: u64,
    pub sessions: u64,
    pub storage_bytes: u64,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CronMetric {
    pub timestamp: f64,
    pub job_name: String,
    pub status: String,
    pub last_run: Option<f64>,
    pub next_run: Option<f64>,
    pub consecutive_errors: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SecurityMetric {
    pub timestamp: f64,
    pub ssh_intrusions_24h: u32,
    pub ports_open: u32,
    pub ufw_active: bool,
    pub fail2ban_active: bool,
    pub root_login_enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkMetric {
    pub timestamp: f64,
    pub active_connections: u32,
    pub unique_ips: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortScan {
    pub timestamp: f64,
    pub port: u16,
    pub service: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DnsCacheRow {
    pub ip: String,
    pub hostname: String,
    pub resolved_at: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoCacheRow {
    pub ip: String,
    pub country_code: Option<String>,
    pub city: Option<String>,
    pub isp: Option<String>,
    pub resolved_at: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttackerScanRow {
    pub ip: String,
    pub open_ports: String,
    pub os_guess: Option<String>,
    pub scanned_at: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitrepCacheRow {
    pub key: String,
    pub payload: String,
    pub cached_at: f64,
}
