//! Total parsers: each function here accepts arbitrary command output or log
//! text and returns a typed record, a sentinel default, or filters out
//! non-matching lines. None of them panic and none return `Result` -- a
//! parser's job is to make sense of whatever the outside world handed back,
//! not to reject it.

pub mod activity_log;
pub mod agents;
pub mod authlog;
pub mod cron;
pub mod dns;
pub mod nmap;
pub mod ps;
pub mod security;
pub mod server_health;
pub mod service_status;
pub mod size;
pub mod ss;

pub use activity_log::{parse_activity_log, split_errors_and_recent, LogEntry};
pub use agents::{parse_agents, AgentRecord};
pub use authlog::{parse_auth_log, AuthLogSummary};
pub use cron::{parse_cron, CronRecord, CronStatus};
pub use dns::parse_host_ptr;
pub use nmap::{parse_nmap, NmapResult};
pub use ps::{parse_top_processes, ProcessRecord};
pub use security::{parse_fail2ban_status, parse_root_login_policy, parse_ufw_status};
pub use server_health::{parse_df, parse_free, parse_uptime};
pub use service_status::{parse_service_status, ServiceStatus};
pub use size::parse_size;
pub use ss::{parse_connections, parse_listening, ListeningPort};
