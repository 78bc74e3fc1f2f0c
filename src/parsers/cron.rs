//! Parser for `openclaw cron list` output. One line per job:
//!
//! ```text
//! backup-db       status=ok       last_run=1700000000  next_run=1700003600  errors=0
//! sync-gateway    status=error    last_run=1700000100  next_run=1700003700  errors=3
//! ```
//!
//! Any unrecognized `status` value maps to `Idle` rather than rejecting the
//! row -- an unknown status is still a status.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CronStatus {
    Ok,
    Error,
    Running,
    Idle,
}

impl CronStatus {
    fn from_str(s: &str) -> CronStatus {
        match s {
            "ok" => CronStatus::Ok,
            "error" => CronStatus::Error,
            "running" => CronStatus::Running,
            _ => CronStatus::Idle,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CronRecord {
    pub job_name: String,
    pub status: CronStatus,
    pub last_run: Option<f64>,
    pub next_run: Option<f64>,
    pub consecutive_errors: u32,
}

pub fn parse_cron(input: &str) -> Vec<CronRecord> {
    input.lines().filter_map(parse_cron_line).collect()
}

fn parse_cron_line(line: &str) -> Option<CronRecord> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut fields = line.split_whitespace();
    let job_name = fields.next()?.to_string();

    let mut status = None;
    let mut last_run = None;
    let mut next_run = None;
    let mut consecutive_errors = 0;

    for field in fields {
        if let Some(value) = field.strip_prefix("status=") {
            status = Some(CronStatus::from_str(value));
        } else if let Some(value) = field.strip_prefix("last_run=") {
            last_run = value.parse().ok();
        } else if let Some(value) = field.strip_prefix("next_run=") {
            next_run = value.parse().ok();
        } else if let Some(value) = field.strip_prefix("errors=") {
            consecutive_errors = value.parse().unwrap_or(0);
        }
    }

    let status = status?;

    Some(CronRecord {
        job_name,
        status,
        last_run,
        next_run,
        consecutive_errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_known_statuses() {
        let input = "a status=ok\nb status=error\nc status=running\n";
        let jobs = parse_cron(input);
        assert_eq!(jobs[0].status, CronStatus::Ok);
        assert_eq!(jobs[1].status, CronStatus::Error);
        assert_eq!(jobs[2].status, CronStatus::Running);
    }

    #[test]
    fn test_unknown_status_becomes_idle() {
        let jobs = parse_cron("a status=weird\n");
        assert_eq!(jobs[0].status, CronStatus::Idle);
    }

    #[test]
    fn test_consecutive_errors_defaults_to_zero() {
        let jobs = parse_cron("a status=ok\n");
        assert_eq!(jobs[0].consecutive_errors, 0);

        let jobs = parse_cron("a status=error errors=5\n");
        assert_eq!(jobs[0].consecutive_errors, 5);
    }

    #[test]
    fn test_row_without_status_is_skipped() {
        assert_eq!(parse_cron("just-a-name\n").len(), 0);
    }
}
