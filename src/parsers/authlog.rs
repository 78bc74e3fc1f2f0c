//! Parser for `/var/log/auth.log`-style SSH authentication lines. Produces
//! two streams -- `accepted` and `failed` -- each a per-IP `(count,
//! last_seen)` summary restricted to the trailing 24h relative to `now`.

use chrono::{DateTime, Datelike, Local, NaiveDateTime, TimeZone};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuthLogSummary {
    pub accepted: Vec<(String, u32, f64)>,
    pub failed: Vec<(String, u32, f64)>,
}

pub fn parse_auth_log(input: &str, now: DateTime<Local>) -> AuthLogSummary {
    let mut accepted: HashMap<String, (u32, f64)> = HashMap::new();
    let mut failed: HashMap<String, (u32, f64)> = HashMap::new();
    let cutoff = now.timestamp() as f64 - 24.0 * 3600.0;

    for line in input.lines() {
        let Some((timestamp, ip, is_accepted)) = parse_line(line, now) else {
            continue;
        };
        if timestamp < cutoff {
            continue;
        }
        let bucket = if is_accepted { &mut accepted } else { &mut failed };
        let entry = bucket.entry(ip).or_insert((0, timestamp));
        entry.0 += 1;
        if timestamp > entry.1 {
            entry.1 = timestamp;
        }
    }

    let to_vec = |m: HashMap<String, (u32, f64)>| {
        let mut v: Vec<(String, u32, f64)> =
            m.into_iter().map(|(ip, (n, t))| (ip, n, t)).collect();
        v.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        v
    };

    AuthLogSummary {
        accepted: to_vec(accepted),
        failed: to_vec(failed),
    }
}

fn parse_line(line: &str, now: DateTime<Local>) -> Option<(f64, String, bool)> {
    let is_accepted = line.contains("Accepted");
    let is_failed = line.contains("Failed password");
    if !is_accepted && !is_failed {
        return None;
    }

    // Syslog lines carry no year: "Jan 15 10:23:45 host sshd[1234]: ...".
    let mut parts = line.splitn(4, ' ');
    let month = parts.next()?;
    let day = parts.next()?;
    let time = parts.next()?;
    let rest = parts.next()?;

    let timestamp = parse_syslog_timestamp(month, day, time, now)?;

    let ip = rest
        .split_whitespace()
        .skip_while(|w| *w != "from")
        .nth(1)?
        .to_string();

    Some((timestamp, ip, is_accepted))
}

fn parse_syslog_timestamp(
    month: &str,
    day: &str,
    time: &str,
    now: DateTime<Local>,
) -> Option<f64> {
    let fmt = "%Y %b %e %H:%M:%S";
    let candidate_this_year = format!("{} {} {} {}", now.year(), month, day, time);
    let naive = NaiveDateTime::parse_from_str(&candidate_this_year, fmt).ok()?;
    let mut dt = Local.from_local_datetime(&naive).single()?;

    // If the naive timestamp is after `now`, it must be from last year
    // (syslog entries are never from the future).
    if dt > now {
        let naive_prev = NaiveDateTime::parse_from_str(
            &format!("{} {} {} {}", now.year() - 1, month, day, time),
            fmt,
        )
        .ok()?;
        dt = Local.from_local_datetime(&naive_prev).single()?;
    }

    Some(dt.timestamp() as f64)
}
