//! Parsers for `free -h`, `df -h`, and `uptime` -- the three commands behind
//! the Server Health panel.

use crate::parsers::size::parse_size;

/// `free -h`: returns `(used_mb, total_mb)` for the `Mem:` row.
pub fn parse_free(input: &str) -> Option<(f64, f64)> {
    for line in input.lines() {
        if let Some(rest) = line.trim().strip_prefix("Mem:") {
            let fields: Vec<&str> = rest.split_whitespace().collect();
            if fields.len() < 2 {
                return None;
            }
            let total = parse_size(fields[0])? as f64 / (1024.0 * 1024.0);
            let used = parse_size(fields[1])? as f64 / (1024.0 * 1024.0);
            return Some((used, total));
        }
    }
    None
}

/// `df -h`: returns `(used_gb, total_gb)` for the root filesystem (`/`).
pub fn parse_df(input: &str) -> Option<(f64, f64)> {
    for line in input.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 {
            continue;
        }
        if fields[5] == "/" {
            let total = parse_size(fields[1])? as f64 / (1024.0 * 1024.0 * 1024.0);
            let used = parse_size(fields[2])? as f64 / (1024.0 * 1024.0 * 1024.0);
            return Some((used, total));
        }
    }
    None
}

/// `uptime`: returns the `(1m, 5m, 15m)` load averages.
pub fn parse_uptime(input: &str) -> Option<(f64, f64, f64)> {
    let idx = input.find("load average:")?;
    let tail = &input[idx + "load average:".len()..];
    let mut values = tail
        .split(',')
        .filter_map(|s| s.trim().parse::<f64>().ok());
    let load_1m = values.next()?;
    let load_5m = values.next()?;
    let load_15m = values.next()?;
    Some((load_1m, load_5m, load_15m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scenario_memory_threshold() {
        let input = "\
              total        used        free      shared  buff/cache   available
Mem:           8.0Gi       7.4Gi       200Mi        50Mi       400Mi       350Mi
Swap:             0B          0B          0B
";
        let (used, total) = parse_free(input).unwrap();
        assert_eq!(total.round(), 8192.0);
        assert!((used - 7577.0).abs() < 2.0);
    }

    #[test]
    fn test_df_root_filesystem() {
        let input = "\
Filesystem      Size  Used Avail Use% Mounted on
tmpfs           2.0G     0  2.0G   0% /dev/shm
/dev/sda1       100G   45G   50G  48% /
";
        let (used, total) = parse_df(input).unwrap();
        assert_eq!(total, 100.0);
        assert_eq!(used, 45.0);
    }

    #[test]
    fn test_uptime_load_averages() {
        let input = " 10:23:45 up 5 days,  3:21,  2 users,  load average: 0.52, 0.48, 0.45";
        assert_eq!(parse_uptime(input), Some((0.52, 0.48, 0.45)));
    }

    #[test]
    fn test_missing_rows_return_none() {
        assert_eq!(parse_free("nothing here"), None);
        assert_eq!(parse_df("Filesystem\n"), None);
        assert_eq!(parse_uptime("no load info"), None);
    }
}
