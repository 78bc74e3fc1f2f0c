//! Parser for `ps aux --sort=-%cpu`: the top processes table. Only the
//! first 5 data rows (after the header) are kept, matching the Server
//! Health panel's "top processes" sub-view.

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRecord {
    pub user: String,
    pub pid: u32,
    pub cpu_percent: f64,
    pub mem_percent: f64,
    pub command: String,
}

pub fn parse_top_processes(input: &str) -> Vec<ProcessRecord> {
    input
        .lines()
        .skip(1)
        .filter_map(parse_ps_line)
        .take(5)
        .collect()
}

fn parse_ps_line(line: &str) -> Option<ProcessRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    // USER PID %CPU %MEM VSZ RSS TTY STAT START TIME COMMAND...
    if fields.len() < 11 {
        return None;
    }
    let user = fields[0].to_string();
    let pid = fields[1].parse().ok()?;
    let cpu_percent = fields[2].parse().ok()?;
    let mem_percent = fields[3].parse().ok()?;
    let command = fields[10..].join(" ");

    Some(ProcessRecord {
        user,
        pid,
        cpu_percent,
        mem_percent,
        command,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
USER  PID %CPU %MEM    VSZ   RSS TTY STAT START   TIME COMMAND
root    1  12.3  2.1 123456 45678 ?   Ss   10:00   0:05 openclaw-agent main
root    2   8.1  1.0 123456 45678 ?   S    10:00   0:03 openclaw-gateway
root    3   1.0  0.5 123456 45678 ?   S    10:00   0:01 cron
root    4   0.5  0.2 123456 45678 ?   S    10:00   0:00 sshd
root    5   0.1  0.1 123456 45678 ?   S    10:00   0:00 bash
root    6   0.0  0.0 123456 45678 ?   S    10:00   0:00 extra-process-not-kept
";

    #[test]
    fn test_takes_only_first_five() {
        let procs = parse_top_processes(SAMPLE);
        assert_eq!(procs.len(), 5);
        assert_eq!(procs[0].command, "openclaw-agent main");
    }

    #[test]
    fn test_cpu_and_mem_parsed() {
        let procs = parse_top_processes(SAMPLE);
        assert_eq!(procs[0].cpu_percent, 12.3);
        assert_eq!(procs[0].mem_percent, 2.1);
        assert_eq!(procs[0].pid, 1);
    }
}
