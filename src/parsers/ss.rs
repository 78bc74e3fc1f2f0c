//! Parsers for `ss` socket-statistics output.

/// `ss -tnp` parser: established peer connections. Yields `(peer_ip, count)`,
/// with loopback and link-local peers excluded (they are not attackers,
/// not remote users -- noise for the network panel).
pub fn parse_connections(input: &str) -> Vec<(String, u32)> {
    use std::collections::HashMap;

    let mut counts: HashMap<String, u32> = HashMap::new();
    for line in input.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        // State Recv-Q Send-Q Local-Address:Port Peer-Address:Port [Process]
        if fields.len() < 5 {
            continue;
        }
        let peer = fields[4];
        if let Some(ip) = extract_ip(peer) {
            if !is_loopback_or_link_local(&ip) {
                *counts.entry(ip).or_insert(0) += 1;
            }
        }
    }

    let mut result: Vec<(String, u32)> = counts.into_iter().collect();
    result.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    result
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListeningPort {
    pub port: u16,
    pub service: String,
    pub state: String,
}

/// `ss -tlnp` parser: listening sockets.
pub fn parse_listening(input: &str) -> Vec<ListeningPort> {
    let mut ports = Vec::new();
    for line in input.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 {
            continue;
        }
        let state = fields[0].to_lowercase();
        let Some(port) = extract_port(fields[3]) else {
            continue;
        };
        let service = fields
            .get(5)
            .and_then(|p| extract_process_name(p))
            .unwrap_or_else(|| "unknown".to_string());
        ports.push(ListeningPort {
            port,
            service,
            state,
        });
    }
    ports
}

fn extract_ip(addr_port: &str) -> Option<String> {
    // IPv6 addresses are bracketed: [::1]:22. IPv4: 127.0.0.1:22.
    if let Some(rest) = addr_port.strip_prefix('[') {
        let end = rest.find(']')?;
        return Some(rest[..end].to_string());
    }
    let idx = addr_port.rfind(':')?;
    let ip = &addr_port[..idx];
    if ip.is_empty() || ip == "*" {
        return None;
    }
    Some(ip.to_string())
}

fn extract_port(addr_port: &str) -> Option<u16> {
    let idx = addr_port.rfind(':')?;
    addr_port[idx + 1..].parse().ok()
}

fn extract_process_name(field: &str) -> Option<String> {
    // users:(("nginx",pid=456,fd=10))
    let start = field.find("((\"")? + 3;
    let end = field[start..].find('"')? + start;
    Some(field[start..end].to_string())
}

fn is_loopback_or_link_local(ip: &str) -> bool {
    if ip == "::1" || ip.starts_with("fe80:") {
        return true;
    }
    if let Some(first) = ip.split('.').next() {
        if first == "127" {
            return true;
        }
    }
    ip.starts_with("169.254.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CONN_SAMPLE: &str = "\
State  Recv-Q Send-Q Local Address:Port   Peer Address:Port  Process
ESTAB  0      0      10.0.0.5:22          203.0.113.7:51820  users:((\"sshd\",pid=123,fd=4))
ESTAB  0      0      10.0.0.5:443         198.51.100.23:4433 users:((\"nginx\",pid=456,fd=10))
ESTAB  0      0      10.0.0.5:443         203.0.113.7:4434   users:((\"nginx\",pid=456,fd=11))
ESTAB  0      0      10.0.0.5:22          127.0.0.1:9999     users:((\"sshd\",pid=123,fd=5))
ESTAB  0      0      10.0.0.5:22          169.254.1.2:9999   users:((\"sshd\",pid=123,fd=6))
";

    #[test]
    fn test_loopback_and_link_local_excluded() {
        let conns = parse_connections(CONN_SAMPLE);
        assert!(conns.iter().all(|(ip, _)| ip != "127.0.0.1" && ip != "169.254.1.2"));
    }

    #[test]
    fn test_counts_aggregated_per_peer() {
        let conns = parse_connections(CONN_SAMPLE);
        let map: std::collections::HashMap<_, _> = conns.into_iter().collect();
        assert_eq!(map.get("203.0.113.7"), Some(&2));
        assert_eq!(map.get("198.51.100.23"), Some(&1));
    }

    const LISTEN_SAMPLE: &str = "\
State   Recv-Q  Send-Q   Local Address:Port   Peer Address:Port  Process
LISTEN  0       128      0.0.0.0:22           0.0.0.0:*          users:((\"sshd\",pid=1,fd=3))
LISTEN  0       128      127.0.0.1:5432       0.0.0.0:*          users:((\"postgres\",pid=2,fd=5))
";

    #[test]
    fn test_listening_ports() {
        let ports = parse_listening(LISTEN_SAMPLE);
        assert_eq!(ports.len(), 2);
        assert_eq!(ports[0].port, 22);
        assert_eq!(ports[0].service, "sshd");
        assert_eq!(ports[1].port, 5432);
        assert_eq!(ports[1].service, "postgres");
    }
}
