//! Parser for `nmap -sT --top-ports 20 <ip>` output: open port list plus a
//! best-effort OS guess string.

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NmapResult {
    pub open_ports: Vec<(u16, String)>,
    pub os_guess: Option<String>,
}

pub fn parse_nmap(input: &str) -> NmapResult {
    let mut open_ports = Vec::new();
    let mut os_guess = None;

    for line in input.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("OS details: ") {
            os_guess = Some(rest.to_string());
        } else if os_guess.is_none() {
            if let Some(rest) = line.strip_prefix("Running: ") {
                os_guess = Some(rest.to_string());
            }
        }

        if let Some(port_proto) = line.split_whitespace().next() {
            if let Some((port_str, _proto)) = port_proto.split_once('/') {
                if let Ok(port) = port_str.parse::<u16>() {
                    let mut fields = line.split_whitespace();
                    fields.next(); // port/proto
                    let state = fields.next().unwrap_or("");
                    let service = fields.next().unwrap_or("unknown");
                    if state == "open" {
                        open_ports.push((port, service.to_string()));
                    }
                }
            }
        }
    }

    NmapResult {
        open_ports,
        os_guess,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
Starting Nmap 7.94
PORT     STATE  SERVICE
22/tcp   open   ssh
80/tcp   open   http
443/tcp  closed https

Device type: general purpose
Running: Linux 5.X
OS details: Linux 5.0 - 5.14
Nmap done
";

    #[test]
    fn test_open_ports_extracted() {
        let result = parse_nmap(SAMPLE);
        assert_eq!(
            result.open_ports,
            vec![(22, "ssh".to_string()), (80, "http".to_string())]
        );
    }

    #[test]
    fn test_os_guess_prefers_os_details() {
        let result = parse_nmap(SAMPLE);
        assert_eq!(result.os_guess, Some("Linux 5.0 - 5.14".to_string()));
    }

    #[test]
    fn test_empty_input_is_total() {
        assert_eq!(parse_nmap(""), NmapResult::default());
    }
}
