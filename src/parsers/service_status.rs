//! Parser for `openclaw status` / `openclaw gateway status` output: a small
//! `key: value` block. Feeds the SITREP panel's channel-health summary.

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceStatus {
    pub running: bool,
    pub detail: String,
}

pub fn parse_service_status(input: &str) -> ServiceStatus {
    for line in input.lines() {
        if let Some((key, value)) = line.split_once(':') {
            if key.trim().eq_ignore_ascii_case("status") {
                let value = value.trim();
                return ServiceStatus {
                    running: value.eq_ignore_ascii_case("running")
                        || value.eq_ignore_ascii_case("ok"),
                    detail: value.to_string(),
                };
            }
        }
    }
    ServiceStatus {
        running: false,
        detail: "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_running_status() {
        let status = parse_service_status("status: running\nuptime: 12345\n");
        assert!(status.running);
        assert_eq!(status.detail, "running");
    }

    #[test]
    fn test_stopped_status() {
        let status = parse_service_status("status: stopped\n");
        assert!(!status.running);
    }

    #[test]
    fn test_missing_status_is_unknown_not_crashing() {
        let status = parse_service_status("garbage output\n");
        assert!(!status.running);
        assert_eq!(status.detail, "unknown");
    }
}
