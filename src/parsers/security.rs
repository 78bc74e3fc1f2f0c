//! Parsers for the Security panel's secondary signals: UFW status,
//! fail2ban status, and the sshd root-login policy.

/// `ufw status` output, e.g. "Status: active".
pub fn parse_ufw_status(input: &str) -> bool {
    input
        .lines()
        .next()
        .map(|line| line.to_lowercase().contains("active"))
        .unwrap_or(false)
        && !input.to_lowercase().contains("inactive")
}

/// `systemctl is-active fail2ban` output: a bare "active" or "inactive".
pub fn parse_fail2ban_status(input: &str) -> bool {
    input.trim() == "active"
}

/// `sshd_config` contents: root login is only considered enabled when
/// `PermitRootLogin yes` is set -- `prohibit-password`/`without-password`
/// still forbid password auth and are treated as disabled.
pub fn parse_root_login_policy(input: &str) -> bool {
    for line in input.lines() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        if let Some(value) = line.strip_prefix("PermitRootLogin") {
            return value.trim().eq_ignore_ascii_case("yes");
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ufw_active() {
        assert!(parse_ufw_status("Status: active\n\nTo    Action  From\n"));
    }

    #[test]
    fn test_ufw_inactive() {
        assert!(!parse_ufw_status("Status: inactive\n"));
    }

    #[test]
    fn test_fail2ban_active() {
        assert!(parse_fail2ban_status("active\n"));
        assert!(!parse_fail2ban_status("inactive\n"));
    }

    #[test]
    fn test_root_login_yes_is_enabled() {
        assert!(parse_root_login_policy("PermitRootLogin yes\n"));
    }

    #[test]
    fn test_root_login_prohibit_password_is_disabled() {
        assert!(!parse_root_login_policy(
            "PermitRootLogin prohibit-password\n"
        ));
    }

    #[test]
    fn test_root_login_commented_out_defaults_disabled() {
        assert!(!parse_root_login_policy("# PermitRootLogin yes\n"));
    }
}
