//! Parser for `openclaw agents list` output. One line per agent:
//!
//! ```text
//! main (default)  model=claude-haiku   sessions=3  tokens=126000  storage=512Mi
//! rentalops       model=claude-sonnet  sessions=4  tokens=65000   storage=1.2Gi
//! ```
//!
//! Lines that don't match the expected shape are skipped -- the parser as a
//! whole is total over any byte string, it just returns fewer rows.

#[derive(Debug, Clone, PartialEq)]
pub struct AgentRecord {
    pub name: String,
    pub model: String,
    pub sessions: u64,
    pub tokens_used: u64,
    pub storage_bytes: u64,
    pub is_default: bool,
}

pub fn parse_agents(input: &str) -> Vec<AgentRecord> {
    input
        .lines()
        .filter_map(parse_agent_line)
        .collect()
}

fn parse_agent_line(line: &str) -> Option<AgentRecord> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut fields: Vec<&str> = line.split_whitespace().collect();
    if fields.is_empty() {
        return None;
    }

    let mut name = fields.remove(0).to_string();
    let mut is_default = false;
    if fields.first() == Some(&"(default)") {
        fields.remove(0);
        is_default = true;
    } else if name.ends_with("(default)") {
        name = name.trim_end_matches("(default)").trim().to_string();
        is_default = true;
    }

    let mut model = None;
    let mut sessions = None;
    let mut tokens_used = None;
    let mut storage_bytes = None;

    for field in fields {
        if let Some(value) = field.strip_prefix("model=") {
            model = Some(value.to_string());
        } else if let Some(value) = field.strip_prefix("sessions=") {
            sessions = value.parse().ok();
        } else if let Some(value) = field.strip_prefix("tokens=") {
            tokens_used = value.parse().ok();
        } else if let Some(value) = field.strip_prefix("storage=") {
            storage_bytes = crate::parsers::size::parse_size(value);
        }
    }

    // A line that carries none of the recognized `key=value` fields isn't an
    // agent row at all (e.g. a header or blank separator) -- skip it rather
    // than fabricate a record out of just a name.
    let model = model?;

    Some(AgentRecord {
        name,
        model,
        sessions: sessions.unwrap_or(0),
        tokens_used: tokens_used.unwrap_or(0),
        storage_bytes: storage_bytes.unwrap_or(0),
        is_default,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
main (default)  model=claude-haiku   sessions=3  tokens=126000  storage=512Mi
rentalops       model=claude-sonnet  sessions=4  tokens=65000   storage=1.2Gi
raven           model=claude-opus    sessions=5  tokens=168000  storage=3.4Gi
";

    #[test]
    fn test_three_agents_only_main_is_default() {
        let agents = parse_agents(SAMPLE);
        assert_eq!(agents.len(), 3);
        assert_eq!(agents[0].name, "main");
        assert!(agents[0].is_default);
        assert!(!agents[1].is_default);
        assert!(!agents[2].is_default);
        assert_eq!(agents[1].name, "rentalops");
        assert_eq!(agents[2].name, "raven");
    }

    #[test]
    fn test_sessions_and_tokens() {
        let agents = parse_agents(SAMPLE);
        let sessions: Vec<u64> = agents.iter().map(|a| a.sessions).collect();
        let tokens: Vec<u64> = agents.iter().map(|a| a.tokens_used).collect();
        assert_eq!(sessions, vec![3, 4, 5]);
        assert_eq!(tokens, vec![126_000, 65_000, 168_000]);
    }

    #[test]
    fn test_empty_input_is_total() {
        assert_eq!(parse_agents(""), vec![]);
        assert_eq!(parse_agents("garbage\n\n  \n"), vec![]);
    }
}
