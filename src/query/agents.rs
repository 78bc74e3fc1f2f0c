use crate::common::now_secs;
use crate::store::Store;

/// `(latest - earliest) * 3600 / elapsed_secs` over the trailing `window_secs`
/// for `agent_name`. Returns `None` -- rendered as `--` by the UI -- when
/// there are fewer than two samples in the window, or when any sample in
/// the window shows a decrease (a reset, e.g. agent restarted with a fresh
/// counter): the rate is meaningless across a reset.
pub fn tokens_per_hour(store: &Store, agent_name: &str, window_secs: f64) -> anyhow::Result<Option<f64>> {
    let since = now_secs() - window_secs;
    let rows = store.agent_metrics_since(agent_name, since)?;

    if rows.len() < 2 {
        return Ok(None);
    }

    for pair in rows.windows(2) {
        if pair[1].tokens_used < pair[0].tokens_used {
            return Ok(None);
        }
    }

    let earliest = rows.first().unwrap();
    let latest = rows.last().unwrap();
    let elapsed = latest.timestamp - earliest.timestamp;
    if elapsed <= 0.0 {
        return Ok(None);
    }

    let delta_tokens = latest.tokens_used as f64 - earliest.tokens_used as f64;
    Ok(Some(delta_tokens * 3600.0 / elapsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store_with(rows: &[(f64, u64)]) -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("metrics.db")).unwrap();
        let metrics: Vec<crate::store::AgentMetric> = rows
            .iter()
            .map(|(t, tokens)| crate::store::AgentMetric {
                timestamp: *t,
                agent_name: "main".to_string(),
                model: "opus".to_string(),
                tokens_used: *tokens,
                sessions: 1,
                storage_bytes: 0,
                is_default: true,
            })
            .collect();
        store.insert_agent_metrics(&metrics).unwrap();
        (dir, store)
    }

    #[test]
    fn test_scenario_reset_yields_none() {
        let now = now_secs();
        let (_dir, store) = store_with(&[(now - 3600.0, 126000), (now, 100)]);
        assert_eq!(tokens_per_hour(&store, "main", 3600.0 + 10.0).unwrap(), None);
    }

    #[test]
    fn test_monotonic_increase_computes_rate() {
        let now = now_secs();
        let (_dir, store) = store_with(&[(now - 3600.0, 1000), (now, 4600)]);
        let rate = tokens_per_hour(&store, "main", 3600.0 + 10.0).unwrap().unwrap();
        assert!((rate - 3600.0).abs() < 1.0);
    }

    #[test]
    fn test_fewer_than_two_samples_yields_none() {
        let now = now_secs();
        let (_dir, store) = store_with(&[(now, 1000)]);
        assert_eq!(tokens_per_hour(&store, "main", 3600.0).unwrap(), None);
    }
}
