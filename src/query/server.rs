use crate::common::{now_secs, sparkline};
use crate::store::Store;

/// Newest-first sequence of server metrics from the last `hours`, capped at
/// `limit` rows.
pub fn recent_server_metrics(
    store: &Store,
    hours: f64,
    limit: usize,
) -> anyhow::Result<Vec<crate::store::ServerMetric>> {
    let since = now_secs() - hours * 3600.0;
    let mut rows = store.recent_server_metrics(since)?;
    rows.reverse();
    rows.truncate(limit);
    Ok(rows)
}

/// Mean CPU%/MEM%/DISK% over the trailing `hours`. `None` when there is no
/// data in the window (division by zero avoided, not computed as NaN).
pub fn server_averages(store: &Store, hours: f64) -> anyhow::Result<Option<(f64, f64, f64)>> {
    let since = now_secs() - hours * 3600.0;
    let rows = store.recent_server_metrics(since)?;
    if rows.is_empty() {
        return Ok(None);
    }

    let n = rows.len() as f64;
    let cpu_avg = rows.iter().map(|r| r.cpu_percent).sum::<f64>() / n;
    let mem_avg = rows
        .iter()
        .map(|r| 100.0 * r.mem_used_mb / r.mem_total_mb.max(1.0))
        .sum::<f64>()
        / n;
    let disk_avg = rows
        .iter()
        .map(|r| 100.0 * r.disk_used_gb / r.disk_total_gb.max(1.0))
        .sum::<f64>()
        / n;

    Ok(Some((cpu_avg, mem_avg, disk_avg)))
}

/// Sparkline over the trailing `hours` of `active_connections`.
pub fn network_sparkline(store: &Store, hours: f64, width: usize) -> anyhow::Result<String> {
    let since = now_secs() - hours * 3600.0;
    let rows = store.recent_network_metrics(since)?;
    let values: Vec<f64> = rows.iter().map(|r| r.active_connections as f64).collect();
    Ok(sparkline(&values, width))
}

/// Mean `active_connections` over the trailing `hours`.
pub fn network_average(store: &Store, hours: f64) -> anyhow::Result<Option<f64>> {
    let since = now_secs() - hours * 3600.0;
    let rows = store.recent_network_metrics(since)?;
    if rows.is_empty() {
        return Ok(None);
    }
    let n = rows.len() as f64;
    Ok(Some(rows.iter().map(|r| r.active_connections as f64).sum::<f64>() / n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store_with_ticks(n: usize) -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("metrics.db")).unwrap();
        let base = now_secs() - (n as f64) * 30.0;
        for i in 0..n {
            store
                .insert_server_metric(&crate::store::ServerMetric {
                    timestamp: base + i as f64 * 30.0,
                    cpu_percent: i as f64,
                    mem_used_mb: 1000.0,
                    mem_total_mb: 2000.0,
                    disk_used_gb: 10.0,
                    disk_total_gb: 100.0,
                    load_1m: 0.1,
                    load_5m: 0.1,
                    load_15m: 0.1,
                })
                .unwrap();
        }
        (dir, store)
    }

    #[test]
    fn test_round_trip_n_ticks_newest_first() {
        let (_dir, store) = store_with_ticks(5);
        let rows = recent_server_metrics(&store, 1.0, 5).unwrap();
        assert_eq!(rows.len(), 5);
        // Newest first: descending cpu_percent (later ticks have higher i).
        assert!(rows[0].cpu_percent >= rows[4].cpu_percent);
    }

    #[test]
    fn test_server_averages_none_when_empty() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("metrics.db")).unwrap();
        assert_eq!(server_averages(&store, 24.0).unwrap(), None);
    }

    #[test]
    fn test_server_averages_mem_percent() {
        let (_dir, store) = store_with_ticks(1);
        let (_, mem_avg, _) = server_averages(&store, 24.0).unwrap().unwrap();
        assert_eq!(mem_avg, 50.0);
    }
}
