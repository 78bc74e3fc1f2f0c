//! The Metrics Store: a single SQLite file under WAL journaling holding the
//! time-series tables collectors append to, the keyed caches the Cache Layer
//! reads through, and the two control tables (`schema_version`, `config`).
//!
//! Grounded on the `ServerDatabase` pattern (lazy connection, `PRAGMA
//! journal_mode=WAL`, idempotent `initialize`, transaction-per-batch writes,
//! `cleanup_old_data` by retention window) -- generalized from one
//! network-monitoring server's metrics to GalacticCIC's own tables.

pub mod models;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

pub use models::*;

const RETENTION_SECS: f64 = 30.0 * 24.0 * 60.0 * 60.0;

pub struct Store {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl Store {
    /// Opens (creating if absent) the database at `path`, enables WAL mode,
    /// and brings the schema up to [`schema::CURRENT_VERSION`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating data directory {}", parent.display()))?;
            }
        }

        let conn = Connection::open(&db_path)
            .with_context(|| format!("opening database {}", db_path.display()))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .context("enabling WAL journal mode")?;
        conn.busy_timeout(std::time::Duration::from_secs(10))
            .context("setting busy timeout")?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };
        store.bootstrap()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn bootstrap(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
            [],
        )?;

        let version: Option<i64> = conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .ok();

        match version {
            None => {
                schema::apply_all(&conn)?;
                conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?1)",
                    params![schema::CURRENT_VERSION],
                )?;
            }
            Some(v) if v < schema::CURRENT_VERSION => {
                schema::migrate(&conn, v)?;
                conn.execute("UPDATE schema_version SET version = ?1", params![schema::CURRENT_VERSION])?;
            }
            _ => {}
        }

        Ok(())
    }

    // ---- time-series writes ----------------------------------------

    pub fn insert_server_metric(&self, m: &ServerMetric) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"INSERT INTO server_metrics
               (timestamp, cpu_percent, mem_used_mb, mem_total_mb, disk_used_gb, disk_total_gb, load_1m, load_5m, load_15m)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
            params![
                m.timestamp,
                m.cpu_percent,
                m.mem_used_mb,
                m.mem_total_mb,
                m.disk_used_gb,
                m.disk_total_gb,
                m.load_1m,
                m.load_5m,
                m.load_15m,
            ],
        )?;
        Ok(())
    }

    pub fn insert_agent_metrics(&self, rows: &[AgentMetric]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        for m in rows {
            tx.execute(
                r#"INSERT INTO agent_metrics
                   (timestamp, agent_name, model, tokens_used, sessions, storage_bytes, is_default)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
                params![
                    m.timestamp,
                    m.agent_name,
                    m.model,
                    m.tokens_used as i64,
                    m.sessions as i64,
                    m.storage_bytes as i64,
                    m.is_default as i64,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn insert_cron_metrics(&self, rows: &[CronMetric]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        for m in rows {
            tx.execute(
                r#"INSERT INTO cron_metrics
                   (timestamp, job_name, status, last_run, next_run, consecutive_errors)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
                params![
                    m.timestamp,
                    m.job_name,
                    m.status,
                    m.last_run,
                    m.next_run,
                    m.consecutive_errors,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn insert_security_metric(&self, m: &SecurityMetric) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"INSERT INTO security_metrics
               (timestamp, ssh_intrusions_24h, ports_open, ufw_active, fail2ban_active, root_login_enabled)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            params![
                m.timestamp,
                m.ssh_intrusions_24h,
                m.ports_open,
                m.ufw_active as i64,
                m.fail2ban_active as i64,
                m.root_login_enabled as i64,
            ],
        )?;
        Ok(())
    }

    pub fn insert_network_metric(&self, m: &NetworkMetric) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO network_metrics (timestamp, active_connections, unique_ips) VALUES (?1, ?2, ?3)",
            params![m.timestamp, m.active_connections, m.unique_ips],
        )?;
        Ok(())
    }

    /// Inserts the whole port-scan list for one tick inside a single
    /// transaction keyed on that tick's timestamp.
    pub fn insert_port_scans(&self, rows: &[PortScan]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        for p in rows {
            tx.execute(
                "INSERT INTO port_scans (timestamp, port, service, state) VALUES (?1, ?2, ?3, ?4)",
                params![p.timestamp, p.port, p.service, p.state],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    // ---- time-series reads ------------------------------------------

    pub fn recent_server_metrics(&self, since: f64) -> Result<Vec<ServerMetric>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"SELECT timestamp, cpu_percent, mem_used_mb, mem_total_mb, disk_used_gb, disk_total_gb, load_1m, load_5m, load_15m
               FROM server_metrics WHERE timestamp >= ?1 ORDER BY timestamp ASC"#,
        )?;
        let rows = stmt.query_map(params![since], |row| {
            Ok(ServerMetric {
                timestamp: row.get(0)?,
                cpu_percent: row.get(1)?,
                mem_used_mb: row.get(2)?,
                mem_total_mb: row.get(3)?,
                disk_used_gb: row.get(4)?,
                disk_total_gb: row.get(5)?,
                load_1m: row.get(6)?,
                load_5m: row.get(7)?,
                load_15m: row.get(8)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn agent_metrics_since(&self, agent_name: &str, since: f64) -> Result<Vec<AgentMetric>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"SELECT timestamp, agent_name, model, tokens_used, sessions, storage_bytes, is_default
               FROM agent_metrics WHERE agent_name = ?1 AND timestamp >= ?2 ORDER BY timestamp ASC"#,
        )?;
        let rows = stmt.query_map(params![agent_name, since], Self::row_to_agent_metric)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// The latest row per agent (distinct `agent_name`), used for the Agent
    /// Fleet panel's current-state table.
    pub fn latest_agent_metrics(&self) -> Result<Vec<AgentMetric>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"SELECT timestamp, agent_name, model, tokens_used, sessions, storage_bytes, is_default
               FROM agent_metrics AS a
               WHERE timestamp = (SELECT MAX(timestamp) FROM agent_metrics WHERE agent_name = a.agent_name)
               GROUP BY agent_name
               ORDER BY agent_name ASC"#,
        )?;
        let rows = stmt.query_map([], Self::row_to_agent_metric)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn row_to_agent_metric(row: &rusqlite::Row<'_>) -> rusqlite::Result<AgentMetric> {
        Ok(AgentMetric {
            timestamp: row.get(0)?,
            agent_name: row.get(1)?,
            model: row.get(2)?,
            tokens_used: row.get::<_, i64>(3)? as u64,
            sessions: row.get::<_, i64>(4)? as u64,
            storage_bytes: row.get::<_, i64>(5)? as u64,
            is_default: row.get::<_, i64>(6)? != 0,
        })
    }

    pub fn recent_cron_metrics(&self, since: f64) -> Result<Vec<CronMetric>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"SELECT timestamp, job_name, status, last_run, next_run, consecutive_errors
               FROM cron_metrics WHERE timestamp >= ?1 ORDER BY timestamp ASC"#,
        )?;
        let rows = stmt.query_map(params![since], |row| {
            Ok(CronMetric {
                timestamp: row.get(0)?,
                job_name: row.get(1)?,
                status: row.get(2)?,
                last_run: row.get(3)?,
                next_run: row.get(4)?,
                consecutive_errors: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn recent_network_metrics(&self, since: f64) -> Result<Vec<NetworkMetric>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT timestamp, active_connections, unique_ips FROM network_metrics WHERE timestamp >= ?1 ORDER BY timestamp ASC",
        )?;
        let rows = stmt.query_map(params![since], |row| {
            Ok(NetworkMetric {
                timestamp: row.get(0)?,
                active_connections: row.get(1)?,
                unique_ips: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn latest_security_metric(&self) -> Result<Option<SecurityMetric>> {
        let conn = self.conn.lock().unwrap();
        let result = conn.query_row(
            r#"SELECT timestamp, ssh_intrusions_24h, ports_open, ufw_active, fail2ban_active, root_login_enabled
               FROM security_metrics ORDER BY timestamp DESC LIMIT 1"#,
            [],
            |row| {
                Ok(SecurityMetric {
                    timestamp: row.get(0)?,
                    ssh_intrusions_24h: row.get(1)?,
                    ports_open: row.get(2)?,
                    ufw_active: row.get::<_, i64>(3)? != 0,
                    fail2ban_active: row.get::<_, i64>(4)? != 0,
                    root_login_enabled: row.get::<_, i64>(5)? != 0,
                })
            },
        );
        match result {
            Ok(row) => Ok(Some(row)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn port_scans_at(&self, timestamp: f64) -> Result<Vec<PortScan>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT timestamp, port, service, state FROM port_scans WHERE timestamp = ?1")?;
        let rows = stmt.query_map(params![timestamp], |row| {
            Ok(PortScan {
                timestamp: row.get(0)?,
                port: row.get(1)?,
                service: row.get(2)?,
                state: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // ---- keyed caches -------------------------------------------------

    pub fn get_dns_cache(&self, ip: &str) -> Result<Option<DnsCacheRow>> {
        let conn = self.conn.lock().unwrap();
        let result = conn.query_row(
            "SELECT ip, hostname, resolved_at FROM dns_cache WHERE ip = ?1",
            params![ip],
            |row| {
                Ok(DnsCacheRow {
                    ip: row.get(0)?,
                    hostname: row.get(1)?,
                    resolved_at: row.get(2)?,
                })
            },
        );
        Ok(result.ok())
    }

    /// All cached IPs whose entry is already past `ttl_secs`, so the
    /// glacial-tier DNS sweep knows which ones to refresh.
    pub fn stale_dns_cache_ips(&self, now: f64, ttl_secs: f64) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT ip FROM dns_cache WHERE ? - resolved_at > ?")?;
        let rows = stmt.query_map(params![now, ttl_secs], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn put_dns_cache(&self, row: &DnsCacheRow) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO dns_cache (ip, hostname, resolved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(ip) DO UPDATE SET hostname = excluded.hostname, resolved_at = excluded.resolved_at",
            params![row.ip, row.hostname, row.resolved_at],
        )?;
        Ok(())
    }

    pub fn get_geo_cache(&self, ip: &str) -> Result<Option<GeoCacheRow>> {
        let conn = self.conn.lock().unwrap();
        let result = conn.query_row(
            "SELECT ip, country_code, city, isp, resolved_at FROM geo_cache WHERE ip = ?1",
            params![ip],
            |row| {
                Ok(GeoCacheRow {
                    ip: row.get(0)?,
                    country_code: row.get(1)?,
                    city: row.get(2)?,
                    isp: row.get(3)?,
                    resolved_at: row.get(4)?,
                })
            },
        );
        Ok(result.ok())
    }

    pub fn put_geo_cache(&self, row: &GeoCacheRow) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"INSERT INTO geo_cache (ip, country_code, city, isp, resolved_at) VALUES (?1, ?2, ?3, ?4, ?5)
               ON CONFLICT(ip) DO UPDATE SET country_code = excluded.country_code, city = excluded.city,
               isp = excluded.isp, resolved_at = excluded.resolved_at"#,
            params![row.ip, row.country_code, row.city, row.isp, row.resolved_at],
        )?;
        Ok(())
    }

    pub fn get_attacker_scan(&self, ip: &str) -> Result<Option<AttackerScanRow>> {
        let conn = self.conn.lock().unwrap();
        let result = conn.query_row(
            "SELECT ip, open_ports, os_guess, scanned_at FROM attacker_scans WHERE ip = ?1",
            params![ip],
            |row| {
                Ok(AttackerScanRow {
                    ip: row.get(0)?,
                    open_ports: row.get(1)?,
                    os_guess: row.get(2)?,
                    scanned_at: row.get(3)?,
                })
            },
        );
        Ok(result.ok())
    }

    pub fn put_attacker_scan(&self, row: &AttackerScanRow) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"INSERT INTO attacker_scans (ip, open_ports, os_guess, scanned_at) VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT(ip) DO UPDATE SET open_ports = excluded.open_ports, os_guess = excluded.os_guess,
               scanned_at = excluded.scanned_at"#,
            params![row.ip, row.open_ports, row.os_guess, row.scanned_at],
        )?;
        Ok(())
    }

    pub fn get_sitrep_cache(&self, key: &str) -> Result<Option<SitrepCacheRow>> {
        let conn = self.conn.lock().unwrap();
        let result = conn.query_row(
            "SELECT key, payload, cached_at FROM sitrep_cache WHERE key = ?1",
            params![key],
            |row| {
                Ok(SitrepCacheRow {
                    key: row.get(0)?,
                    payload: row.get(1)?,
                    cached_at: row.get(2)?,
                })
            },
        );
        Ok(result.ok())
    }

    pub fn put_sitrep_cache(&self, row: &SitrepCacheRow) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"INSERT INTO sitrep_cache (key, payload, cached_at) VALUES (?1, ?2, ?3)
               ON CONFLICT(key) DO UPDATE SET payload = excluded.payload, cached_at = excluded.cached_at"#,
            params![row.key, row.payload, row.cached_at],
        )?;
        Ok(())
    }

    // ---- config ---------------------------------------------------

    pub fn get_config(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let result = conn.query_row("SELECT value FROM config WHERE key = ?1", params![key], |row| {
            row.get(0)
        });
        Ok(result.ok())
    }

    pub fn set_config(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    // ---- maintenance ------------------------------------------------

    /// Deletes every time-series row older than 30 days and any cache row
    /// older than the same window. Idempotent: running twice in a row with
    /// no new writes in between deletes nothing the second time.
    pub fn prune(&self, now: f64) -> Result<PruneStats> {
        let cutoff = now - RETENTION_SECS;
        let conn = self.conn.lock().unwrap();

        let mut stats = PruneStats::default();
        stats.server_metrics = conn.execute("DELETE FROM server_metrics WHERE timestamp < ?1", params![cutoff])?;
        stats.agent_metrics = conn.execute("DELETE FROM agent_metrics WHERE timestamp < ?1", params![cutoff])?;
        stats.cron_metrics = conn.execute("DELETE FROM cron_metrics WHERE timestamp < ?1", params![cutoff])?;
        stats.security_metrics =
            conn.execute("DELETE FROM security_metrics WHERE timestamp < ?1", params![cutoff])?;
        stats.network_metrics = conn.execute("DELETE FROM network_metrics WHERE timestamp < ?1", params![cutoff])?;
        stats.port_scans = conn.execute("DELETE FROM port_scans WHERE timestamp < ?1", params![cutoff])?;

        stats.cache_rows += conn.execute("DELETE FROM dns_cache WHERE resolved_at < ?1", params![cutoff])?;
        stats.cache_rows += conn.execute("DELETE FROM geo_cache WHERE resolved_at < ?1", params![cutoff])?;
        stats.cache_rows += conn.execute("DELETE FROM attacker_scans WHERE scanned_at < ?1", params![cutoff])?;
        stats.cache_rows += conn.execute("DELETE FROM sitrep_cache WHERE cached_at < ?1", params![cutoff])?;

        Ok(stats)
    }

    pub fn stats(&self) -> Result<DbStats> {
        let conn = self.conn.lock().unwrap();
        let count = |table: &str| -> Result<u64> {
            let sql = format!("SELECT COUNT(*) FROM {table}");
            Ok(conn.query_row(&sql, [], |row| row.get::<_, i64>(0))? as u64)
        };

        let total_rows = count("server_metrics")?
            + count("agent_metrics")?
            + count("cron_metrics")?
            + count("security_metrics")?
            + count("network_metrics")?
            + count("port_scans")?;

        let file_size = std::fs::metadata(&self.db_path).map(|m| m.len()).unwrap_or(0);

        Ok(DbStats {
            total_rows,
            file_size_bytes: file_size,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PruneStats {
    pub server_metrics: usize,
    pub agent_metrics: usize,
    pub cron_metrics: usize,
    pub security_metrics: usize,
    pub network_metrics: usize,
    pub port_scans: usize,
    pub cache_rows: usize,
}

impl PruneStats {
    pub fn total(&self) -> usize {
        self.server_metrics
            + self.agent_metrics
            + self.cron_metrics
            + self.security_metrics
            + self.network_metrics
            + self.port_scans
            + self.cache_rows
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DbStats {
    pub total_rows: u64,
    pub file_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn open_test_store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("metrics.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_open_creates_file_and_is_idempotent() {
        let (dir, store) = open_test_store();
        assert!(store.path().exists());
        drop(store);
        // Reopening an existing database must not fail or reset data.
        let store2 = Store::open(dir.path().join("metrics.db")).unwrap();
        assert!(store2.path().exists());
    }

    #[test]
    fn test_server_metric_round_trip() {
        let (_dir, store) = open_test_store();
        let m = ServerMetric {
            timestamp: 1000.0,
            cpu_percent: 12.5,
            mem_used_mb: 2048.0,
            mem_total_mb: 8192.0,
            disk_used_gb: 45.0,
            disk_total_gb: 100.0,
            load_1m: 0.5,
            load_5m: 0.4,
            load_15m: 0.3,
        };
        store.insert_server_metric(&m).unwrap();
        let rows = store.recent_server_metrics(0.0).unwrap();
        assert_eq!(rows, vec![m]);
    }

    #[test]
    fn test_agent_metrics_at_most_one_row_per_tick_is_caller_enforced() {
        let (_dir, store) = open_test_store();
        let rows = vec![
            AgentMetric {
                timestamp: 1000.0,
                agent_name: "main".into(),
                model: "opus".into(),
                tokens_used: 126000,
                sessions: 3,
                storage_bytes: 1000,
                is_default: true,
            },
            AgentMetric {
                timestamp: 1000.0,
                agent_name: "rentalops".into(),
                model: "sonnet".into(),
                tokens_used: 65000,
                sessions: 4,
                storage_bytes: 2000,
                is_default: false,
            },
        ];
        store.insert_agent_metrics(&rows).unwrap();
        let latest = store.latest_agent_metrics().unwrap();
        assert_eq!(latest.len(), 2);
    }

    #[test]
    fn test_prune_deletes_old_rows_and_is_idempotent() {
        let (_dir, store) = open_test_store();
        let now = 40.0 * 24.0 * 60.0 * 60.0;
        let old = ServerMetric {
            timestamp: 0.0,
            cpu_percent: 1.0,
            mem_used_mb: 1.0,
            mem_total_mb: 1.0,
            disk_used_gb: 1.0,
            disk_total_gb: 1.0,
            load_1m: 0.0,
            load_5m: 0.0,
            load_15m: 0.0,
        };
        let mut recent = old.clone();
        recent.timestamp = now - 10.0;
        store.insert_server_metric(&old).unwrap();
        store.insert_server_metric(&recent).unwrap();

        let stats = store.prune(now).unwrap();
        assert_eq!(stats.server_metrics, 1);

        let remaining = store.recent_server_metrics(0.0).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].timestamp, now - 10.0);

        // Idempotent: a second prune at the same `now` deletes nothing more.
        let stats2 = store.prune(now).unwrap();
        assert_eq!(stats2.total(), 0);
    }

    #[test]
    fn test_dns_cache_upsert() {
        let (_dir, store) = open_test_store();
        let row = DnsCacheRow {
            ip: "1.2.3.4".into(),
            hostname: "example.com".into(),
            resolved_at: 100.0,
        };
        store.put_dns_cache(&row).unwrap();
        assert_eq!(store.get_dns_cache("1.2.3.4").unwrap(), Some(row.clone()));

        let updated = DnsCacheRow {
            resolved_at: 200.0,
            ..row
        };
        store.put_dns_cache(&updated).unwrap();
        assert_eq!(store.get_dns_cache("1.2.3.4").unwrap(), Some(updated));
    }

    #[test]
    fn test_config_round_trip() {
        let (_dir, store) = open_test_store();
        assert_eq!(store.get_config("theme").unwrap(), None);
        store.set_config("theme", "amber").unwrap();
        assert_eq!(store.get_config("theme").unwrap(), Some("amber".to_string()));
        store.set_config("theme", "phosphor").unwrap();
        assert_eq!(store.get_config("theme").unwrap(), Some("phosphor".to_string()));
    }

    #[test]
    fn test_ports_open_equals_port_scan_rows_for_tick() {
        let (_dir, store) = open_test_store();
        let scans = vec![
            PortScan { timestamp: 500.0, port: 22, service: "ssh".into(), state: "open".into() },
            PortScan { timestamp: 500.0, port: 80, service: "http".into(), state: "open".into() },
        ];
        store.insert_port_scans(&scans).unwrap();
        let rows = store.port_scans_at(500.0).unwrap();
        assert_eq!(rows.len(), 2);
    }
}
