//! DDL for the metrics store. One function per table group, applied in
//! order by [`super::Store::open`]. Kept separate from `mod.rs` so the
//! schema can be read and audited on its own, the way the teacher splits
//! `CREATE TABLE` statements into per-task submodules.

use rusqlite::{Connection, Result as SqlResult};

/// Bumped whenever a DDL change is made. `Store::open` compares this against
/// the value stored in `schema_version` and applies migrations monotonically.
pub const CURRENT_VERSION: i64 = 1;

pub fn apply_all(conn: &Connection) -> SqlResult<()> {
    create_control_tables(conn)?;
    create_time_series_tables(conn)?;
    create_cache_tables(conn)?;
    create_indexes(conn)?;
    Ok(())
}

fn create_control_tables(conn: &Connection) -> SqlResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS config (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
        [],
    )?;
    Ok(())
}

fn create_time_series_tables(conn: &Connection) -> SqlResult<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS server_metrics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp REAL NOT NULL,
            cpu_percent REAL NOT NULL,
            mem_used_mb REAL NOT NULL,
            mem_total_mb REAL NOT NULL,
            disk_used_gb REAL NOT NULL,
            disk_total_gb REAL NOT NULL,
            load_1m REAL NOT NULL,
            load_5m REAL NOT NULL,
            load_15m REAL NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS agent_metrics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp REAL NOT NULL,
            agent_name TEXT NOT NULL,
            model TEXT NOT NULL,
            tokens_used INTEGER NOT NULL,
            sessions INTEGER NOT NULL,
            storage_bytes INTEGER NOT NULL,
            is_default INTEGER NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS cron_metrics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp REAL NOT NULL,
            job_name TEXT NOT NULL,
            status TEXT NOT NULL,
            last_run REAL,
            next_run REAL,
            consecutive_errors INTEGER NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS security_metrics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp REAL NOT NULL,
            ssh_intrusions_24h INTEGER NOT NULL,
            ports_open INTEGER NOT NULL,
            ufw_active INTEGER NOT NULL,
            fail2ban_active INTEGER NOT NULL,
            root_login_enabled INTEGER NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS network_metrics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp REAL NOT NULL,
            active_connections INTEGER NOT NULL,
            unique_ips INTEGER NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS port_scans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp REAL NOT NULL,
            port INTEGER NOT NULL,
            service TEXT NOT NULL,
            state TEXT NOT NULL
        )
        "#,
        [],
    )?;

    Ok(())
}

fn create_cache_tables(conn: &Connection) -> SqlResult<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS dns_cache (
            ip TEXT PRIMARY KEY,
            hostname TEXT NOT NULL,
            resolved_at REAL NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS geo_cache (
            ip TEXT PRIMARY KEY,
            country_code TEXT,
            city TEXT,
            isp TEXT,
            resolved_at REAL NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS attacker_scans (
            ip TEXT PRIMARY KEY,
            open_ports TEXT NOT NULL,
            os_guess TEXT,
            scanned_at REAL NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS sitrep_cache (
            key TEXT PRIMARY KEY,
            payload TEXT NOT NULL,
            cached_at REAL NOT NULL
        )
        "#,
        [],
    )?;

    Ok(())
}

fn create_indexes(conn: &Connection) -> SqlResult<()> {
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_server_metrics_ts ON server_metrics(timestamp)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_agent_metrics_ts ON agent_metrics(timestamp)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_agent_metrics_name_ts ON agent_metrics(agent_name, timestamp)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_cron_metrics_ts ON cron_metrics(timestamp)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_security_metrics_ts ON security_metrics(timestamp)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_network_metrics_ts ON network_metrics(timestamp)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_port_scans_ts ON port_scans(timestamp)",
        [],
    )?;
    Ok(())
}

/// Applies migrations from `from_version` up to [`CURRENT_VERSION`], in order.
/// There is only one schema generation so far; this exists so a future bump
/// has a home that doesn't touch `open()`.
pub fn migrate(conn: &Connection, from_version: i64) -> SqlResult<()> {
    if from_version < 1 {
        apply_all(conn)?;
    }
    Ok(())
}
