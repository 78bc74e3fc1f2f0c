use std::io::Write as _;
use std::panic::PanicHookInfo;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use backtrace::Backtrace;
use flexi_logger::{FileSpec, Logger, WriteMode};

use galactic_cic::cli::{self, Command, DbAction, ExitCode};
use galactic_cic::collectors::{CollectorContext, GeoRateLimiter, NmapActive};
use galactic_cic::config;
use galactic_cic::scheduler::{DaemonHealth, Scheduler};
use galactic_cic::store::Store;

/// Mirrors the teacher's debug-build panic hook: on a panic, leave the
/// terminal in a sane state and print the panic location plus a backtrace
/// before the process exits.
fn panic_hook(info: &PanicHookInfo<'_>) {
    if cfg!(debug_assertions) {
        let location = info.location();
        let msg = match info.payload().downcast_ref::<&'static str>() {
            Some(s) => *s,
            None => match info.payload().downcast_ref::<String>() {
                Some(s) => s.as_str(),
                None => "Box<Any>",
            },
        };
        let stacktrace = format!("{:?}", Backtrace::new());
        let _ = writeln!(
            std::io::stderr(),
            "galactic-cic panicked at '{msg}', {location:?}\n{stacktrace}"
        );
    }
}

fn main() {
    std::panic::set_hook(Box::new(panic_hook));

    let cli = cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("building tokio runtime");

    let code = match runtime.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("galactic-cic: {e:#}");
            ExitCode::Operational
        }
    };

    std::process::exit(code.code());
}

async fn run(cli: cli::Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Start => start().await,
        Command::Stop => stop().await,
        Command::Restart => {
            let _ = stop().await;
            start().await
        }
        Command::Status => status().await,
        Command::Dashboard => dashboard(),
        Command::Collect => collect().await,
        Command::Db { action } => db(action),
        Command::Logs { follow, lines } => logs(follow, lines),
        Command::Install => install(),
        Command::Version => version(),
    }
}

fn init_logging() -> Result<()> {
    let log_path = config::log_path()?;
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent).context("creating log directory")?;
    }
    Logger::try_with_env_or_str("info")
        .context("building logger from environment")?
        .log_to_file(FileSpec::try_from(log_path)?)
        .write_mode(WriteMode::BufferAndFlush)
        .format(flexi_logger::detailed_format)
        .start()
        .context("starting flexi_logger")?;
    Ok(())
}

async fn open_store() -> Result<Arc<Store>> {
    let path = config::database_path()?;
    let store = Store::open(path).context("opening metrics store")?;
    Ok(Arc::new(store))
}

fn build_context(store: Arc<Store>) -> CollectorContext {
    CollectorContext {
        store,
        single_flight: galactic_cic::cache::SingleFlight::new(),
        http: reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("building HTTP client"),
        nmap_active: NmapActive::new(),
        geo_rate_limiter: GeoRateLimiter::new(),
    }
}

async fn start() -> Result<ExitCode> {
    // Category 7 of the Error Handling Design (fatal at startup): any
    // failure here is unrecoverable for this invocation, so it returns
    // exit code 3 directly rather than propagating as a generic error.
    let home = match config::home_dir() {
        Ok(home) => home,
        Err(e) => {
            eprintln!("galactic-cic: {e:#}");
            return Ok(ExitCode::Precondition);
        }
    };
    if let Err(e) = std::fs::create_dir_all(&home).with_context(|| format!("creating {}", home.display())) {
        eprintln!("galactic-cic: {e:#}");
        return Ok(ExitCode::Precondition);
    }

    init_logging()?;

    let store = match open_store().await {
        Ok(store) => store,
        Err(e) => {
            eprintln!("galactic-cic: {e:#}");
            return Ok(ExitCode::Precondition);
        }
    };

    let pid_path = config::pid_path()?;
    std::fs::write(&pid_path, std::process::id().to_string()).context("writing PID file")?;

    let ctx = build_context(store);
    let health = DaemonHealth::new();
    let scheduler = Scheduler::new(ctx, health);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .context("installing SIGTERM handler")?;

    log::info!("galactic-cic daemon starting");

    tokio::select! {
        _ = scheduler.run(shutdown_rx) => {}
        _ = tokio::signal::ctrl_c() => {
            let _ = shutdown_tx.send(true);
        }
        _ = sigterm.recv() => {
            let _ = shutdown_tx.send(true);
        }
    }

    let _ = std::fs::remove_file(&pid_path);
    log::info!("galactic-cic daemon stopped");
    Ok(ExitCode::Success)
}

async fn stop() -> Result<ExitCode> {
    let pid_path = config::pid_path()?;
    let pid = match std::fs::read_to_string(&pid_path) {
        Ok(s) => s.trim().to_string(),
        Err(_) => {
            eprintln!("galactic-cic: no daemon running (no PID file)");
            return Ok(ExitCode::Operational);
        }
    };

    let result = galactic_cic::runner::run(&["kill", "-TERM", &pid], Duration::from_secs(5)).await;
    if result.outcome != galactic_cic::runner::Outcome::Ok {
        eprintln!("galactic-cic: failed to signal daemon (pid {pid}): {:?}", result.outcome);
        return Ok(ExitCode::Operational);
    }

    let _ = std::fs::remove_file(&pid_path);
    Ok(ExitCode::Success)
}

async fn status() -> Result<ExitCode> {
    let pid_path = config::pid_path()?;
    let running = pid_path.exists();
    println!("daemon: {}", if running { "running" } else { "stopped" });

    let store = match open_store().await {
        Ok(store) => store,
        Err(e) => {
            println!("store: unreadable ({e})");
            return Ok(ExitCode::Precondition);
        }
    };

    let stats = store.stats().context("reading store stats")?;
    println!("store: {} rows, {} bytes", stats.total_rows, stats.file_size_bytes);
    // The daemon's in-process DaemonHealth does not survive across
    // processes; a persisted degraded flag would require a schema change
    // out of scope here, so `status` from a separate process reports store
    // reachability only. A same-process `collect` additionally reports the
    // live health counter (see `collect`).
    Ok(if running { ExitCode::Success } else { ExitCode::Operational })
}

fn dashboard() -> Result<ExitCode> {
    let store = Arc::new(Store::open(config::database_path()?).context("opening metrics store")?);
    let nmap_active = NmapActive::new();
    let config_path = config::config_path()?;
    let config = config::Config::load(&config_path)?;
    galactic_cic::view::run(store, nmap_active, config, config_path)?;
    Ok(ExitCode::Success)
}

async fn collect() -> Result<ExitCode> {
    let store = open_store().await?;
    let ctx = build_context(store);
    let health = DaemonHealth::new();
    let scheduler = Scheduler::new(ctx, health.clone());

    let results = scheduler.run_once().await;
    let mut any_failed = false;
    for (name, outcome) in &results {
        println!("{name}: {outcome:?}");
        any_failed |= matches!(outcome, galactic_cic::collectors::CollectorOutcome::Failed { .. });
    }
    if health.is_degraded() {
        println!("daemon: degraded (>=10 consecutive write failures)");
    }
    Ok(if any_failed { ExitCode::Operational } else { ExitCode::Success })
}

fn db(action: DbAction) -> Result<ExitCode> {
    let path = config::database_path()?;
    match action {
        DbAction::Path => {
            println!("{}", path.display());
            Ok(ExitCode::Success)
        }
        DbAction::Stats => {
            let store = match Store::open(&path) {
                Ok(s) => s,
                Err(e) => {
                    println!("store unreadable: {e}");
                    return Ok(ExitCode::Precondition);
                }
            };
            let stats = store.stats()?;
            println!("rows: {}", stats.total_rows);
            println!("size: {} bytes", stats.file_size_bytes);
            Ok(ExitCode::Success)
        }
        DbAction::Prune => {
            let store = match Store::open(&path) {
                Ok(s) => s,
                Err(e) => {
                    println!("store unreadable: {e}");
                    return Ok(ExitCode::Precondition);
                }
            };
            let stats = store.prune(galactic_cic::common::now_secs())?;
            println!("pruned {} rows", stats.total());
            Ok(ExitCode::Success)
        }
    }
}

fn logs(follow: bool, lines: usize) -> Result<ExitCode> {
    let path = config::log_path()?;
    let contents = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let tail: Vec<&str> = contents.lines().rev().take(lines).collect();
    for line in tail.into_iter().rev() {
        println!("{line}");
    }

    if follow {
        // A minimal poll loop: re-read and print any lines appended since
        // the last check. Stops only on Ctrl-C (handled by the process'
        // default SIGINT behavior, since this path has no long-lived async
        // work to cancel).
        let mut last_len = contents.len();
        loop {
            std::thread::sleep(Duration::from_millis(500));
            let Ok(updated) = std::fs::read_to_string(&path) else {
                continue;
            };
            if updated.len() > last_len {
                print!("{}", &updated[last_len..]);
                last_len = updated.len();
            }
        }
    }

    Ok(ExitCode::Success)
}

fn install() -> Result<ExitCode> {
    let exe = std::env::current_exe()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "galactic-cic".to_string());
    println!(
        r#"[Unit]
Description=GalacticCIC collector daemon

[Service]
ExecStart={exe} start
Restart=on-failure
RestartSec=5

[Install]
WantedBy=default.target
"#
    );
    Ok(ExitCode::Success)
}

fn version() -> Result<ExitCode> {
    println!("galactic-cic {}", env!("CARGO_PKG_VERSION"));
    Ok(ExitCode::Success)
}
