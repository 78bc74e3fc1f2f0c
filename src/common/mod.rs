mod sparkline;
mod stopwatch;

pub use sparkline::sparkline;
pub use stopwatch::Stopwatch;

/// Seconds since epoch, as used by every timestamp column in the store.
pub fn now_secs() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
