//! Trend arrow: a three-valued summary of change over a lag window, plus a
//! fourth "unknown" value for insufficient data.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
    Unknown,
}

impl Trend {
    pub fn arrow(self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Flat => "→",
            Trend::Unknown => "--",
        }
    }
}

/// Compares the latest sample in `series` (timestamp, value) to the one
/// nearest `now - lag_secs`. `↑`/`↓` on a relative change beyond +-5%, `→`
/// otherwise; `Unknown` if there are fewer than 2 samples.
pub fn trend(series: &[(f64, f64)], now: f64, lag_secs: f64) -> Trend {
    if series.len() < 2 {
        return Trend::Unknown;
    }

    let latest = series.last().unwrap();
    let target_ts = now - lag_secs;
    let baseline = series
        .iter()
        .min_by(|a, b| (a.0 - target_ts).abs().partial_cmp(&(b.0 - target_ts).abs()).unwrap())
        .unwrap();

    if baseline.1 == 0.0 {
        return if latest.1 == 0.0 { Trend::Flat } else { Trend::Up };
    }

    let relative_change = (latest.1 - baseline.1) / baseline.1;
    if relative_change > 0.05 {
        Trend::Up
    } else if relative_change < -0.05 {
        Trend::Down
    } else {
        Trend::Flat
    }
}
