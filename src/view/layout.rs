//! Terminal-width breakpoints for the dashboard's panel arrangement.
//!
//! The layout is specified by three overlapping-looking bullets (>=120
//! columns get a grid, <120 get two stacked columns, <60 get one column).
//! Read as a partition rather than literally, the three bands are disjoint:
//! >=120 takes the grid case first, leaving "<120" to mean the 60..120 band,
//! and "<60" the remainder.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Three-row grid: Agent Fleet / Server Health / Cron Jobs on one row,
    /// Security / Activity Log / SITREP below.
    Grid,
    /// Two columns, stacked: panels paired up, overflow wraps to new rows.
    TwoColumn,
    /// Single column: panels stacked top to bottom in priority order.
    SingleColumn,
}

const GRID_MIN_COLS: usize = 120;
const TWO_COLUMN_MIN_COLS: usize = 60;

pub fn layout_for_width(columns: usize) -> Layout {
    if columns >= GRID_MIN_COLS {
        Layout::Grid
    } else if columns >= TWO_COLUMN_MIN_COLS {
        Layout::TwoColumn
    } else {
        Layout::SingleColumn
    }
}

/// Panel priority order for `SingleColumn` layout, highest first: the
/// operator's most time-critical information (security, then fleet health)
/// leads when there's only room for one column.
pub const PANEL_PRIORITY: &[&str] = &[
    "security",
    "agent_fleet",
    "server_health",
    "activity_log",
    "cron_jobs",
    "sitrep",
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_grid_at_and_above_120() {
        assert_eq!(layout_for_width(120), Layout::Grid);
        assert_eq!(layout_for_width(200), Layout::Grid);
    }

    #[test]
    fn test_two_column_band() {
        assert_eq!(layout_for_width(119), Layout::TwoColumn);
        assert_eq!(layout_for_width(60), Layout::TwoColumn);
    }

    #[test]
    fn test_single_column_below_60() {
        assert_eq!(layout_for_width(59), Layout::SingleColumn);
        assert_eq!(layout_for_width(1), Layout::SingleColumn);
    }
}
