/// Width-bounded sequence of Unicode block glyphs encoding a numeric series' shape.
const BLOCKS: &[char] = &['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Maps `values` into the 8-level block glyph set by normalizing to the
/// observed min/max of the last `width` samples. If all sampled values are
/// equal, emits the lowest glyph repeated (never the "hot" middle glyph --
/// a flat series at a low value should not read as busy).
pub fn sparkline(values: &[f64], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }

    let samples = &values[values.len().saturating_sub(width)..];

    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    samples
        .iter()
        .map(|&v| {
            if range == 0.0 {
                BLOCKS[0]
            } else {
                let idx = ((v - min) / range * (BLOCKS.len() - 1) as f64).round() as usize;
                BLOCKS[idx.min(BLOCKS.len() - 1)]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty() {
        assert_eq!(sparkline(&[], 10), "");
    }

    #[test]
    fn test_len_is_min_width_and_data() {
        let xs = vec![1.0, 2.0, 3.0];
        assert_eq!(sparkline(&xs, 10).chars().count(), 3);
        assert_eq!(sparkline(&xs, 2).chars().count(), 2);
    }

    #[test]
    fn test_all_equal_emits_lowest_glyph() {
        let xs = vec![5.0, 5.0, 5.0];
        assert_eq!(sparkline(&xs, 10), "▁▁▁");
    }

    #[test]
    fn test_monotonic_increase_ends_high() {
        let xs = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let s = sparkline(&xs, 5);
        assert_eq!(s.chars().next().unwrap(), BLOCKS[0]);
        assert_eq!(s.chars().last().unwrap(), BLOCKS[BLOCKS.len() - 1]);
    }

    #[test]
    fn test_width_truncates_to_newest() {
        let xs = vec![100.0, 0.0, 0.0, 0.0, 100.0];
        // only the trailing 2 samples are considered for width=2
        let s = sparkline(&xs, 2);
        assert_eq!(s.chars().count(), 2);
    }

    #[test]
    fn test_all_chars_in_block_set() {
        let xs = vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        for c in sparkline(&xs, 8).chars() {
            assert!(BLOCKS.contains(&c));
        }
    }
}
