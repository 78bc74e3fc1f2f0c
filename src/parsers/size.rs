//! Size parser: SI (`K M G T`, 1000x) and binary (`Ki Mi Gi Ti`, 1024x)
//! byte-count suffixes. Total over all inputs: unknown units return `None`
//! rather than panicking.

pub fn parse_size(input: &str) -> Option<u64> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let split_at = input
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(input.len());
    let (number_part, unit_part) = input.split_at(split_at);
    let number: f64 = number_part.parse().ok()?;

    let multiplier: f64 = match unit_part.trim() {
        "" | "B" => 1.0,
        "K" => 1_000.0,
        "M" => 1_000.0 * 1_000.0,
        "G" => 1_000.0 * 1_000.0 * 1_000.0,
        "T" => 1_000.0 * 1_000.0 * 1_000.0 * 1_000.0,
        "Ki" => 1024.0,
        "Mi" => 1024.0 * 1024.0,
        "Gi" => 1024.0 * 1024.0 * 1024.0,
        "Ti" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        _ => return None,
    };

    Some((number * multiplier).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_si_and_binary_equivalence() {
        assert_eq!(parse_size("1024Ki"), parse_size("1Mi"));
    }

    #[test]
    fn test_si_units() {
        assert_eq!(parse_size("1K"), Some(1_000));
        assert_eq!(parse_size("1M"), Some(1_000_000));
        assert_eq!(parse_size("1G"), Some(1_000_000_000));
        assert_eq!(parse_size("1T"), Some(1_000_000_000_000));
    }

    #[test]
    fn test_binary_units() {
        assert_eq!(parse_size("1Ki"), Some(1024));
        assert_eq!(parse_size("1Mi"), Some(1024 * 1024));
        assert_eq!(parse_size("1Gi"), Some(1024 * 1024 * 1024));
    }

    #[test]
    fn test_fractional() {
        assert_eq!(parse_size("1.5K"), Some(1_500));
        assert_eq!(parse_size("7.4Gi"), Some(7_945_751_347));
    }

    #[test]
    fn test_unknown_unit_is_sentinel() {
        assert_eq!(parse_size("1Q"), None);
        assert_eq!(parse_size("abc"), None);
        assert_eq!(parse_size(""), None);
    }

    #[test]
    fn test_bare_bytes() {
        assert_eq!(parse_size("42"), Some(42));
        assert_eq!(parse_size("42B"), Some(42));
    }
}
