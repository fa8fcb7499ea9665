//! Human-readable durations such as `5s`, `1m30s` or `750ms`.

use std::time::Duration;

/// Unit suffixes and their length in milliseconds. `ms` precedes `m` so it wins
/// the prefix match.
const UNITS: [(&str, u64); 5] = [
    ("ms", 1),
    ("s", 1_000),
    ("m", 60_000),
    ("h", 3_600_000),
    ("d", 86_400_000),
];

/// Parses a sequence of `<number><unit>` groups into a [`Duration`].
///
/// Every number needs a unit. Returns `None` for empty, malformed or overflowing input.
///
/// ```
/// use std::time::Duration;
/// use galaxy_utils::time::parse_duration;
///
/// assert_eq!(parse_duration("1m30s"), Some(Duration::from_secs(90)));
/// ```
pub fn parse_duration(input: &str) -> Option<Duration> {
    let mut rest = input.trim();
    if rest.is_empty() {
        return None;
    }

    let mut total_ms: u64 = 0;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if digits == 0 {
            return None;
        }

        let value: u64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let (unit, factor) = UNITS.iter().find(|(unit, _)| rest.starts_with(unit))?;
        rest = &rest[unit.len()..];

        total_ms = total_ms.checked_add(value.checked_mul(*factor)?)?;
    }

    Some(Duration::from_millis(total_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration("750ms"), Some(Duration::from_millis(750)));
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration("1h1m1s"), Some(Duration::from_secs(3661)));
        assert_eq!(parse_duration(" 1d "), Some(Duration::from_secs(86_400)));
        assert_eq!(parse_duration("0s"), Some(Duration::ZERO));
    }

    #[test]
    fn test_parse_duration_rejects() {
        for input in ["", "5", "s", "10x", "1m30", "fast", "99999999999999999999s"] {
            assert_eq!(parse_duration(input), None, "{input:?}");
        }
    }
}
