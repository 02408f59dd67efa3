//! Free-form duration cells to whole minutes.
//!
//! Accepted, in order:
//!
//! 1. `H:MM:SS` (hours, minutes, seconds) or `M:SS` (minutes, seconds)
//! 2. a plain number, `,` accepted as decimal separator: minutes, or a
//!    fraction of a day when it is at most 1 and has a decimal part
//!
//! Results are rounded up; anything else is `None`.

use once_cell::sync::Lazy;
use regex::Regex;

static CLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,3}):(\d{2})(?::(\d{2}))?$").expect("valid clock regex"));

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("valid number regex"));

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Parse a duration cell into minutes.
pub fn parse_minutes(raw: Option<&str>) -> Option<u32> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(caps) = CLOCK_RE.captures(s) {
        let first: u64 = caps[1].parse().ok()?;
        let second: u64 = caps[2].parse().ok()?;
        let total_seconds = match caps.get(3) {
            Some(third) => first * 3600 + second * 60 + third.as_str().parse::<u64>().ok()?,
            // two groups read as minutes and seconds
            None => first * 60 + second,
        };
        if total_seconds == 0 {
            return None;
        }
        return u32::try_from(total_seconds.div_ceil(60).max(1)).ok();
    }

    let numeric = s.replacen(',', ".", 1);
    if !NUMBER_RE.is_match(&numeric) {
        return None;
    }
    let value: f64 = numeric.parse().ok()?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }

    let minutes = if value <= 1.0 && numeric.contains('.') {
        ceil_snapped(value * MINUTES_PER_DAY).max(1.0)
    } else {
        ceil_snapped(value)
    };

    if minutes > u32::MAX as f64 {
        return None;
    }
    Some(minutes as u32)
}

/// Ceiling that ignores floating-point noise just above an integer.
fn ceil_snapped(value: f64) -> f64 {
    let rounded = value.round();
    if (value - rounded).abs() < 1e-9 {
        rounded
    } else {
        value.ceil()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Option<u32> {
        parse_minutes(Some(s))
    }

    #[test]
    fn test_clock_formats() {
        assert_eq!(p("00:09:06"), Some(10));
        assert_eq!(p("09:06"), Some(10));
        assert_eq!(p("1:30:00"), Some(90));
        assert_eq!(p("0:00:01"), Some(1));
        assert_eq!(p("120:00"), Some(120));
    }

    #[test]
    fn test_zero_clock_is_none() {
        assert_eq!(p("00:00"), None);
        assert_eq!(p("0:00:00"), None);
    }

    #[test]
    fn test_malformed_clock_is_none() {
        assert_eq!(p("9:6"), None);
        assert_eq!(p("1234:00"), None);
        assert_eq!(p("1:00:00:00"), None);
    }

    #[test]
    fn test_plain_minutes() {
        assert_eq!(p("15"), Some(15));
        assert_eq!(p("15,5"), Some(16));
        assert_eq!(p("15.5"), Some(16));
        assert_eq!(p(" 45 "), Some(45));
        assert_eq!(p("1"), Some(1));
    }

    #[test]
    fn test_fraction_of_day() {
        assert_eq!(p("0.00625"), Some(9));
        assert_eq!(p("0,5"), Some(720));
        assert_eq!(p("0.0000001"), Some(1));
    }

    #[test]
    fn test_non_positive_and_garbage() {
        assert_eq!(parse_minutes(None), None);
        assert_eq!(p(""), None);
        assert_eq!(p("   "), None);
        assert_eq!(p("abc"), None);
        assert_eq!(p("0"), None);
        assert_eq!(p("0.0"), None);
        assert_eq!(p("-5"), None);
        assert_eq!(p("15 min"), None);
    }
}
