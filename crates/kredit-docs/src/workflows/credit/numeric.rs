//! Tolerant numeric parsing for form values.
//!
//! Raw form input uses `.` as a thousands separator and never carries a decimal
//! part. Values produced by the derivation step (ratios, 90% capacity) are plain
//! floats where `.` is a decimal point. Which reading applies is decided by the
//! call site; every parser here degrades to zero instead of failing.

/// How a `.` inside a numeric string should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericSemantics {
    /// `.` groups thousands: `"1.000.000"` is one million.
    Grouped,
    /// `.` is a decimal point; the fractional part is truncated.
    DecimalTruncated,
}

/// Parses with the semantics chosen by the caller.
pub fn parse_with(raw: &str, semantics: NumericSemantics) -> i64 {
    try_parse_with(raw, semantics).unwrap_or(0)
}

/// Strict form of [`parse_with`]: `None` instead of zero for unparsable input.
pub fn try_parse_with(raw: &str, semantics: NumericSemantics) -> Option<i64> {
    let trimmed = raw.trim();
    match semantics {
        NumericSemantics::Grouped => trimmed
            .chars()
            .filter(|ch| *ch != '.')
            .collect::<String>()
            .parse::<i64>()
            .ok(),
        NumericSemantics::DecimalTruncated => trimmed
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(|value| value.trunc() as i64),
    }
}

/// Strips `.` separators and parses an integer. Anything unparsable is `0`.
pub fn parse_grouped(raw: &str) -> i64 {
    parse_with(raw, NumericSemantics::Grouped)
}

/// Parses a float with `.` as decimal point and truncates toward zero.
pub fn parse_decimal_truncated(raw: &str) -> i64 {
    parse_with(raw, NumericSemantics::DecimalTruncated)
}

/// Reads an annual percentage rate typed the Indonesian way: `.` groups digits
/// and `,` separates decimals (`"6,5"` is six and a half percent).
///
/// A lone `.` followed by one or two digits, with no `,` present, is a decimal
/// point instead (`"6.5"`).
pub fn parse_rate_percent(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let cleaned: String = if has_decimal_point_rate(trimmed) {
        trimmed.to_string()
    } else {
        trimmed
            .chars()
            .filter(|ch| *ch != '.')
            .map(|ch| if ch == ',' { '.' } else { ch })
            .collect()
    };
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

fn has_decimal_point_rate(raw: &str) -> bool {
    if raw.contains(',') {
        return false;
    }
    match raw.split_once('.') {
        Some((_, fraction)) => {
            (1..=2).contains(&fraction.len()) && fraction.chars().all(|ch| ch.is_ascii_digit())
        }
        None => false,
    }
}

/// Picks the reading for an already-stored value by looking for a decimal point.
///
/// Only the currency formatter uses this; form parsing always knows its semantics.
pub fn detect_semantics(raw: &str) -> NumericSemantics {
    if raw.contains('.') {
        NumericSemantics::DecimalTruncated
    } else {
        NumericSemantics::Grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouped_strips_separators() {
        assert_eq!(parse_grouped("1.000.000"), 1_000_000);
        assert_eq!(parse_grouped(" 250000 "), 250_000);
        assert_eq!(parse_grouped("-1.500"), -1_500);
    }

    #[test]
    fn grouped_falls_back_to_zero() {
        assert_eq!(parse_grouped(""), 0);
        assert_eq!(parse_grouped("abc"), 0);
        assert_eq!(parse_grouped("12,5"), 0);
    }

    #[test]
    fn decimal_truncates() {
        assert_eq!(parse_decimal_truncated("23.99"), 23);
        assert_eq!(parse_decimal_truncated("4500000.0"), 4_500_000);
        assert_eq!(parse_decimal_truncated("-7.8"), -7);
        assert_eq!(parse_decimal_truncated("n/a"), 0);
    }

    #[test]
    fn same_text_reads_differently_per_semantics() {
        assert_eq!(parse_with("1.500", NumericSemantics::Grouped), 1_500);
        assert_eq!(parse_with("1.500", NumericSemantics::DecimalTruncated), 1);
    }

    #[test]
    fn rate_accepts_decimal_comma() {
        assert_eq!(parse_rate_percent("6,5"), 6.5);
        assert_eq!(parse_rate_percent("9"), 9.0);
        assert_eq!(parse_rate_percent(""), 0.0);
        assert_eq!(parse_rate_percent("enam"), 0.0);
    }

    #[test]
    fn rate_accepts_a_short_decimal_point() {
        assert_eq!(parse_rate_percent("6.5"), 6.5);
        assert_eq!(parse_rate_percent(" 12.75 "), 12.75);
        assert_eq!(parse_rate_percent("1.250"), 1250.0);
        assert_eq!(parse_rate_percent("1.000,5"), 1000.5);
    }

    #[test]
    fn detection_only_looks_for_a_decimal_point() {
        assert_eq!(detect_semantics("1000000"), NumericSemantics::Grouped);
        assert_eq!(detect_semantics("12.34"), NumericSemantics::DecimalTruncated);
        let detected = |raw: &str| try_parse_with(raw, detect_semantics(raw));
        assert_eq!(detected("1.000.000"), None);
        assert_eq!(detected("900000.5"), Some(900_000));
        assert_eq!(detected("4500000"), Some(4_500_000));
    }
}
