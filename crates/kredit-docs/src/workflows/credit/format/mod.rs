//! Display formatting for document contexts.
//!
//! Which fields get formatted is decided by static key lists, never by looking at
//! the values. Values that fail to parse are left exactly as they were.

mod conditions;
mod locale;

pub use conditions::{partition_conditions, ConditionLists};
pub use locale::LocaleFormat;

use chrono::{Datelike, NaiveDate};

use super::domain::ApplicationRecord;
use super::numeric::{detect_semantics, try_parse_with};

/// Renders `YYYY-MM-DD` as `DD <Month> YYYY`; anything else is returned unchanged.
pub fn format_date(raw: &str, locale: &LocaleFormat) -> Option<String> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()?;
    let month = locale.month_name(date.month())?;
    Some(format!("{:02} {} {}", date.day(), month, date.year()))
}

/// Groups digits in threes with the locale separator: `1234567` becomes `1.234.567`.
pub fn group_digits(value: i64, locale: &LocaleFormat) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }

    let lead = digits.len() % 3;
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (position + 3 - lead) % 3 == 0 {
            grouped.push(locale.group_separator);
        }
        grouped.push(digit);
    }
    grouped
}

/// Parses a stored amount (integer, or float for derived values) and groups its digits.
pub fn format_currency(raw: &str, locale: &LocaleFormat) -> Option<String> {
    try_parse_with(raw, detect_semantics(raw)).map(|value| group_digits(value, locale))
}

/// Rewrites every present, non-empty date field in place.
pub fn apply_date_pass<'k>(
    fields: &mut ApplicationRecord,
    date_keys: impl IntoIterator<Item = &'k str>,
    locale: &LocaleFormat,
) {
    for key in date_keys {
        if let Some(value) = fields.get_mut(key) {
            if value.trim().is_empty() {
                continue;
            }
            if let Some(formatted) = format_date(value, locale) {
                *value = formatted;
            }
        }
    }
}

/// Rewrites every present, non-empty Rupiah field in place.
pub fn apply_currency_pass<'k>(
    fields: &mut ApplicationRecord,
    currency_keys: impl IntoIterator<Item = &'k str>,
    locale: &LocaleFormat,
) {
    for key in currency_keys {
        if let Some(value) = fields.get_mut(key) {
            if value.trim().is_empty() {
                continue;
            }
            if let Some(formatted) = format_currency(value, locale) {
                *value = formatted;
            }
        }
    }
}
