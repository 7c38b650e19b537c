//! Display helpers shared by the CLI renderer and the session snapshot.

use chrono::{DateTime, NaiveDate};

/// Rounds to the nearest whole unit with halves going toward positive infinity.
pub fn round_half_up(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor as i64 + 1
    } else {
        floor as i64
    }
}

/// Whole-dollar US currency, e.g. `$120,353` or `-$5,000`.
pub fn format_currency(amount: f64) -> String {
    let rounded = round_half_up(amount);
    let sign = if rounded < 0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(rounded.unsigned_abs()))
}

pub fn format_optional_currency(amount: Option<f64>) -> String {
    match amount {
        Some(value) => format_currency(value),
        None => "N/A".to_string(),
    }
}

pub fn format_rate(rate: f64) -> String {
    format!("{rate:.2}")
}

/// Renders provider dates as `Oct 19, 2026`; anything unparseable is echoed back.
pub fn format_date(raw: &str) -> String {
    let trimmed = raw.trim();
    let parsed = DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok())
        .or_else(|| {
            trimmed
                .get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        });

    match parsed {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
