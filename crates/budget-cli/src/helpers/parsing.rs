//! Parsing helpers for amounts, datetimes, months and colors.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

/// Parse a datetime string (ISO-8601 or YYYY-MM-DD).
pub fn parse_datetime(value: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid date value: {}", value))?;
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
    }

    Err(anyhow::anyhow!(
        "Invalid date/time (expected ISO-8601 or YYYY-MM-DD): {}",
        value
    ))
}

/// Parse a decimal amount, tolerating a leading `$` and thousands commas.
pub fn parse_amount(value: &str) -> anyhow::Result<Decimal> {
    let cleaned: String = value
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    Decimal::from_str(&cleaned).map_err(|_| anyhow::anyhow!("Invalid amount: {}", value))
}

/// Parse a `YYYY-MM` month into `(year, month)`.
pub fn parse_month(value: &str) -> anyhow::Result<(i32, u32)> {
    let invalid = || anyhow::anyhow!("Invalid month (expected YYYY-MM): {}", value);
    let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

/// Parse `#RRGGBB` (the `#` is optional) into a packed RGB color.
pub fn parse_color(value: &str) -> anyhow::Result<u32> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return Err(anyhow::anyhow!("Invalid color (expected #RRGGBB): {}", value));
    }
    u32::from_str_radix(hex, 16)
        .map_err(|_| anyhow::anyhow!("Invalid color (expected #RRGGBB): {}", value))
}
