use anyhow::{Context, anyhow};
use chrono::{Datelike, Local, NaiveDate};

/// The current calendar day in the local timezone. Streak comparisons and
/// overdue checks are all anchored to this.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(input: &str) -> anyhow::Result<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("today") {
        return Ok(today());
    }
    if trimmed.eq_ignore_ascii_case("tomorrow") {
        return today()
            .succ_opt()
            .ok_or_else(|| anyhow!("date out of range"));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .with_context(|| format!("invalid date (expected YYYY-MM-DD): {trimmed}"))
}

/// Parses `YYYY-MM` for the month calendar view.
pub fn parse_month(input: &str) -> anyhow::Result<(i32, u32)> {
    let trimmed = input.trim();
    let (year, month) = trimmed
        .split_once('-')
        .ok_or_else(|| anyhow!("invalid month (expected YYYY-MM): {trimmed}"))?;
    let year: i32 = year
        .parse()
        .with_context(|| format!("invalid year in month: {trimmed}"))?;
    let month: u32 = month
        .parse()
        .with_context(|| format!("invalid month in: {trimmed}"))?;
    if !(1..=12).contains(&month) {
        return Err(anyhow!("month out of range: {month}"));
    }
    Ok((year, month))
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Long form used by agenda headers, e.g. "Friday, November 28, 2025".
pub fn format_date_long(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}
