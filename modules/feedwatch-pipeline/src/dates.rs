use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use feedwatch_common::{render_value, FeedError, Record, Result};
use regex::Regex;
use serde_json::Value;

/// Canonical output format for every normalized date field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// Timestamps carrying a numeric offset, with or without a colon.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
];

const DATETIME_FORMATS: &[&str] = &[
    "%d/%b/%Y %H:%M:%S",
    "%d/%b/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%a, %d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%b/%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%a, %d %b %Y",
];

// d/m/Y or m/d/Y, optionally followed by a time of day.
static NUMERIC_SLASH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})(?:[ T]\d{1,2}:\d{2}(?::\d{2})?)?$").unwrap()
});

/// Best-effort parse of a free-form feed date to a calendar date.
///
/// Returns `None` when nothing matches, or when a numeric `a/b/yyyy` date
/// could be read either day-first or month-first.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Some(dt) = parse_rfc2822_lenient(raw) {
        return Some(dt.date_naive());
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt.date_naive());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt.date());
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    {
        return Some(date);
    }

    parse_numeric_slash(raw)
}

/// RFC 2822, ignoring a weekday that disagrees with the date.
fn parse_rfc2822_lenient(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt);
    }
    let (weekday, rest) = raw.split_once(',')?;
    if weekday.len() != 3 || !weekday.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    DateTime::parse_from_rfc2822(rest.trim_start()).ok()
}

fn parse_numeric_slash(raw: &str) -> Option<NaiveDate> {
    let caps = NUMERIC_SLASH_RE.captures(raw)?;
    let first: u32 = caps[1].parse().ok()?;
    let second: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;

    let day_first = NaiveDate::from_ymd_opt(year, second, first);
    let month_first = NaiveDate::from_ymd_opt(year, first, second);
    match (day_first, month_first) {
        (Some(a), Some(b)) if a == b => Some(a),
        (Some(_), Some(_)) => None,
        (Some(date), None) | (None, Some(date)) => Some(date),
        (None, None) => None,
    }
}

/// Rewrite every declared date field present in each record to `YYYY-MM-DD`.
///
/// Null fields stay null. Any value that cannot be read as a date fails the
/// whole batch.
pub fn normalize_dates(records: Vec<Record>, date_fields: &[&str]) -> Result<Vec<Record>> {
    records
        .into_iter()
        .map(|mut record| {
            for field in date_fields {
                let normalized = match record.get(field) {
                    None | Some(Value::Null) => continue,
                    Some(Value::String(raw)) => parse_date(raw),
                    Some(_) => None,
                };
                match normalized {
                    Some(date) => {
                        record.insert(*field, date.format(DATE_FORMAT).to_string());
                    }
                    None => {
                        let value = record.get(field).map(render_value).unwrap_or_default();
                        return Err(FeedError::DateParse {
                            field: field.to_string(),
                            value,
                        });
                    }
                }
            }
            Ok(record)
        })
        .collect()
}
