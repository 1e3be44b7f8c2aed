// src/utils/date.rs

//! Lenient parsing of the "last updated" dates found in salary tables.

use std::sync::OnceLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;

use super::normalize_whitespace;

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%d-%m-%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
];

/// Earliest year accepted from a format parse.
///
/// chrono's `%Y` accepts two digits, so "March 2018" matches `%B %d %Y` as
/// day 20 of year 18.
const MIN_YEAR: i32 = 1000;

static ORDINAL_SUFFIX: OnceLock<Option<Regex>> = OnceLock::new();
static BARE_YEAR: OnceLock<Option<Regex>> = OnceLock::new();

fn ordinal_suffix() -> Option<&'static Regex> {
    ORDINAL_SUFFIX
        .get_or_init(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").ok())
        .as_ref()
}

fn bare_year() -> Option<&'static Regex> {
    BARE_YEAR
        .get_or_init(|| Regex::new(r"^(\d{4})$").ok())
        .as_ref()
}

/// Parse a date cell in any of the formats the site has used.
///
/// Month-only and year-only values resolve to the first day of the period.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let mut text = normalize_whitespace(raw);
    if text.is_empty() {
        return None;
    }
    if let Some(re) = ordinal_suffix() {
        text = re.replace_all(&text, "$1").into_owned();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
        return Some(dt.date_naive());
    }

    for fmt in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&text, fmt) {
            return Some(dt.date());
        }
    }

    let month_year = format!("1 {text}");
    let slash_month_year = format!("01/{text}");
    let candidates = DATE_FORMATS
        .iter()
        .map(|fmt| (text.as_str(), *fmt))
        // Month and year only
        .chain([
            (month_year.as_str(), "%d %B %Y"),
            (month_year.as_str(), "%d %b %Y"),
            (slash_month_year.as_str(), "%d/%m/%Y"),
        ]);

    for (input, fmt) in candidates {
        if let Ok(date) = NaiveDate::parse_from_str(input, fmt) {
            if date.year() >= MIN_YEAR {
                return Some(date);
            }
        }
    }

    let caps = bare_year()?.captures(&text)?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, 1, 1)
}

/// Calendar year of a date cell, `None` when it does not parse.
pub fn parse_year(raw: &str) -> Option<i32> {
    parse_date(raw).map(|date| date.year())
}
