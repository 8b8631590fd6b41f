use chrono::{NaiveDate, NaiveDateTime};

pub const DATE_FORMAT: &str = "%d.%m.%Y";
pub const DATETIME_FORMAT: &str = "%d.%m.%Y %H:%M";

// Storage cells and chat input go through the same parser, so the list
// covers both the bot's own output formats and common manual entry.
const DATE_ONLY_FORMATS: &[&str] = &["%d.%m.%Y", "%Y-%m-%d", "%d-%m-%Y", "%Y.%m.%d"];

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(parsed) = NaiveDateTime::parse_from_str(text, DATETIME_FORMAT) {
        return Some(parsed.date());
    }

    DATE_ONLY_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(parsed) = NaiveDateTime::parse_from_str(text, DATETIME_FORMAT) {
        return Some(parsed);
    }

    DATE_ONLY_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_datetime(datetime: NaiveDateTime) -> String {
    datetime.format(DATETIME_FORMAT).to_string()
}

/// Parses user-entered hours. Decimal comma is accepted alongside the
/// decimal point; negative values are rejected.
pub fn parse_hours(text: &str) -> Option<f64> {
    let normalized = text.trim().replace(',', ".");
    let value: f64 = normalized.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(value)
}

/// Parses a loosely formatted record id: a leading `#` and float-looking
/// values ("3.0") are tolerated, anything non-numeric is rejected.
pub fn parse_id(text: &str) -> Option<i64> {
    let text = text.trim();
    let text = text.strip_prefix('#').unwrap_or(text).trim();
    let value: f64 = text.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(value as i64)
}

/// Lenient numeric cell parse for the spreadsheet boundary. Malformed
/// cells default to 0.0 instead of failing the whole row.
pub fn parse_float_cell(text: &str) -> f64 {
    text.trim().replace(',', ".").parse().unwrap_or(0.0)
}
