use lazy_static::lazy_static;
use regex::Regex;
use time::{macros::format_description, Date, OffsetDateTime};

use crate::error::AppError;

lazy_static! {
    static ref DATE_RE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    static ref MONTH_RE: Regex = Regex::new(r"^\d{4}-(0[1-9]|1[0-2])$").unwrap();
}

/// Accepts `YYYY-MM-DD` naming a real calendar day.
pub fn date(raw: &str) -> Result<String, AppError> {
    let invalid = || AppError::Validation("Invalid date format (required YYYY-MM-DD)".into());
    if !DATE_RE.is_match(raw) {
        return Err(invalid());
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]")).map_err(|_| invalid())?;
    Ok(raw.to_string())
}

pub fn month(raw: &str) -> Result<String, AppError> {
    if !MONTH_RE.is_match(raw) {
        return Err(AppError::Validation(
            "Invalid month format (required YYYY-MM)".into(),
        ));
    }
    Ok(raw.to_string())
}

/// `YYYY-MM` of an already validated date.
pub fn month_of(date: &str) -> &str {
    &date[..7]
}

pub fn today() -> String {
    let today = OffsetDateTime::now_utc().date();
    today
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| today.to_string())
}

/// Trim and lower-case free text; the result is what gets stored and hashed.
pub fn normalize_input(raw: &str) -> String {
    raw.trim().to_lowercase()
}
