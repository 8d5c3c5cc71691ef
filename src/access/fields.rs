use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use mongodb::bson::{self, oid::ObjectId};
use regex::Regex;

use crate::error::AppError;

const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Accepts RFC 3339, browser `datetime-local` values (read as UTC) and plain
/// dates.
pub fn parse_date(field: &str, raw: &str) -> Result<bson::DateTime, AppError> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(bson::DateTime::from_chrono(parsed.with_timezone(&Utc)));
    }
    for format in LOCAL_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(bson::DateTime::from_chrono(Utc.from_utc_datetime(&parsed)));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| bson::DateTime::from_chrono(Utc.from_utc_datetime(&midnight)))
        .ok_or_else(|| AppError::invalid(field, format!("`{raw}` is not a date")))
}

pub fn parse_reference(field: &str, raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw.trim())
        .map_err(|_| AppError::invalid(field, format!("`{raw}` is not a valid id")))
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^([a-z0-9_+]([a-z0-9_+.\-]*[a-z0-9_+])?)@([a-z0-9]+([\-\.]{1}[a-z0-9]+)*\.[a-z]{2,6})$",
        )
        .expect("email pattern compiles")
    })
}

/// Trims and lower-cases an address, rejecting anything that does not look
/// like one.
pub fn normalize_email(field: &str, raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if email_pattern().is_match(&email) {
        Ok(email)
    } else {
        Err(AppError::invalid(field, format!("`{raw}` is not an email address")))
    }
}

pub fn trimmed(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

pub fn to_utc(value: bson::DateTime) -> DateTime<Utc> {
    value.to_chrono()
}
