use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Current instant as the server expects it: RFC 3339, UTC, milliseconds.
pub fn now_as_iso8601() -> String {
    to_iso8601(Utc::now())
}

pub fn to_iso8601(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Normalize a user supplied bound (`YYYY-MM-DD` or full RFC 3339) into an
/// ISO-8601 timestamp. A bare date means midnight UTC.
pub fn parse_bound(input: &str) -> AppResult<String> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(to_iso8601(dt.with_timezone(&Utc)));
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        && let Some(midnight) = d.and_hms_opt(0, 0, 0)
    {
        return Ok(to_iso8601(midnight.and_utc()));
    }

    Err(AppError::InvalidDate(input.to_string()))
}

pub fn parse_optional_bound(input: Option<&str>) -> AppResult<Option<String>> {
    input.map(parse_bound).transpose()
}

/// Short `YYYY-MM-DD HH:MM` rendering for tables; unparsable input is
/// returned unchanged.
pub fn short(iso: &str) -> String {
    DateTime::parse_from_rfc3339(iso)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| iso.to_string())
}
