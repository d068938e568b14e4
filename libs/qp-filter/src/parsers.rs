//! Value parsers for [`FilterRule`](crate::FilterRule)s.
//!
//! Every parser takes the raw parameter value and returns either the typed
//! value or a [`ParseError`] whose message is shown to the client.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::errors::ParseError;

/// Upper bound on the number of distinct values [`area_range`] may produce.
pub const AREA_RANGE_MAX_VALUES: usize = 500;

/// Qualifier letter for entrance numbers (Cyrillic capital EN).
pub const QUALIFIER_ENTRANCE: char = '\u{041d}';
/// Qualifier letter for apartment-type numbers (Cyrillic capital PE).
pub const QUALIFIER_APARTMENT: char = '\u{041f}';

/// # Errors
/// Fails when `raw` is not a UUID.
pub fn uuid(raw: &str) -> Result<Uuid, ParseError> {
    Uuid::parse_str(raw.trim()).map_err(|e| ParseError::new(format!("'{raw}' is not a valid id: {e}")))
}

/// # Errors
/// Fails on anything but `true`, `false`, `1` or `0`.
pub fn boolean(raw: &str) -> Result<bool, ParseError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ParseError::new(format!("'{raw}' is not a boolean"))),
    }
}

/// # Errors
/// Fails when `raw` is not a base-10 integer.
pub fn integer(raw: &str) -> Result<i64, ParseError> {
    raw.trim()
        .parse()
        .map_err(|_| ParseError::new(format!("'{raw}' is not an integer")))
}

/// # Errors
/// Fails on blank input.
pub fn non_empty_string(raw: &str) -> Result<String, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::new("value must not be empty"));
    }
    Ok(trimmed.to_owned())
}

/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` date meaning midnight UTC.
///
/// # Errors
/// Fails when `raw` is neither a date nor an RFC 3339 timestamp.
pub fn datetime(raw: &str) -> Result<DateTime<Utc>, ParseError> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ParseError::new(format!("'{raw}' is not a date or RFC 3339 timestamp")))
}

/// Parser for any `FromStr` type, typically an enum of allowed values.
///
/// # Errors
/// Fails with the message of `T::Err`.
pub fn from_str<T>(raw: &str) -> Result<T, ParseError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ParseError::new(format!("'{raw}': {e}")))
}

/// Expand an apartment/entrance number list such as `1-3, 7, 80` with optional qualifier letters.
///
/// Tokens are comma separated. A hyphenated token joins two single-digit
/// numbers and may carry a trailing qualifier letter, which is re-appended to
/// every number of the inclusive range. A plain token must be numeric once a
/// trailing qualifier is stripped. Qualifiers are normalized to upper case.
///
/// The result is a set: duplicates collapse and input order is not kept.
///
/// # Errors
/// Fails on malformed tokens, on reversed ranges such as `7-5` and when
/// more than [`AREA_RANGE_MAX_VALUES`] distinct values would be produced.
pub fn area_range(raw: &str) -> Result<BTreeSet<String>, ParseError> {
    let mut out = BTreeSet::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let (body, qualifier) = split_qualifier(token);
        if let Some((start, end)) = body.split_once('-') {
            let start = single_digit(start, token)?;
            let end = single_digit(end, token)?;
            if start > end {
                return Err(ParseError::new(format!(
                    "'{token}': range start must not exceed its end"
                )));
            }
            for n in start..=end {
                out.insert(format!("{n}{qualifier}"));
            }
        } else {
            if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit()) {
                return Err(ParseError::new(format!("'{token}' is not a valid number")));
            }
            out.insert(format!("{body}{qualifier}"));
        }
        if out.len() > AREA_RANGE_MAX_VALUES {
            return Err(ParseError::new(format!(
                "too many values, at most {AREA_RANGE_MAX_VALUES} are allowed"
            )));
        }
    }
    Ok(out)
}

fn split_qualifier(token: &str) -> (&str, String) {
    if let Some(last) = token.chars().last() {
        let upper: String = last.to_uppercase().collect();
        if upper == QUALIFIER_ENTRANCE.to_string() || upper == QUALIFIER_APARTMENT.to_string() {
            let body = &token[..token.len() - last.len_utf8()];
            return (body.trim_end(), upper);
        }
    }
    (token, String::new())
}

fn single_digit(side: &str, token: &str) -> Result<u32, ParseError> {
    let side = side.trim();
    let mut chars = side.chars();
    match (chars.next().and_then(|c| c.to_digit(10)), chars.next()) {
        (Some(d), None) => Ok(d),
        _ => Err(ParseError::new(format!(
            "'{token}': range bounds must be single digits"
        ))),
    }
}
