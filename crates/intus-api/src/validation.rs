//! Input normalization and the bounds shared by the handlers.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use intus_types::models::Mood;

use crate::error::ApiError;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_CONTENT_CHARS: usize = 20_000;
pub const MAX_TAGS: usize = 20;
pub const MAX_NOTE_CHARS: usize = 1_000;
pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_MESSAGE_CHARS: usize = 4_000;
pub const MIN_PASSWORD_CHARS: usize = 8;
pub const MAX_LEVEL: i64 = 10;

pub const DEFAULT_TAKE: i64 = 50;
pub const MAX_TAKE: i64 = 100;
pub const DEFAULT_DAYS: i64 = 7;
pub const MAX_DAYS: i64 = 365;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Trim; an empty result counts as "not supplied".
pub fn trimmed(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub fn truncate_chars(s: String, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s,
    }
}

/// Reject text longer than `max` characters with a message naming the field.
pub fn check_length(value: &str, field: &str, max: usize) -> Result<(), ApiError> {
    if value.chars().count() > max {
        return Err(ApiError::bad_request(format!("{field} must be at most {max} characters")));
    }
    Ok(())
}

pub fn parse_mood(raw: Option<&str>) -> Result<Mood, ApiError> {
    raw.and_then(|m| m.parse().ok())
        .ok_or_else(|| ApiError::bad_request("Invalid mood"))
}

/// Parse an optional catalog `type` filter.
pub fn parse_kind<T: FromStr>(raw: Option<&str>) -> Result<Option<T>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ApiError::bad_request("Invalid type")),
    }
}

/// Stress and energy levels: required, inclusive 0..=10.
pub fn parse_level(raw: Option<i64>, field: &str) -> Result<u8, ApiError> {
    match raw {
        Some(level @ 0..=MAX_LEVEL) => Ok(level as u8),
        _ => Err(ApiError::bad_request(format!("{field} must be 0-{MAX_LEVEL}"))),
    }
}

/// Trim every tag, drop empties and duplicates (first occurrence wins) and
/// keep at most `MAX_TAGS`.
pub fn normalize_tags(raw: Vec<String>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::with_capacity(raw.len().min(MAX_TAGS));
    for tag in raw {
        let tag = tag.trim();
        if tag.is_empty() || tags.iter().any(|t| t == tag) {
            continue;
        }
        tags.push(tag.to_string());
        if tags.len() == MAX_TAGS {
            break;
        }
    }
    tags
}

/// Page size for list endpoints, silently clamped.
pub fn clamp_take(raw: Option<i64>) -> u32 {
    raw.unwrap_or(DEFAULT_TAKE).clamp(1, MAX_TAKE) as u32
}

pub fn clamp_days(raw: Option<i64>) -> i64 {
    raw.unwrap_or(DEFAULT_DAYS).clamp(1, MAX_DAYS)
}
