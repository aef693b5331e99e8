//! Duration literals used in `config` lines (`15m`, `1h30m`, `1d 2h`).

use std::sync::LazyLock;

use chrono::Duration;
use regex::Regex;
use thiserror::Error;

/// A whole literal: one or more `<integer><unit>` pairs, optionally separated by whitespace.
static LITERAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:\d+[dhms]\s*)+$").unwrap());

/// A single `<integer><unit>` pair.
static PART_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+)([dhms])").unwrap());

/// Errors from parsing a duration literal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    /// The text is not a sequence of `<integer><unit>` pairs.
    #[error("invalid time interval expression: {0:?}")]
    Invalid(String),

    /// The literal does not fit in a duration.
    #[error("time interval expression is too large: {0:?}")]
    Overflow(String),
}

/// Parses a duration literal such as `5m`, `1h30m` or `1d 2H`.
///
/// Units are `d`, `h`, `m` and `s` (case-insensitive). A bare integer is
/// rejected.
pub fn parse_duration(text: &str) -> Result<Duration, DurationParseError> {
    let trimmed = text.trim();
    if !LITERAL_RE.is_match(trimmed) {
        return Err(DurationParseError::Invalid(text.to_string()));
    }

    let overflow = || DurationParseError::Overflow(text.to_string());
    let mut total_seconds: i64 = 0;
    for caps in PART_RE.captures_iter(trimmed) {
        let amount: i64 = caps[1].parse().map_err(|_| overflow())?;
        let unit_seconds = match caps[2].to_ascii_lowercase().as_str() {
            "d" => 86_400,
            "h" => 3_600,
            "m" => 60,
            _ => 1,
        };
        total_seconds = amount
            .checked_mul(unit_seconds)
            .and_then(|seconds| total_seconds.checked_add(seconds))
            .ok_or_else(overflow)?;
    }

    Duration::try_seconds(total_seconds).ok_or_else(overflow)
}

/// Formats a duration as the shortest literal [`parse_duration`] reads back.
///
/// Sub-second precision is dropped; negative durations are written as their
/// absolute value.
pub fn format_duration(duration: Duration) -> String {
    let mut seconds = duration.num_seconds().unsigned_abs();
    if seconds == 0 {
        return "0s".to_string();
    }

    let mut out = String::new();
    for (unit, size) in [("d", 86_400), ("h", 3_600), ("m", 60), ("s", 1)] {
        let amount = seconds / size;
        if amount > 0 {
            out.push_str(&amount.to_string());
            out.push_str(unit);
            seconds %= size;
        }
    }
    out
}
