//! Shared utilities for CLI commands.

use std::path::Path;

use anyhow::Result;
use chrono::{Duration, Local, NaiveDateTime, Timelike};

use did_core::WorkLog;

/// Current local time, truncated to whole seconds like log timestamps.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Loads the work log, treating a missing file as an empty log.
pub fn load_log(path: &Path) -> Result<WorkLog> {
    match WorkLog::load(path) {
        Ok(log) => Ok(log),
        Err(err) if err.is_not_found() => {
            tracing::debug!(path = %path.display(), "no work log yet");
            Ok(WorkLog::new())
        }
        Err(err) => Err(err.into()),
    }
}

/// Formats a duration as "Xh Ym" if >= 1 hour, "Xm" otherwise.
///
/// Seconds are truncated.
pub fn format_duration(duration: Duration) -> String {
    let total_minutes = duration.num_minutes().abs();
    let sign = if duration < Duration::zero() && total_minutes > 0 {
        "-"
    } else {
        ""
    };
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{sign}{hours}h {minutes}m")
    } else {
        format!("{sign}{minutes}m")
    }
}

/// Like [`format_duration`], with an explicit `+` for non-negative values.
pub fn format_signed_duration(duration: Duration) -> String {
    let formatted = format_duration(duration);
    if formatted.starts_with('-') {
        formatted
    } else {
        format!("+{formatted}")
    }
}
