//! The smallest unit of tracked time: one named activity between two timestamps.

use chrono::{Duration, NaiveDateTime};

/// Returns true if an activity name denotes a break.
///
/// Break names start with a `.` or contain `**`.
pub fn name_denotes_break(name: &str) -> bool {
    name.starts_with('.') || name.contains("**")
}

/// Converts fractional seconds to a duration, rounded to milliseconds.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn seconds_to_duration(seconds: f64) -> Duration {
    Duration::milliseconds((seconds * 1000.0).round() as i64)
}

/// Converts a duration to fractional seconds.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn duration_to_seconds(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 1000.0
}

/// One activity within a work session.
///
/// The accounted adjustment holds break seconds reclassified as work. Break
/// accounting lowers it on break intervals by the reclassified amount and
/// raises it on work intervals by their proportional share.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    start: NaiveDateTime,
    end: NaiveDateTime,
    name: String,
    is_break: bool,
    is_assumed: bool,
    adjustment_seconds: f64,
}

impl Interval {
    /// Creates an interval, classifying it as a break from its name.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, name: impl Into<String>) -> Self {
        debug_assert!(end >= start, "interval ends before it starts");
        let name = name.into();
        Self {
            start,
            end,
            is_break: name_denotes_break(&name),
            name,
            is_assumed: false,
            adjustment_seconds: 0.0,
        }
    }

    /// Overrides the name-based break classification.
    #[must_use]
    pub const fn with_break(mut self, is_break: bool) -> Self {
        self.is_break = is_break;
        self
    }

    /// Marks the interval as an assumed, still ongoing activity.
    #[must_use]
    pub const fn assumed(mut self) -> Self {
        self.is_assumed = true;
        self
    }

    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub const fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn is_break(&self) -> bool {
        self.is_break
    }

    /// True for the synthesized "still doing this" interval that ends at now.
    pub const fn is_assumed(&self) -> bool {
        self.is_assumed
    }

    /// Wall-clock length of the interval.
    pub fn real_duration(&self) -> Duration {
        self.end - self.start
    }

    pub(crate) fn real_seconds(&self) -> f64 {
        duration_to_seconds(self.real_duration())
    }

    /// Real duration plus the accounted adjustment.
    pub fn adjusted_duration(&self) -> Duration {
        self.real_duration() + seconds_to_duration(self.adjustment_seconds)
    }

    /// Returns the real or adjusted duration.
    pub fn duration(&self, adjusted: bool) -> Duration {
        if adjusted {
            self.adjusted_duration()
        } else {
            self.real_duration()
        }
    }

    /// Break seconds currently accounted to this interval.
    pub const fn adjustment_seconds(&self) -> f64 {
        self.adjustment_seconds
    }

    pub(crate) fn account_break_seconds(&mut self, seconds: f64) {
        self.adjustment_seconds += seconds;
    }

    pub(crate) fn account_work_seconds(&mut self, seconds: f64) {
        self.adjustment_seconds -= seconds;
    }

    pub(crate) const fn reset_adjustment(&mut self) {
        self.adjustment_seconds = 0.0;
    }
}
