//! Work sessions: the intervals between one arrival and the next.

use chrono::{Duration, NaiveDateTime};
use thiserror::Error;

use crate::accounting::{Accounting, AccountingError};
use crate::interval::Interval;
use crate::stats::WorkSessionStats;

/// Errors from appending to a session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The session no longer accepts events.
    #[error("appending to a closed session")]
    AppendingToClosedSession,

    /// The event is earlier than the end of the session.
    #[error("event at {attempted} is earlier than the session end at {end}")]
    BeforeEnd {
        end: NaiveDateTime,
        attempted: NaiveDateTime,
    },
}

/// A sequence of intervals starting at an arrival.
///
/// The session owns its accounting, so later policy changes in the log do
/// not affect it.
#[derive(Debug, Clone)]
pub struct WorkSession {
    start: NaiveDateTime,
    accounting: Accounting,
    is_workday: bool,
    intervals: Vec<Interval>,
    closed: bool,
    stats: Option<WorkSessionStats>,
    total_overtime: Option<Duration>,
}

impl WorkSession {
    /// Starts a session.
    ///
    /// A session that is not a workday has no expected work time, so all of
    /// its work is overtime.
    pub const fn new(start: NaiveDateTime, accounting: Accounting, is_workday: bool) -> Self {
        Self {
            start,
            accounting,
            is_workday,
            intervals: Vec::new(),
            closed: false,
            stats: None,
            total_overtime: None,
        }
    }

    /// Appends an activity that lasted from the session end until `at`.
    pub fn append_log_event(
        &mut self,
        at: NaiveDateTime,
        text: impl Into<String>,
    ) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::AppendingToClosedSession);
        }
        let end = self.end();
        if at < end {
            return Err(SessionError::BeforeEnd { end, attempted: at });
        }
        self.intervals.push(Interval::new(end, at, text));
        Ok(())
    }

    /// Extends the last activity up to `at` as an assumed interval.
    ///
    /// Does nothing if the session has no intervals yet. Closed sessions
    /// accept it too, since it is not a log event.
    pub fn append_assumed_interval(&mut self, at: NaiveDateTime) -> Result<(), SessionError> {
        let end = self.end();
        if at < end {
            return Err(SessionError::BeforeEnd { end, attempted: at });
        }
        if let Some(last) = self.intervals.last() {
            let interval = Interval::new(end, at, last.name())
                .with_break(last.is_break())
                .assumed();
            self.intervals.push(interval);
        }
        Ok(())
    }

    /// Stops the session from accepting further events.
    pub const fn close(&mut self) {
        self.closed = true;
    }

    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// End of the last interval, or the start if there is none.
    pub fn end(&self) -> NaiveDateTime {
        self.intervals.last().map_or(self.start, Interval::end)
    }

    pub const fn accounting(&self) -> &Accounting {
        &self.accounting
    }

    pub const fn is_workday(&self) -> bool {
        self.is_workday
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn last_break_interval(&self) -> Option<&Interval> {
        self.intervals.iter().rev().find(|interval| interval.is_break())
    }

    pub fn last_work_interval(&self) -> Option<&Interval> {
        self.intervals.iter().rev().find(|interval| !interval.is_break())
    }

    /// Runs break accounting over the session and stores the result.
    pub fn compute_stats(&mut self) -> Result<&WorkSessionStats, AccountingError> {
        let stats =
            WorkSessionStats::compute(&mut self.intervals, &self.accounting, self.is_workday)?;
        Ok(self.stats.insert(stats))
    }

    /// Stats from the last [`compute_stats`](Self::compute_stats) call.
    pub const fn stats(&self) -> Option<&WorkSessionStats> {
        self.stats.as_ref()
    }

    /// Overtime accumulated over this and all earlier sessions of the log.
    pub const fn total_overtime(&self) -> Option<Duration> {
        self.total_overtime
    }

    pub(crate) const fn set_total_overtime(&mut self, total_overtime: Duration) {
        self.total_overtime = Some(total_overtime);
    }
}
