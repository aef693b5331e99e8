//! The work log: all sessions replayed from the log file.
//!
//! Records are applied in file order. Events open sessions (`arrive`,
//! `arrive ooo`) or extend the last one; `config` records change the
//! accounting template, which every new session copies.
//!
//! Config changes close the current session. An event that would extend a
//! session after a config change is rejected, so policy only ever changes
//! right before an arrival.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::accounting::{
    Accounting, AccountingError, DEFAULT_PRESET, PaidBreakConfig, preset_accounting,
};
use crate::duration::{DurationParseError, format_duration, parse_duration};
use crate::interval::Interval;
use crate::line::{LineError, LogLine, parse_line};
use crate::session::{SessionError, WorkSession};

/// Event text that starts a workday session.
pub const ARRIVE: &str = "arrive";

/// Event text that starts an out-of-office session.
pub const ARRIVE_OOO: &str = "arrive ooo";

/// Errors from applying a record to the work log.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkLogError {
    #[error("first log event is not an \"arrive\"")]
    FirstJobNotArrive,

    #[error("non-chronological order: {attempted} is earlier than the last event at {last}")]
    NonChronologicalOrder {
        last: NaiveDateTime,
        attempted: NaiveDateTime,
    },

    #[error("invalid parameter name: {0}")]
    InvalidParameter(String),

    #[error(
        "config parameters can't be changed while the session is still running, \
         move the change right before an \"arrive\""
    )]
    ConfigChangeDuringSession,

    #[error("multiple sessions start on {0}")]
    MultipleSessionsInOneDay(NaiveDate),

    #[error(
        "the session on {date} is longer than the maximum session length ({})",
        format_duration(*.max_duration)
    )]
    TooLongSession {
        date: NaiveDate,
        max_duration: Duration,
    },

    #[error("invalid value of {name}: {source}")]
    InvalidDuration {
        name: String,
        #[source]
        source: DurationParseError,
    },

    #[error(transparent)]
    Accounting(#[from] AccountingError),
}

/// A record that failed to parse or apply.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error(transparent)]
    Line(#[from] LineError),
    #[error(transparent)]
    WorkLog(#[from] WorkLogError),
}

/// Failure while replaying log text, with the offending line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("line {line_number} ({line:?}): {source}")]
pub struct ReplayError {
    /// 1-based line number.
    pub line_number: usize,
    /// The raw line, without its terminator.
    pub line: String,
    #[source]
    pub source: RecordError,
}

/// All sessions of a log, plus the accounting template for new sessions.
#[derive(Debug, Clone)]
pub struct WorkLog {
    sessions: Vec<WorkSession>,
    accounting: Accounting,
    last_workday_start: Option<NaiveDate>,
    max_session_length: Duration,
}

impl Default for WorkLog {
    fn default() -> Self {
        let accounting = preset_accounting(DEFAULT_PRESET)
            .unwrap_or_else(|| Accounting::new(Duration::hours(8), Vec::new()));
        Self::with_accounting(accounting)
    }
}

impl WorkLog {
    /// Creates an empty log using the default preset accounting.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty log with the given accounting template.
    pub fn with_accounting(accounting: Accounting) -> Self {
        Self {
            sessions: Vec::new(),
            accounting,
            last_workday_start: None,
            max_session_length: Duration::days(1),
        }
    }

    /// Replays log text into a fresh log.
    pub fn parse_str(text: &str) -> Result<Self, ReplayError> {
        let mut log = Self::new();
        log.replay_str(text)?;
        Ok(log)
    }

    /// Parses and applies every line of `text`.
    pub fn replay_str(&mut self, text: &str) -> Result<(), ReplayError> {
        for (index, line) in text.lines().enumerate() {
            let result = parse_line(line)
                .map_err(RecordError::from)
                .and_then(|record| match record {
                    Some(record) => self.apply(record).map_err(RecordError::from),
                    None => Ok(()),
                });
            if let Err(source) = result {
                return Err(ReplayError {
                    line_number: index + 1,
                    line: line.to_string(),
                    source,
                });
            }
        }
        tracing::debug!(sessions = self.sessions.len(), "replayed work log");
        Ok(())
    }

    /// Applies one parsed record.
    pub fn apply(&mut self, record: LogLine) -> Result<(), WorkLogError> {
        match record {
            LogLine::Event { timestamp, text } => self.append_log_event(timestamp, &text),
            LogLine::SetParam { name, value } => self.set_parameter(&name, &value),
            LogLine::PaidBreak(config) => {
                self.set_break(config);
                Ok(())
            }
            LogLine::DeletePaidBreak { name } => self.delete_break(&name),
        }
    }

    fn check_chronology(&self, at: NaiveDateTime) -> Result<(), WorkLogError> {
        match self.end() {
            Some(last) if last > at => Err(WorkLogError::NonChronologicalOrder {
                last,
                attempted: at,
            }),
            _ => Ok(()),
        }
    }

    /// Appends an event: an arrival or the end of an activity.
    pub fn append_log_event(&mut self, at: NaiveDateTime, text: &str) -> Result<(), WorkLogError> {
        self.check_chronology(at)?;

        match text {
            ARRIVE => {
                self.close_last_session();
                if self.last_workday_start == Some(at.date()) {
                    return Err(WorkLogError::MultipleSessionsInOneDay(at.date()));
                }
                self.last_workday_start = Some(at.date());
                self.open_session(at, true);
            }
            ARRIVE_OOO => {
                self.close_last_session();
                self.open_session(at, false);
            }
            _ => {
                let max_session_length = self.max_session_length;
                let session = self
                    .sessions
                    .last_mut()
                    .ok_or(WorkLogError::FirstJobNotArrive)?;
                if session.start() + max_session_length < at {
                    return Err(WorkLogError::TooLongSession {
                        date: session.start().date(),
                        max_duration: max_session_length,
                    });
                }
                session
                    .append_log_event(at, text)
                    .map_err(|err| match err {
                        SessionError::AppendingToClosedSession => {
                            WorkLogError::ConfigChangeDuringSession
                        }
                        SessionError::BeforeEnd { end, attempted } => {
                            WorkLogError::NonChronologicalOrder {
                                last: end,
                                attempted,
                            }
                        }
                    })?;
            }
        }
        Ok(())
    }

    fn open_session(&mut self, at: NaiveDateTime, is_workday: bool) {
        tracing::debug!(start = %at, is_workday, "opening session");
        self.sessions
            .push(WorkSession::new(at, self.accounting.clone(), is_workday));
    }

    fn close_last_session(&mut self) {
        if let Some(session) = self.sessions.last_mut() {
            session.close();
        }
    }

    /// Sets a `config <name> = <value>` parameter.
    ///
    /// Only `daily_work_time` is recognized.
    pub fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), WorkLogError> {
        self.close_last_session();
        match name {
            "daily_work_time" => {
                self.accounting.daily_work_time =
                    parse_duration(value).map_err(|source| WorkLogError::InvalidDuration {
                        name: name.to_string(),
                        source,
                    })?;
                tracing::debug!(%value, "daily work time changed");
                Ok(())
            }
            _ => Err(WorkLogError::InvalidParameter(name.to_string())),
        }
    }

    /// Adds a paid break to the template, replacing one with the same name.
    pub fn set_break(&mut self, config: PaidBreakConfig) {
        self.close_last_session();
        tracing::debug!(name = %config.name, "paid break configured");
        self.accounting.set_break(config);
    }

    /// Removes a paid break from the template.
    pub fn delete_break(&mut self, name: &str) -> Result<(), WorkLogError> {
        self.close_last_session();
        self.accounting.delete_break(name)?;
        tracing::debug!(name, "paid break deleted");
        Ok(())
    }

    /// Extends the last activity of the last session up to `now`.
    pub fn append_assumed_interval(&mut self, now: NaiveDateTime) -> Result<(), WorkLogError> {
        self.check_chronology(now)?;
        if let Some(session) = self.sessions.last_mut() {
            session
                .append_assumed_interval(now)
                .map_err(|_| WorkLogError::NonChronologicalOrder {
                    last: session.end(),
                    attempted: now,
                })?;
        }
        Ok(())
    }

    /// End of the last session, if any.
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.sessions.last().map(WorkSession::end)
    }

    pub fn sessions(&self) -> &[WorkSession] {
        &self.sessions
    }

    /// The template copied into new sessions.
    pub const fn accounting(&self) -> &Accounting {
        &self.accounting
    }

    pub const fn max_session_length(&self) -> Duration {
        self.max_session_length
    }

    /// Most recent break interval across all sessions.
    pub fn last_break_interval(&self) -> Option<&Interval> {
        self.sessions
            .iter()
            .rev()
            .find_map(WorkSession::last_break_interval)
    }

    /// Most recent work interval across all sessions.
    pub fn last_work_interval(&self) -> Option<&Interval> {
        self.sessions
            .iter()
            .rev()
            .find_map(WorkSession::last_work_interval)
    }

    /// Runs break accounting for every session and the running overtime total.
    pub fn compute_stats(&mut self) -> Result<(), WorkLogError> {
        let mut total_overtime = Duration::zero();
        for session in &mut self.sessions {
            let overhours = session.compute_stats()?.overhours();
            total_overtime += overhours;
            session.set_total_overtime(total_overtime);
        }
        tracing::debug!(total_overtime = %total_overtime, "computed stats");
        Ok(())
    }
}
