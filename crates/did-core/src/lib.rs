//! Core domain logic for did.
//!
//! This crate contains:
//! - Line parsing: turning work log lines into typed records
//! - Work log replay: assembling records into sessions under strict ordering rules
//! - Break accounting: counting paid breaks as work and computing overtime

pub mod accounting;
pub mod duration;
mod file;
pub mod interval;
pub mod line;
pub mod session;
pub mod stats;
pub mod worklog;

pub use accounting::{
    Accounting, AccountingError, BreakPolicies, BreakPolicy, PaidBreakConfig, preset_accounting,
};
pub use duration::{DurationParseError, format_duration, parse_duration};
pub use file::{LoadError, LogWriter};
pub use interval::Interval;
pub use line::{LineError, LogLine, parse_line};
pub use session::{SessionError, WorkSession};
pub use stats::WorkSessionStats;
pub use worklog::{ARRIVE, ARRIVE_OOO, RecordError, ReplayError, WorkLog, WorkLogError};
