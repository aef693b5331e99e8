//! Parsing of single work log lines.
//!
//! A line is matched against an ordered list of recognizers and the first
//! match wins:
//!
//! 1. `YYYY-MM-DD HH:MM[:SS]: <text>`, a timestamped event
//! 2. a blank line or a `#` comment, ignored
//! 3. `config <name> = <value>`, a parameter assignment
//! 4. `config paid_break <name> [delete | <attr>...]`, a paid break definition
//!
//! The generic assignment has to be tried before `paid_break`.

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};
use thiserror::Error;

use crate::accounting::PaidBreakConfig;
use crate::duration::{format_duration, parse_duration};

/// Errors from parsing a log line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LineError {
    /// The line matches none of the known forms.
    #[error("invalid line: {0}")]
    InvalidLine(String),

    /// The line looks like an event but the date or time doesn't exist.
    #[error("invalid timestamp in line: {0}")]
    InvalidTimestamp(String),

    /// A `config paid_break` line is malformed.
    #[error("error in \"config paid_break\": {0}")]
    PaidBreak(String),
}

/// One meaningful line of the work log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine {
    /// An activity that ended at `timestamp`, or an arrival.
    Event {
        timestamp: NaiveDateTime,
        text: String,
    },
    /// `config <name> = <value>`.
    SetParam { name: String, value: String },
    /// Definition of a paid break kind.
    PaidBreak(PaidBreakConfig),
    /// Removal of a paid break kind.
    DeletePaidBreak { name: String },
}

type Recognizer = fn(&Captures<'_>, &str) -> Result<Option<LogLine>, LineError>;

static RECOGNIZERS: LazyLock<Vec<(Regex, Recognizer)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"^(\d{4})-(\d{2})-(\d{2}) (\d{2}):(\d{2})(?::(\d{2}))?: (.+)$").unwrap(),
            event_line as Recognizer,
        ),
        (Regex::new(r"^\s*(?:#.*)?$").unwrap(), ignored_line),
        (
            Regex::new(r"^config\s+([a-z_][a-z0-9_]*)\s*=\s*(.*)$").unwrap(),
            set_param_line,
        ),
        (Regex::new(r"^config\s+paid_break\s+(.*)$").unwrap(), paid_break_line),
    ]
});

/// Parses one line. Returns `Ok(None)` for blank lines and comments.
///
/// A trailing line terminator is ignored.
pub fn parse_line(line: &str) -> Result<Option<LogLine>, LineError> {
    let line = line.trim_end_matches(['\n', '\r']);
    for (regex, recognize) in RECOGNIZERS.iter() {
        if let Some(caps) = regex.captures(line) {
            return recognize(&caps, line);
        }
    }
    Err(LineError::InvalidLine(line.to_string()))
}

fn event_line(caps: &Captures<'_>, line: &str) -> Result<Option<LogLine>, LineError> {
    let invalid = || LineError::InvalidTimestamp(line.to_string());
    let number = |index: usize| -> Result<u32, LineError> {
        caps.get(index)
            .map_or(Ok(0), |m| m.as_str().parse().map_err(|_| invalid()))
    };

    let year = caps[1].parse().map_err(|_| invalid())?;
    let timestamp = NaiveDate::from_ymd_opt(year, number(2)?, number(3)?)
        .and_then(|date| date.and_hms_opt(number(4).ok()?, number(5).ok()?, number(6).ok()?))
        .ok_or_else(invalid)?;

    Ok(Some(LogLine::Event {
        timestamp,
        text: caps[7].to_string(),
    }))
}

#[allow(clippy::unnecessary_wraps)]
const fn ignored_line(_caps: &Captures<'_>, _line: &str) -> Result<Option<LogLine>, LineError> {
    Ok(None)
}

#[allow(clippy::unnecessary_wraps)]
fn set_param_line(caps: &Captures<'_>, _line: &str) -> Result<Option<LogLine>, LineError> {
    Ok(Some(LogLine::SetParam {
        name: caps[1].to_string(),
        value: caps[2].trim().to_string(),
    }))
}

fn paid_break_line(caps: &Captures<'_>, _line: &str) -> Result<Option<LogLine>, LineError> {
    parse_paid_break(&caps[1]).map(Some)
}

fn paid_break_error(message: impl Into<String>) -> LineError {
    LineError::PaidBreak(message.into())
}

/// Sets an attribute that may only be given once.
fn set_once<T>(
    slot: &mut Option<T>,
    attr: &str,
    value: T,
    describe: impl Fn(&T) -> String,
) -> Result<(), LineError> {
    if let Some(old) = slot {
        return Err(paid_break_error(format!(
            "repeated setting of {attr} (to {} and {})",
            describe(old),
            describe(&value)
        )));
    }
    *slot = Some(value);
    Ok(())
}

/// Escapes every unquoted `#` that starts a word.
///
/// Shell splitting drops such a word and the rest of the line as a comment,
/// but here it must stay an argument and be validated like any other.
fn escape_comment_marks(args: &str) -> Cow<'_, str> {
    if !args.contains('#') {
        return Cow::Borrowed(args);
    }

    let mut escaped = String::with_capacity(args.len() + 1);
    let mut quote = None;
    let mut word_start = true;
    let mut chars = args.chars();
    while let Some(c) = chars.next() {
        match (quote, c) {
            (None, '#') if word_start => escaped.push('\\'),
            (None | Some('"'), '\\') => {
                escaped.push(c);
                escaped.extend(chars.next());
                word_start = false;
                continue;
            }
            (None, '\'' | '"') => quote = Some(c),
            (Some(open), _) if c == open => quote = None,
            _ => {}
        }
        word_start = quote.is_none() && c.is_whitespace();
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

/// Parses the shell-quoted arguments of `config paid_break`.
fn parse_paid_break(args: &str) -> Result<LogLine, LineError> {
    let args = shlex::split(&escape_comment_marks(args))
        .ok_or_else(|| paid_break_error("unbalanced quoting"))?;
    let mut args = args.into_iter();
    let name = args.next().ok_or_else(|| paid_break_error("no arguments"))?;
    let rest: Vec<String> = args.collect();

    match rest.first().map(String::as_str) {
        None => return Err(paid_break_error("too few arguments")),
        Some("delete") => {
            if rest.len() > 1 {
                return Err(paid_break_error("extra arguments after \"delete\""));
            }
            return Ok(LogLine::DeletePaidBreak { name });
        }
        Some(_) => {}
    }

    let mut duration = None;
    let mut max_occurrences_per_day = None;
    let mut splittable = None;
    let mut earned_after = None;
    let mut min_day_work_time = None;

    let describe_duration = |d: &chrono::Duration| format_duration(*d);
    for arg in rest {
        match arg.as_str() {
            "daily" => set_once(&mut max_occurrences_per_day, "daily", 1_u32, u32::to_string)?,
            "splittable" => set_once(&mut splittable, "splittable", true, bool::to_string)?,
            "one_chunk" => set_once(&mut splittable, "splittable", false, bool::to_string)?,
            _ => {
                if let Some((key, value)) = arg.split_once('=') {
                    let slot = match key {
                        "min_day_work_time" => &mut min_day_work_time,
                        "earn_work_time" => &mut earned_after,
                        _ => {
                            return Err(paid_break_error(format!(
                                "not recognized parameter \"{key}\""
                            )));
                        }
                    };
                    let value = parse_duration(value)
                        .map_err(|err| paid_break_error(err.to_string()))?;
                    set_once(slot, key, value, describe_duration)?;
                } else {
                    let value = parse_duration(&arg).map_err(|_| {
                        paid_break_error(format!("not recognized argument \"{arg}\""))
                    })?;
                    set_once(&mut duration, "duration", value, describe_duration)?;
                }
            }
        }
    }

    let duration = duration.ok_or_else(|| paid_break_error("missing setting of duration"))?;
    let splittable = splittable
        .ok_or_else(|| paid_break_error("missing setting of \"splittable\" or \"one_chunk\""))?;

    Ok(LogLine::PaidBreak(PaidBreakConfig {
        name,
        duration,
        max_occurrences_per_day,
        splittable,
        earned_after_preceding_work_time: earned_after,
        min_day_total_work_time: min_day_work_time,
    }))
}

fn quoted(word: &str) -> Result<String, fmt::Error> {
    shlex::try_quote(word)
        .map(std::borrow::Cow::into_owned)
        .map_err(|_| fmt::Error)
}

/// Writes the canonical line form, which [`parse_line`] reads back unchanged.
impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event { timestamp, text } => {
                write!(f, "{}: {text}", timestamp.format("%Y-%m-%d %H:%M:%S"))
            }
            Self::SetParam { name, value } => write!(f, "config {name} = {value}"),
            Self::DeletePaidBreak { name } => {
                write!(f, "config paid_break {} delete", quoted(name)?)
            }
            Self::PaidBreak(config) => {
                write!(
                    f,
                    "config paid_break {} {}",
                    quoted(&config.name)?,
                    format_duration(config.duration)
                )?;
                if config.max_occurrences_per_day.is_some() {
                    f.write_str(" daily")?;
                }
                f.write_str(if config.splittable {
                    " splittable"
                } else {
                    " one_chunk"
                })?;
                if let Some(earn) = config.earned_after_preceding_work_time {
                    write!(f, " earn_work_time={}", format_duration(earn))?;
                }
                if let Some(min) = config.min_day_total_work_time {
                    write!(f, " min_day_work_time={}", format_duration(min))?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;

    fn datetime(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 2, 20)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn paid_break(args: &str) -> Result<Option<LogLine>, LineError> {
        parse_line(&format!("config paid_break {args}"))
    }

    #[test]
    fn test_event_with_seconds() {
        assert_eq!(
            parse_line("2019-02-20 09:02:03: arrive\n"),
            Ok(Some(LogLine::Event {
                timestamp: datetime(9, 2, 3),
                text: "arrive".to_string(),
            }))
        );
    }

    #[test]
    fn test_event_seconds_default_to_zero() {
        assert_eq!(
            parse_line("2019-02-20 10:20: fixing the build: part 2"),
            Ok(Some(LogLine::Event {
                timestamp: datetime(10, 20, 0),
                text: "fixing the build: part 2".to_string(),
            }))
        );
    }

    #[test]
    fn test_event_with_impossible_date() {
        assert!(matches!(
            parse_line("2019-02-30 10:20: foo"),
            Err(LineError::InvalidTimestamp(_))
        ));
        assert!(matches!(
            parse_line("2019-02-20 25:20: foo"),
            Err(LineError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_event_needs_text() {
        assert!(matches!(
            parse_line("2019-02-20 10:20: "),
            Err(LineError::InvalidLine(_))
        ));
    }

    #[test]
    fn test_blank_and_comment_lines_are_ignored() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   \t\n"), Ok(None));
        assert_eq!(parse_line("# a comment"), Ok(None));
        assert_eq!(parse_line("   # indented comment"), Ok(None));
    }

    #[test]
    fn test_set_param() {
        assert_eq!(
            parse_line("config daily_work_time =  7h30m  "),
            Ok(Some(LogLine::SetParam {
                name: "daily_work_time".to_string(),
                value: "7h30m".to_string(),
            }))
        );
    }

    #[test]
    fn test_generic_assignment_wins_over_paid_break() {
        assert_eq!(
            parse_line("config paid_break = 5m"),
            Ok(Some(LogLine::SetParam {
                name: "paid_break".to_string(),
                value: "5m".to_string(),
            }))
        );
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert_eq!(
            parse_line("hello world"),
            Err(LineError::InvalidLine("hello world".to_string()))
        );
        assert!(parse_line("config").is_err());
        assert!(parse_line("config paid_break").is_err());
    }

    #[test]
    fn test_paid_break_accrual() {
        let Ok(Some(LogLine::PaidBreak(config))) =
            paid_break("computer 5m splittable earn_work_time=1h")
        else {
            panic!("expected a paid break");
        };
        assert_eq!(config.name, "computer");
        assert_eq!(config.duration, Duration::minutes(5));
        assert!(config.splittable);
        assert_eq!(config.max_occurrences_per_day, None);
        assert_eq!(config.earned_after_preceding_work_time, Some(Duration::hours(1)));
        assert_eq!(config.min_day_total_work_time, None);
    }

    #[test]
    fn test_paid_break_daily_with_quoted_name() {
        let Ok(Some(LogLine::PaidBreak(config))) =
            paid_break("'second breakfast' daily 15m one_chunk min_day_work_time=6h")
        else {
            panic!("expected a paid break");
        };
        assert_eq!(config.name, "second breakfast");
        assert_eq!(config.max_occurrences_per_day, Some(1));
        assert!(!config.splittable);
        assert_eq!(config.min_day_total_work_time, Some(Duration::hours(6)));
    }

    #[test]
    fn test_paid_break_delete() {
        assert_eq!(
            paid_break("computer delete"),
            Ok(Some(LogLine::DeletePaidBreak {
                name: "computer".to_string(),
            }))
        );
        assert!(matches!(
            paid_break("computer delete now"),
            Err(LineError::PaidBreak(_))
        ));
    }

    #[test]
    fn test_paid_break_missing_attributes() {
        assert_eq!(
            paid_break("computer"),
            Err(LineError::PaidBreak("too few arguments".to_string()))
        );
        assert_eq!(
            paid_break("computer splittable"),
            Err(LineError::PaidBreak("missing setting of duration".to_string()))
        );
        assert_eq!(
            paid_break("computer 5m"),
            Err(LineError::PaidBreak(
                "missing setting of \"splittable\" or \"one_chunk\"".to_string()
            ))
        );
    }

    #[test]
    fn test_paid_break_repeated_attribute_names_both_values() {
        assert_eq!(
            paid_break("computer 5m 10m splittable"),
            Err(LineError::PaidBreak(
                "repeated setting of duration (to 5m and 10m)".to_string()
            ))
        );
        assert_eq!(
            paid_break("computer 5m splittable one_chunk"),
            Err(LineError::PaidBreak(
                "repeated setting of splittable (to true and false)".to_string()
            ))
        );
        assert!(paid_break("lunch 5m daily daily splittable").is_err());
    }

    #[test]
    fn test_paid_break_unknown_tokens() {
        assert_eq!(
            paid_break("computer 5m splittable color=blue"),
            Err(LineError::PaidBreak(
                "not recognized parameter \"color\"".to_string()
            ))
        );
        assert_eq!(
            paid_break("computer 5m splittable sometimes"),
            Err(LineError::PaidBreak(
                "not recognized argument \"sometimes\"".to_string()
            ))
        );
        assert!(paid_break("computer 5m splittable earn_work_time=soon").is_err());
        assert!(paid_break("computer 15 splittable").is_err());
    }

    #[test]
    fn test_paid_break_hash_is_not_a_comment() {
        assert_eq!(
            paid_break("lunch 30m daily splittable #min_day_work_time=6h"),
            Err(LineError::PaidBreak(
                "not recognized parameter \"#min_day_work_time\"".to_string()
            ))
        );
        assert_eq!(
            paid_break("lunch 30m daily splittable #"),
            Err(LineError::PaidBreak("not recognized argument \"#\"".to_string()))
        );

        let Ok(Some(LogLine::PaidBreak(config))) = paid_break("#lunch 15m daily splittable")
        else {
            panic!("expected a paid break");
        };
        assert_eq!(config.name, "#lunch");
        assert_eq!(config.max_occurrences_per_day, Some(1));

        let Ok(Some(LogLine::PaidBreak(config))) =
            paid_break("'tea # 2' \"5m\" daily splittable")
        else {
            panic!("expected a paid break");
        };
        assert_eq!(config.name, "tea # 2");
        assert_eq!(config.duration, Duration::minutes(5));
    }

    #[test]
    fn test_paid_break_unbalanced_quotes() {
        assert_eq!(
            paid_break("'computer 5m splittable"),
            Err(LineError::PaidBreak("unbalanced quoting".to_string()))
        );
    }

    #[test]
    fn test_formatted_lines_parse_back() {
        let lines = [
            LogLine::Event {
                timestamp: datetime(9, 2, 3),
                text: "arrive".to_string(),
            },
            LogLine::Event {
                timestamp: datetime(17, 0, 0),
                text: " .coffee **".to_string(),
            },
            LogLine::SetParam {
                name: "daily_work_time".to_string(),
                value: "7h".to_string(),
            },
            LogLine::DeletePaidBreak {
                name: "second breakfast".to_string(),
            },
            LogLine::DeletePaidBreak {
                name: "#lunch".to_string(),
            },
            LogLine::PaidBreak(
                PaidBreakConfig::new("computer", Duration::minutes(5))
                    .earned_after(Duration::hours(1)),
            ),
            LogLine::PaidBreak(
                PaidBreakConfig::new("second breakfast", Duration::minutes(15))
                    .daily()
                    .min_day_work_time(Duration::hours(6)),
            ),
        ];

        for line in lines {
            let text = line.to_string();
            assert_eq!(parse_line(&text), Ok(Some(line)), "round trip of {text:?}");
        }
    }

    #[test]
    fn test_event_format() {
        let line = LogLine::Event {
            timestamp: datetime(9, 2, 0),
            text: "arrive".to_string(),
        };
        assert_eq!(line.to_string(), "2019-02-20 09:02:00: arrive");
    }
}
