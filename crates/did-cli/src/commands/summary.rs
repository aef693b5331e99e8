//! Summary command for showing worked time, breaks and overtime.
//!
//! Each session is printed on one line. With `--intervals`, the activities
//! follow with their real duration and, in brackets, the adjusted duration
//! that includes their share of paid breaks.
//!
//! `--aggregate` totals time per activity name for each session and
//! `--aggregate-range` for all selected sessions together. Both use real
//! durations unless `--split-breaks` asks for the adjusted ones.

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Days, Duration, NaiveDate, NaiveDateTime};
use clap::Args;
use serde::Serialize;

use did_core::{Interval, WorkLog, WorkSession};

use crate::Config;
use crate::commands::util::{format_duration, format_signed_duration, load_log};

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Only show sessions from the last N days (1 = today).
    #[arg(short, long, value_name = "N")]
    pub days: Option<u32>,

    /// List the activities of each session.
    #[arg(short, long, conflicts_with_all = ["aggregate", "aggregate_range"])]
    pub intervals: bool,

    /// Total the time of each activity per session.
    #[arg(short, long, conflicts_with = "aggregate_range")]
    pub aggregate: bool,

    /// Total the time of each activity over all selected sessions.
    #[arg(short = 'A', long)]
    pub aggregate_range: bool,

    /// Spread paid break time over the work activities in aggregated totals.
    #[arg(short, long)]
    pub split_breaks: bool,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// One session in JSON output.
#[derive(Debug, Serialize)]
pub struct SessionReport {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub is_workday: bool,
    pub worked_seconds: i64,
    pub slacked_seconds: i64,
    pub overtime_seconds: i64,
    pub total_overtime_seconds: i64,
    pub intervals: Vec<IntervalReport>,
}

/// One activity in JSON output.
#[derive(Debug, Serialize)]
pub struct IntervalReport {
    pub name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub is_break: bool,
    pub is_assumed: bool,
    pub real_seconds: i64,
    pub adjusted_seconds: i64,
}

impl From<&Interval> for IntervalReport {
    fn from(interval: &Interval) -> Self {
        Self {
            name: interval.name().to_string(),
            start: interval.start(),
            end: interval.end(),
            is_break: interval.is_break(),
            is_assumed: interval.is_assumed(),
            real_seconds: interval.real_duration().num_seconds(),
            adjusted_seconds: interval.adjusted_duration().num_seconds(),
        }
    }
}

/// Worked, slacked, overtime and running overtime of a session with computed stats.
fn session_totals(session: &WorkSession) -> Result<(Duration, Duration, Duration, Duration)> {
    let stats = session
        .stats()
        .context("session stats have not been computed")?;
    let total = session.total_overtime().unwrap_or_default();
    Ok((
        stats.time_worked(),
        stats.time_slacked(),
        stats.overhours(),
        total,
    ))
}

fn session_report(session: &WorkSession) -> Result<SessionReport> {
    let (worked, slacked, overtime, total) = session_totals(session)?;
    Ok(SessionReport {
        start: session.start(),
        end: session.end(),
        is_workday: session.is_workday(),
        worked_seconds: worked.num_seconds(),
        slacked_seconds: slacked.num_seconds(),
        overtime_seconds: overtime.num_seconds(),
        total_overtime_seconds: total.num_seconds(),
        intervals: session.intervals().iter().map(IntervalReport::from).collect(),
    })
}

/// Sessions starting within the last `days` days, counting today.
///
/// A range reaching before the earliest representable date selects everything.
fn selected_sessions(log: &WorkLog, days: Option<u32>, today: NaiveDate) -> Vec<&WorkSession> {
    let first_day = days
        .and_then(|days| today.checked_sub_days(Days::new(u64::from(days.max(1)) - 1)));
    log.sessions()
        .iter()
        .filter(|session| first_day.is_none_or(|first| session.start().date() >= first))
        .collect()
}

/// Total time per activity name, longest first.
///
/// Zero totals are left out. Ongoing activities are kept apart from
/// finished ones of the same name.
fn aggregate<'a>(
    intervals: impl IntoIterator<Item = &'a Interval>,
    adjusted: bool,
) -> Vec<(String, Duration)> {
    let mut totals: BTreeMap<String, Duration> = BTreeMap::new();
    for interval in intervals {
        let name = if interval.is_assumed() {
            format!("{} (ongoing)", interval.name())
        } else {
            interval.name().to_string()
        };
        *totals.entry(name).or_default() += interval.duration(adjusted);
    }

    let mut totals: Vec<_> = totals
        .into_iter()
        .filter(|(_, duration)| !duration.is_zero())
        .collect();
    totals.sort_by(|(_, a), (_, b)| b.cmp(a));
    totals
}

fn write_aggregate<W: Write>(writer: &mut W, totals: &[(String, Duration)]) -> Result<()> {
    for (name, duration) in totals {
        writeln!(writer, "  {:<8} {name}", format_duration(*duration))?;
    }
    Ok(())
}

fn write_human<W: Write>(
    writer: &mut W,
    sessions: &[&WorkSession],
    args: &SummaryArgs,
) -> Result<()> {
    if sessions.is_empty() {
        writeln!(writer, "No sessions recorded.")?;
        return Ok(());
    }

    for session in sessions {
        let (worked, slacked, overtime, total) = session_totals(session)?;
        let kind = if session.is_workday() { "" } else { " (ooo)" };
        writeln!(
            writer,
            "{}{kind}: worked {}, slacked {}, overtime {}, total {}",
            session.start().format("%Y-%m-%d %a"),
            format_duration(worked),
            format_duration(slacked),
            format_signed_duration(overtime),
            format_signed_duration(total),
        )?;

        if args.aggregate {
            write_aggregate(writer, &aggregate(session.intervals(), args.split_breaks))?;
        }

        if args.intervals {
            for interval in session.intervals() {
                let ongoing = if interval.is_assumed() { " (ongoing)" } else { "" };
                writeln!(
                    writer,
                    "  {}-{} {} [{}] {}{ongoing}",
                    interval.start().format("%H:%M"),
                    interval.end().format("%H:%M"),
                    format_duration(interval.real_duration()),
                    format_duration(interval.adjusted_duration()),
                    interval.name(),
                )?;
            }
        }
    }

    if args.aggregate_range {
        writeln!(writer, "All {} sessions:", sessions.len())?;
        let intervals = sessions.iter().flat_map(|session| session.intervals());
        write_aggregate(writer, &aggregate(intervals, args.split_breaks))?;
    }
    Ok(())
}

/// Computes stats and writes the summary of an already loaded log.
pub fn render<W: Write>(
    writer: &mut W,
    log: &mut WorkLog,
    args: &SummaryArgs,
    today: NaiveDate,
) -> Result<()> {
    log.compute_stats().context("failed to compute session stats")?;
    let sessions = selected_sessions(log, args.days, today);

    if args.json {
        let reports = sessions
            .iter()
            .map(|session| session_report(session))
            .collect::<Result<Vec<_>>>()?;
        writeln!(writer, "{}", serde_json::to_string_pretty(&reports)?)?;
    } else {
        write_human(writer, &sessions, args)?;
    }
    Ok(())
}

pub fn run<W: Write>(
    writer: &mut W,
    args: &SummaryArgs,
    config: &Config,
    now: NaiveDateTime,
) -> Result<()> {
    let mut log = load_log(&config.log_file)?;

    // Show the activity still in progress today.
    if log.end().is_some_and(|end| end.date() == now.date()) {
        log.append_assumed_interval(now)
            .context("the work log ends in the future")?;
    }

    render(writer, &mut log, args, now.date())
}
