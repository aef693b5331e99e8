//! Log command for recording a finished activity.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use clap::Args;

use did_core::{LogWriter, WorkLog};

use crate::Config;
use crate::commands::util::{format_duration, load_log};

/// Name used for `.` when no break was logged yet.
const DEFAULT_BREAK_NAME: &str = ".break";

/// Name used for `,` when no work was logged yet.
const DEFAULT_WORK_NAME: &str = "work";

#[derive(Debug, Args)]
pub struct LogArgs {
    /// What have you just been doing? Use `.` to repeat the last break and
    /// `,` to repeat the last work activity.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub activity: Vec<String>,
}

/// Expands the `.` and `,` shorthands.
fn resolve_name(log: &WorkLog, name: &str) -> String {
    match name {
        "." => log
            .last_break_interval()
            .map_or(DEFAULT_BREAK_NAME, |interval| interval.name())
            .to_string(),
        "," => log
            .last_work_interval()
            .map_or(DEFAULT_WORK_NAME, |interval| interval.name())
            .to_string(),
        _ => name.to_string(),
    }
}

pub fn run<W: Write>(
    writer: &mut W,
    args: &LogArgs,
    config: &Config,
    now: NaiveDateTime,
) -> Result<()> {
    let name = args.activity.join(" ");
    let name = name.trim();
    if name.is_empty() {
        bail!("activity cannot be empty");
    }

    let mut log = load_log(&config.log_file)?;
    let name = resolve_name(&log, name);

    // Validate against the replayed log before touching the file.
    log.append_log_event(now, &name)
        .with_context(|| format!("can't log \"{name}\" at {now}"))?;

    let file = LogWriter::new(&config.log_file);
    file.create()
        .with_context(|| format!("failed to create {}", config.log_file.display()))?;
    file.append(now, &name)
        .with_context(|| format!("failed to write to {}", config.log_file.display()))?;

    let session = log
        .sessions()
        .last()
        .context("work log has no session after logging")?;
    let duration = session
        .intervals()
        .last()
        .map(|interval| format_duration(interval.real_duration()));
    match duration {
        Some(duration) => writeln!(writer, "{} {name} ({duration})", now.format("%H:%M"))?,
        None => writeln!(writer, "{} {name}", now.format("%H:%M"))?,
    }
    Ok(())
}
