//! Check command for validating the work log.

use std::io::Write;

use anyhow::{Context, Result};

use did_core::WorkLog;

use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let path = &config.log_file;
    let mut log = match WorkLog::load(path) {
        Ok(log) => log,
        Err(err) if err.is_not_found() => {
            writeln!(writer, "No work log at {}", path.display())?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    log.compute_stats()
        .with_context(|| format!("break accounting failed for {}", path.display()))?;

    let sessions = log.sessions();
    let intervals: usize = sessions.iter().map(|s| s.intervals().len()).sum();
    writeln!(
        writer,
        "{}: {} sessions, {} activities, OK",
        path.display(),
        sessions.len(),
        intervals
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(content: Option<&str>) -> Result<String> {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            log_file: temp.path().join("joblog"),
        };
        if let Some(content) = content {
            std::fs::write(&config.log_file, content).unwrap();
        }
        let mut output = Vec::new();
        run(&mut output, &config)?;
        let output = String::from_utf8(output).unwrap();
        Ok(output.replace(&config.log_file.display().to_string(), "<log>"))
    }

    #[test]
    fn test_reports_valid_log() {
        let output = check(Some(
            "2019-02-20 09:00: arrive\n2019-02-20 10:00: coding\n\
             2019-02-21 09:00: arrive\n2019-02-21 09:30: .coffee\n",
        ))
        .unwrap();
        assert_eq!(output, "<log>: 2 sessions, 2 activities, OK\n");
    }

    #[test]
    fn test_missing_log_is_not_an_error() {
        let output = check(None).unwrap();
        assert_eq!(output, "No work log at <log>\n");
    }

    #[test]
    fn test_reports_broken_line() {
        let err = check(Some(
            "2019-02-20 09:00: arrive\n2019-02-20 08:00: coding\n",
        ))
        .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("line 2"), "{message}");
        assert!(message.contains("non-chronological order"), "{message}");
    }

    #[test]
    fn test_reports_unsupported_break_policy() {
        let err = check(Some(
            "config paid_break lunch 30m splittable\n\
             2019-02-20 09:00: arrive\n\
             2019-02-20 10:00: coding\n",
        ))
        .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("break accounting failed"), "{message}");
        assert!(
            message.contains("unsupported configuration of break \"lunch\""),
            "{message}"
        );
    }
}
