//! Reading and appending to the work log file.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::line::LogLine;
use crate::worklog::{ReplayError, WorkLog};

/// Errors from loading a work log file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("error opening/reading from file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error while parsing file {}, {source}", .path.display())]
    Replay {
        path: PathBuf,
        #[source]
        source: ReplayError,
    },
}

impl LoadError {
    /// True if the file doesn't exist, which callers may treat as an empty log.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

impl WorkLog {
    /// Reads and replays a work log file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "read work log");

        Self::parse_str(&text).map_err(|source| LoadError::Replay {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Appends events to a work log file.
#[derive(Debug, Clone)]
pub struct LogWriter {
    path: PathBuf,
}

impl LogWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the file and its parent directories if missing.
    pub fn create(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        OpenOptions::new().create(true).append(true).open(&self.path)?;
        Ok(())
    }

    /// Appends one `YYYY-MM-DD HH:MM:SS: <name>` line.
    pub fn append(&self, timestamp: NaiveDateTime, name: &str) -> io::Result<()> {
        let line = LogLine::Event {
            timestamp,
            text: name.to_string(),
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        tracing::debug!(path = %self.path.display(), %line, "appended event");
        Ok(())
    }
}
