//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::log::LogArgs;
use crate::commands::summary::SummaryArgs;

/// Command-line time tracking tool.
///
/// Records what you have just been doing in a plain-text work log and
/// reports worked time, breaks and overtime per day.
#[derive(Debug, Parser)]
#[command(name = "did", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Work log file to use instead of the configured one.
    #[arg(short = 'f', long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record the activity you have just finished.
    Log(LogArgs),

    /// Show worked time, breaks and overtime per session.
    Summary(SummaryArgs),

    /// Replay the work log and report any inconsistency.
    Check,
}
