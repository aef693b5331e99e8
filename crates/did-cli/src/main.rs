use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use did_cli::commands::{check, log, summary, util};
use did_cli::{Cli, Commands, Config};

/// Loads config and applies the `--log-file` override.
fn load_config(config_path: Option<&Path>, log_file: Option<&Path>) -> Result<Config> {
    let mut config = Config::load_from(config_path).context("failed to load configuration")?;
    if let Some(log_file) = log_file {
        config.log_file = log_file.to_path_buf();
    }
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so command output stays parseable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = load_config(cli.config.as_deref(), cli.log_file.as_deref())?;
    let mut stdout = io::stdout().lock();

    match command {
        Commands::Log(args) => log::run(&mut stdout, args, &config, util::now())?,
        Commands::Summary(args) => summary::run(&mut stdout, args, &config, util::now())?,
        Commands::Check => check::run(&mut stdout, &config)?,
    }

    Ok(())
}
