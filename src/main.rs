//! Data sweeper CLI.

mod cli;
mod commands;
mod summary;

use crate::cli::Cli;
use crate::cli::LogFormatArg;
use crate::commands::run_sweep;
use clap::Parser;
use data_sweeper::logging::init_logging;
use data_sweeper::logging::LogConfig;
use data_sweeper::logging::LogFormat;
use std::io;
use std::io::IsTerminal;

fn main() {
    let cli = Cli::parse();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run_sweep(&cli) {
        Ok(has_failures) => i32::from(has_failures),
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags; explicit verbosity wins over `RUST_LOG`.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        use_env_filter: !cli.verbosity.is_present(),
        format: match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        },
        log_file: cli.log_file.clone(),
        with_ansi: cli.log_file.is_none() && io::stderr().is_terminal(),
        ..LogConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn explicit_verbosity_replaces_environment_filter() {
        let config = log_config_from_cli(&Cli::parse_from(["data-sweeper", "-v", "in.csv"]));
        assert_eq!(config.level_filter, LevelFilter::INFO);
        assert!(!config.use_env_filter);

        let config = log_config_from_cli(&Cli::parse_from(["data-sweeper", "-q", "in.csv"]));
        assert_eq!(config.level_filter, LevelFilter::ERROR);
        assert!(!config.use_env_filter);
    }

    #[test]
    fn environment_filter_applies_without_flags() {
        let config = log_config_from_cli(&Cli::parse_from(["data-sweeper", "--log-format", "json", "in.csv"]));
        assert_eq!(config.level_filter, LevelFilter::WARN);
        assert!(config.use_env_filter);
        assert_eq!(config.format, LogFormat::Json);
    }
}
