//! Zone pipeline CLI.

use clap::{ColorChoice, Parser};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;
use zones_cli::config::{ConfigOverrides, PipelineConfig};
use zones_cli::logging::{LogConfig, LogFormat, init_logging};

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run, run_integrate, run_load, run_relations, run_resolve};
use crate::summary::{
    print_integration_summary, print_load_summary, print_pipeline_report, print_relations,
    print_resolution,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match execute(&cli) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn execute(cli: &Cli) -> anyhow::Result<()> {
    let overrides = ConfigOverrides {
        database_url: cli.database_url.clone(),
        root: match &cli.command {
            Command::Run(args) => args.root.clone(),
            _ => None,
        },
    };
    let config = PipelineConfig::load(cli.config.as_deref(), overrides)?;

    match &cli.command {
        Command::Load(args) => print_load_summary(&run_load(&config, args)?),
        Command::Integrate(args) => print_integration_summary(&run_integrate(&config, args)?),
        Command::Resolve(args) => print_resolution(&run_resolve(&config, args)?),
        Command::Relations => print_relations(&run_relations(&config)?),
        Command::Run(_) => print_pipeline_report(&run(&config)?),
    }
    Ok(())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
