use clap::{CommandFactory, Parser};
use comparer_cli::cli::{self, Cli};
use comparer_cli::config::{self, Config};
use comparer_cli::{logging, ComparerError};
use crossterm::style::Stylize;
use std::io::IsTerminal;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(message) = cli.validate() {
        Cli::command()
            .error(clap::error::ErrorKind::ArgumentConflict, message)
            .exit();
    }

    let config = match Config::load(cli.config_file.as_deref()) {
        Ok(config) => config,
        // `config init --force` and `config path` must work on a broken file.
        Err(e) if cli.ignores_config_errors() => {
            logging::init_tracing(cli.verbose, false);
            tracing::warn!(target: "config", "{}", e);
            Config::default()
        }
        Err(e) => return fail(&e.into(), true),
    };

    if !config.display.use_color {
        crossterm::style::force_color_output(false);
    }
    logging::init_tracing(cli.verbose, config.display.use_color);
    let color = config.display.use_color;

    // Missing credentials are reported before any handler runs.
    if cli.needs_network() {
        if let Err(e) = config::api_key_from_env() {
            return fail(&e.into(), color);
        }
    }

    match cli::run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e, color),
    }
}

fn fail(err: &anyhow::Error, color: bool) -> ExitCode {
    tracing::debug!(target: "system", "Command failed: {:?}", err);
    let line = format!("Error: {err:#}");
    if color && std::io::stderr().is_terminal() {
        eprintln!("{}", line.red());
    } else {
        eprintln!("{line}");
    }
    match err.downcast_ref::<ComparerError>() {
        Some(ComparerError::Usage(_)) => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}
