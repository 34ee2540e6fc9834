//! auditddl command-line tool
//!
//! Writes create, create-drop or update DDL for a persistence unit, audit
//! tables included.

use anyhow::Context;
use auditddl::{AuditSchemaExporter, ExportConfig, ExportError};
use auditddl_cli::{dispatch, parse_args, write_message, Cli, Parsed};
use colored::Colorize;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let cli = match parse_args(std::env::args_os()) {
        Parsed::Cli(cli) => cli,
        Parsed::Message(message) => {
            return match write_message(&mut io::stdout().lock(), &message) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => report(e),
            };
        }
    };

    init_logging(&cli);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match dispatch(&cli, &mut out, || load_exporter(&cli)) {
        Ok(outcome) => {
            log::debug!("Finished: {:?}", outcome);
            ExitCode::SUCCESS
        }
        Err(e) => report(e),
    }
}

fn report(e: anyhow::Error) -> ExitCode {
    eprintln!("{} {:#}", "Error:".red().bold(), e);
    ExitCode::FAILURE
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_exporter(cli: &Cli) -> anyhow::Result<AuditSchemaExporter> {
    let mut config = ExportConfig::load()
        .map_err(ExportError::from)
        .context("Failed to load configuration")?;
    if let Some(path) = &cli.persistence {
        config.persistence_file = path.clone();
    }
    log::debug!("Using persistence descriptor {}", config.persistence_file.display());
    Ok(AuditSchemaExporter::from_config(&config)?)
}
