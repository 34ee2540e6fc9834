//! Command-line dispatcher.
//!
//! Turns the argument list into a schema export, a validation message or the
//! usage text. Everything is written to an injected sink unless the
//! invocation names an output file.
//!
//! Action values are only counted, never interpreted: everything after the
//! action flag belongs to it, including values starting with `-`. Global
//! flags such as `--verbose` therefore go before the action.

use anyhow::Context;
use auditddl::{ExportAction, ExportError, JdbcCredentials, SchemaExporter};
use clap::error::ErrorKind;
use clap::{ArgGroup, Parser};
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

pub const USAGE: &str = "Usage: \n\
\t--create unitName filename - Create table commands\n\
\t--create-drop unitName filename - Create table and drop commands\n\
\t--update unitName jdbcUrl jdbcUsername jdbcPassword filename - Alter table commands based on your database\n\
\n\
\tfilename is the name of the file where to write\n";

pub const EXPECTED_CREATE_ARGS: &str = "Expected unitName and filename\n";
pub const EXPECTED_UPDATE_ARGS: &str = "Expected unitName jdbcUrl jdbcUsername jdbcPassword [filename]\n";

/// Filename that routes the script to the output sink
pub const SINK_FILENAME: &str = "-";

#[derive(Parser, Debug)]
#[command(name = "auditddl")]
#[command(about = "DDL export for audited persistence units")]
#[command(version)]
#[command(group(ArgGroup::new("action").args(["create", "create_drop", "update"]).multiple(false)))]
pub struct Cli {
    /// Create table commands: unitName filename
    #[arg(long, num_args = 0.., allow_hyphen_values = true, value_name = "ARGS")]
    pub create: Option<Vec<String>>,

    /// Drop then create table commands: unitName filename
    #[arg(long = "create-drop", num_args = 0.., allow_hyphen_values = true, value_name = "ARGS")]
    pub create_drop: Option<Vec<String>>,

    /// Alter table commands: unitName jdbcUrl jdbcUsername jdbcPassword [filename]
    #[arg(long, num_args = 0.., allow_hyphen_values = true, value_name = "ARGS")]
    pub update: Option<Vec<String>>,

    /// Persistence descriptor (overrides the configured one)
    #[arg(long, value_name = "FILE")]
    pub persistence: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Result of parsing the raw argument list
#[derive(Debug)]
pub enum Parsed {
    Cli(Cli),
    /// Text to print as-is: usage, help or version
    Message(String),
}

/// Where a generated script goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Sink,
    File(PathBuf),
}

impl Target {
    fn from_arg(arg: Option<&String>) -> Self {
        match arg {
            Some(name) if name != SINK_FILENAME => Target::File(PathBuf::from(name)),
            _ => Target::Sink,
        }
    }
}

/// A validated command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Usage,
    /// Argument-count error, carrying the message to print
    MissingArguments(&'static str),
    Export {
        unit: String,
        action: ExportAction,
        target: Target,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Usage,
    MissingArguments,
    Exported(Target),
}

/// Parse `args` (program name first); unknown flags fall back to the usage text
pub fn parse_args<I, T>(args: I) -> Parsed
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Parsed::Cli(cli),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Parsed::Message(err.to_string())
        }
        Err(_) => Parsed::Message(USAGE.to_string()),
    }
}

impl Cli {
    pub fn invocation(&self) -> Invocation {
        if let Some(args) = &self.create {
            return create_invocation(args, ExportAction::Create);
        }
        if let Some(args) = &self.create_drop {
            return create_invocation(args, ExportAction::CreateDrop);
        }
        if let Some(args) = &self.update {
            return update_invocation(args);
        }
        Invocation::Usage
    }
}

fn create_invocation(args: &[String], action: ExportAction) -> Invocation {
    match args {
        [unit, filename] => Invocation::Export {
            unit: unit.clone(),
            action,
            target: Target::from_arg(Some(filename)),
        },
        [] | [_] => Invocation::MissingArguments(EXPECTED_CREATE_ARGS),
        _ => Invocation::Usage,
    }
}

fn update_invocation(args: &[String]) -> Invocation {
    match args {
        [unit, url, username, password, rest @ ..] if rest.len() <= 1 => Invocation::Export {
            unit: unit.clone(),
            action: ExportAction::Update(JdbcCredentials::new(url, username, password)),
            target: Target::from_arg(rest.first()),
        },
        _ if args.len() < 4 => Invocation::MissingArguments(EXPECTED_UPDATE_ARGS),
        _ => Invocation::Usage,
    }
}

/// Write `message` to `out` and flush it
pub fn write_message<W: Write>(out: &mut W, message: &str) -> anyhow::Result<()> {
    out.write_all(message.as_bytes())
        .and_then(|()| out.flush())
        .context("Failed to write output")
}

/// Run a parsed command line
///
/// `exporter` is only invoked once the arguments are valid, so usage and
/// validation messages never need a persistence descriptor.
pub fn dispatch<W, F, E>(cli: &Cli, out: &mut W, exporter: F) -> anyhow::Result<Outcome>
where
    W: Write,
    F: FnOnce() -> anyhow::Result<E>,
    E: SchemaExporter,
{
    match cli.invocation() {
        Invocation::Usage => {
            write_message(out, USAGE)?;
            Ok(Outcome::Usage)
        }
        Invocation::MissingArguments(message) => {
            write_message(out, message)?;
            Ok(Outcome::MissingArguments)
        }
        Invocation::Export { unit, action, target } => {
            let exporter = exporter()?;
            let script = exporter
                .generate(&unit, &action)
                .with_context(|| format!("Failed to export unit '{}'", unit))?;

            match &target {
                Target::Sink => write_message(out, &script)?,
                Target::File(path) => {
                    fs::write(path, &script).map_err(|source| ExportError::Io {
                        path: path.display().to_string(),
                        source,
                    })?;
                    log::info!("Wrote {} bytes to {}", script.len(), path.display());
                }
            }
            Ok(Outcome::Exported(target))
        }
    }
}

/// Parse `args` and dispatch them against `exporter`
pub fn run<I, T, W>(args: I, out: &mut W, exporter: &dyn SchemaExporter) -> anyhow::Result<Outcome>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
{
    match parse_args(args) {
        Parsed::Cli(cli) => dispatch(&cli, out, || Ok(exporter)),
        Parsed::Message(message) => {
            write_message(out, &message)?;
            Ok(Outcome::Usage)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(args: &[&str]) -> Invocation {
        let argv = std::iter::once("auditddl").chain(args.iter().copied());
        match parse_args(argv) {
            Parsed::Cli(cli) => cli.invocation(),
            Parsed::Message(_) => Invocation::Usage,
        }
    }

    #[test]
    fn test_no_args_is_usage() {
        assert_eq!(invocation(&[]), Invocation::Usage);
    }

    #[test]
    fn test_create_argument_counts() {
        assert_eq!(invocation(&["--create"]), Invocation::MissingArguments(EXPECTED_CREATE_ARGS));
        assert_eq!(invocation(&["--create", "unit"]), Invocation::MissingArguments(EXPECTED_CREATE_ARGS));
        assert_eq!(
            invocation(&["--create-drop", "unit", "out.sql"]),
            Invocation::Export {
                unit: "unit".to_string(),
                action: ExportAction::CreateDrop,
                target: Target::File(PathBuf::from("out.sql")),
            }
        );
        assert_eq!(invocation(&["--create", "unit", "a.sql", "b.sql"]), Invocation::Usage);
    }

    #[test]
    fn test_dash_filename_targets_sink() {
        assert_eq!(
            invocation(&["--create", "unit", "-"]),
            Invocation::Export {
                unit: "unit".to_string(),
                action: ExportAction::Create,
                target: Target::Sink,
            }
        );
    }

    #[test]
    fn test_update_argument_counts() {
        assert_eq!(
            invocation(&["--update", "unit", "jdbc:postgresql:app", "foo"]),
            Invocation::MissingArguments(EXPECTED_UPDATE_ARGS)
        );

        let expected_action = ExportAction::Update(JdbcCredentials::new("jdbc:postgresql:app", "foo", "bar"));
        assert_eq!(
            invocation(&["--update", "unit", "jdbc:postgresql:app", "foo", "bar"]),
            Invocation::Export {
                unit: "unit".to_string(),
                action: expected_action.clone(),
                target: Target::Sink,
            }
        );
        assert_eq!(
            invocation(&["--update", "unit", "jdbc:postgresql:app", "foo", "bar", "out.sql"]),
            Invocation::Export {
                unit: "unit".to_string(),
                action: expected_action,
                target: Target::File(PathBuf::from("out.sql")),
            }
        );
        assert_eq!(
            invocation(&["--update", "unit", "jdbc:postgresql:app", "foo", "bar", "out.sql", "extra"]),
            Invocation::Usage
        );
        assert_eq!(
            invocation(&["--update", "unit", "jdbc:postgresql:app", "-v", "-secret"]),
            Invocation::Export {
                unit: "unit".to_string(),
                action: ExportAction::Update(JdbcCredentials::new("jdbc:postgresql:app", "-v", "-secret")),
                target: Target::Sink,
            }
        );
    }

    #[test]
    fn test_hyphenated_values_are_counted() {
        assert_eq!(
            invocation(&["--create", "unit", "-out.sql"]),
            Invocation::Export {
                unit: "unit".to_string(),
                action: ExportAction::Create,
                target: Target::File(PathBuf::from("-out.sql")),
            }
        );
        assert_eq!(
            invocation(&["--update", "unit", "jdbc:postgresql:app", "foo", "-1", "-out.sql"]),
            Invocation::Export {
                unit: "unit".to_string(),
                action: ExportAction::Update(JdbcCredentials::new("jdbc:postgresql:app", "foo", "-1")),
                target: Target::File(PathBuf::from("-out.sql")),
            }
        );
    }

    #[test]
    fn test_global_flags_before_action() {
        let argv = ["auditddl", "-v", "--persistence", "units.toml", "--create", "unit", "out.sql"];
        match parse_args(argv) {
            Parsed::Cli(cli) => {
                assert!(cli.verbose);
                assert_eq!(cli.persistence, Some(PathBuf::from("units.toml")));
                assert_eq!(cli.create, Some(vec!["unit".to_string(), "out.sql".to_string()]));
            }
            other => panic!("expected a command line, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_flag_and_mixed_flags_are_usage() {
        assert!(matches!(
            parse_args(["auditddl", "--validate", "unit"]),
            Parsed::Message(message) if message == USAGE
        ));
        assert_eq!(
            invocation(&["--create", "unit", "a.sql", "--update", "unit"]),
            Invocation::Usage
        );
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_message_reports_closed_output() {
        let err = write_message(&mut ClosedPipe, USAGE).unwrap_err();
        let io = err.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_help_is_rendered_by_clap() {
        match parse_args(["auditddl", "--help"]) {
            Parsed::Message(message) => assert!(message.contains("--create-drop")),
            other => panic!("expected help text, got {:?}", other),
        }
    }
}
