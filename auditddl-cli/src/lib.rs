//! auditddl CLI library
//!
//! The binary (main.rs) only wires logging, configuration and standard
//! output into the dispatcher defined here.

pub mod dispatcher;

pub use dispatcher::{dispatch, parse_args, run, write_message, Cli, Outcome, Parsed, Target, USAGE};
