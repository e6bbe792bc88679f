//! CLI module for idfkit
//!
//! Provides command-line interface for:
//! - find / describe: Dictionary queries
//! - check / format / show: Reading IDF files
//! - build: Assembling a model from JSON lines

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{build, check, describe, find, format, run, run_command, show, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_requests, write_response};
