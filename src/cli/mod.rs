//! CLI module for the expander
//!
//! Provides command-line interface for:
//! - expand: Expand references in a JSON document and select fields
//! - parse: Show the tree of a selection expression

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{expand_command, expand_document, parse_command, run, run_command, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_input, read_input, write_json};
