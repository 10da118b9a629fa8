//! Command-line interface
//!
//! One-shot commands over a configured store filled from a JSON data
//! file:
//! - query: evaluate a filter from stdin
//! - get: look up index keys
//! - keys: list an index's keys
//! - explain: print the strict form of a filter

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{explain, get, keys, open_store, query, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_documents, read_request, write_error, write_response};
