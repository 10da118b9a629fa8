//! aeroindex CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`; exits non-zero on
//! failure after the error response has been printed.

use aeroindex::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
