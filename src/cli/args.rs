//! CLI argument definitions using clap
//!
//! Commands:
//! - aeroindex query --config <path> --data <path>   (filter on stdin)
//! - aeroindex get --config <path> --data <path> --index <name> <value>...
//! - aeroindex keys --config <path> --data <path> --index <name>
//! - aeroindex explain                                (filter on stdin)

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// aeroindex - query JSON documents through secondary indexes
#[derive(Parser, Debug)]
#[command(name = "aeroindex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate a filter read from stdin and print the matching documents
    Query {
        /// Path to the store configuration
        #[arg(long, default_value = "./aeroindex.json")]
        config: PathBuf,

        /// Path to a JSON array of documents
        #[arg(long, default_value = "./data.json")]
        data: PathBuf,
    },

    /// Print the documents stored under any of the given index keys
    Get {
        #[arg(long, default_value = "./aeroindex.json")]
        config: PathBuf,

        #[arg(long, default_value = "./data.json")]
        data: PathBuf,

        /// Index name
        #[arg(long)]
        index: String,

        /// Keys, parsed as JSON scalars and falling back to strings
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Print the keys of an index in index order
    Keys {
        #[arg(long, default_value = "./aeroindex.json")]
        config: PathBuf,

        #[arg(long, default_value = "./data.json")]
        data: PathBuf,

        #[arg(long)]
        index: String,
    },

    /// Print the strict form of a filter read from stdin
    Explain,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
