//! CLI command implementations
//!
//! Each command loads the configured store from the data file, runs one
//! operation and prints one response object. Commands return their
//! response data so they can be exercised without stdin/stdout.

use std::path::Path;

use serde_json::{json, Value};

use crate::index::IndexKey;
use crate::query::parse_query;
use crate::store::{InMemoryStore, StoreConfig, StoreError};

use super::args::Command;
use super::errors::CliResult;
use super::io::{read_documents, read_request, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments, dispatches, and prints the response. Failures are
/// also printed as an error response before being returned.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    match run_command(cli.command) {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<Value> {
    match cmd {
        Command::Query { config, data } => query(&config, &data, &read_request()?),
        Command::Get {
            config,
            data,
            index,
            values,
        } => get(&config, &data, &index, &values),
        Command::Keys { config, data, index } => keys(&config, &data, &index),
        Command::Explain => explain(&read_request()?),
    }
}

/// Load the configured store and fill it from the data file
pub fn open_store(config_path: &Path, data_path: &Path) -> CliResult<InMemoryStore<Value>> {
    let config = StoreConfig::load(config_path)?;
    let mut store = InMemoryStore::from_config(&config)?;
    store.populate(read_documents(data_path)?)?;
    Ok(store)
}

/// Documents matching `filter`
pub fn query(config_path: &Path, data_path: &Path, filter: &Value) -> CliResult<Value> {
    let store = open_store(config_path, data_path)?;
    let items = store.find(filter)?;
    Ok(documents(items))
}

/// Documents stored under any of `raw_keys` in `index`
pub fn get(config_path: &Path, data_path: &Path, index: &str, raw_keys: &[String]) -> CliResult<Value> {
    let store = open_store(config_path, data_path)?;
    let keys: Vec<IndexKey> = raw_keys.iter().map(|raw| parse_key(raw)).collect();
    let items = store.get(index, &keys)?;
    Ok(documents(items))
}

/// Keys of `index` in index order
pub fn keys(config_path: &Path, data_path: &Path, index: &str) -> CliResult<Value> {
    let store = open_store(config_path, data_path)?;
    let keys = store.get_index_keys(index)?;
    Ok(Value::Array(keys.iter().map(IndexKey::to_json).collect()))
}

/// Strict form of `filter`; no store is loaded
pub fn explain(filter: &Value) -> CliResult<Value> {
    let selector = parse_query(filter).map_err(StoreError::from)?;
    Ok(json!({ "selector": selector.to_json() }))
}

/// A command-line key: JSON scalar if it parses as one, else a string
fn parse_key(raw: &str) -> IndexKey {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|value| IndexKey::from_json(&value))
        .unwrap_or_else(|| IndexKey::from(raw))
}

fn documents(items: Vec<&Value>) -> Value {
    Value::Array(items.into_iter().cloned().collect())
}
