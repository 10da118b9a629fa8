//! Store configuration
//!
//! A JSON file declaring the primary key and the secondary indexes of a
//! store of `serde_json::Value` documents. Field references are either a
//! top-level field name or a JSON pointer (`/address/city`).

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collections::Comparer;
use crate::index::{AvlIndex, BinaryIndex, HashIndex, Index, IndexKey, IndexKind};
use crate::observability::{log_event, Event, Logger, Severity};

use super::errors::{StoreError, StoreResult};
use super::memory::InMemoryStore;

/// Store declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Field holding the primary key (required)
    pub primary_key: String,

    /// Minimum log severity (optional, default "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub indexes: Vec<IndexDefinition>,
}

/// One secondary index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexDefinition {
    pub name: String,
    pub kind: IndexKind,
    /// Field the index key is read from
    pub field: String,
    /// Field the item id is read from (default: the primary key)
    #[serde(default)]
    pub item_field: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
}

/// Key order of an ordered index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl StoreConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> StoreResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| StoreError::config(format!("Failed to read config: {}", e)))?;
        let config = Self::from_json(&content)?;
        let indexes = config.indexes.len().to_string();
        let path = path.display().to_string();
        log_event(
            Event::ConfigLoaded,
            &[("indexes", indexes.as_str()), ("path", path.as_str())],
        );
        Ok(config)
    }

    /// Parse and validate a configuration document
    pub fn from_json(content: &str) -> StoreResult<Self> {
        let config: StoreConfig = serde_json::from_str(content)
            .map_err(|e| StoreError::config(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.primary_key.trim().is_empty() {
            return Err(StoreError::config("primary_key must not be empty"));
        }
        self.severity()?;

        let mut seen = HashSet::new();
        for def in &self.indexes {
            if def.name.is_empty() {
                return Err(StoreError::config("Index name must not be empty"));
            }
            if !seen.insert(def.name.as_str()) {
                return Err(StoreError::config(format!("Duplicate index name '{}'", def.name)));
            }
            if def.field.trim().is_empty() {
                return Err(StoreError::config(format!(
                    "Index '{}' has an empty field",
                    def.name
                )));
            }
            if def.kind == IndexKind::Hash && def.order == SortOrder::Desc {
                return Err(StoreError::config(format!(
                    "Index '{}': hash indexes have no order",
                    def.name
                )));
            }
        }
        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> StoreResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            StoreError::config(format!("Invalid log_level: '{}'", self.log_level))
        })
    }
}

impl IndexDefinition {
    /// Builds the empty index this definition describes
    pub fn build(&self, primary_key: &str) -> Box<dyn Index<Value>> {
        let item_fn = field_extractor(self.item_field.as_deref().unwrap_or(primary_key));
        let key_fn = field_extractor(&self.field);
        let comparer = match self.order {
            SortOrder::Asc => Comparer::natural(),
            SortOrder::Desc => Comparer::<IndexKey>::natural().reverse(),
        };
        match self.kind {
            IndexKind::Hash => Box::new(HashIndex::new(self.name.as_str(), item_fn, key_fn)),
            IndexKind::Binary => Box::new(BinaryIndex::with_comparer(
                self.name.as_str(),
                item_fn,
                key_fn,
                comparer,
            )),
            IndexKind::Avl => Box::new(AvlIndex::with_comparer(
                self.name.as_str(),
                item_fn,
                key_fn,
                comparer,
            )),
        }
    }
}

impl InMemoryStore<Value> {
    /// Builds an empty store with every configured index registered.
    ///
    /// Also applies the configured log level.
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        Logger::set_min_severity(config.severity()?);

        let mut store = InMemoryStore::new(field_extractor(&config.primary_key));
        for def in &config.indexes {
            store.ensure_index(def.build(&config.primary_key))?;
        }
        Ok(store)
    }
}

/// Reads `field` from `item` as an index key.
///
/// Missing fields and non-scalar values yield `IndexKey::Null`.
pub fn field_key(item: &Value, field: &str) -> IndexKey {
    let value = if field.starts_with('/') {
        item.pointer(field)
    } else {
        item.get(field)
    };
    value
        .and_then(IndexKey::from_json)
        .unwrap_or(IndexKey::Null)
}

fn field_extractor(field: &str) -> impl Fn(&Value) -> IndexKey + Send + Sync + 'static {
    let field = field.to_string();
    move |item: &Value| field_key(item, &field)
}
