//! Query evaluation
//!
//! Every filter is resolved against the registered indexes before any
//! index is read, so an unknown name fails the whole query. Each filter
//! then dispatches to the index's matching operation.
//!
//! Combinators:
//! - `$and`: intersection of the per-filter results
//! - `$or`: concatenation of the per-filter results, duplicates kept
//! - both present: intersection of the two combined results
//!
//! A query with no combinator, or an empty `$and`, yields nothing.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::index::{Index, ItemId};
use crate::observability::{log_event, Event};

use super::ast::{Combinator, Condition, Filter, Selector};
use super::errors::{QueryError, QueryResult};
use super::parser::parse_query;

/// Name-to-index resolution used by the engine
pub trait IndexLookup<T> {
    fn lookup(&self, name: &str) -> Option<&dyn Index<T>>;
}

impl<T> IndexLookup<T> for HashMap<String, Box<dyn Index<T>>> {
    fn lookup(&self, name: &str) -> Option<&dyn Index<T>> {
        self.get(name).map(|index| index.as_ref())
    }
}

/// Evaluates selectors against a set of indexes
pub struct QueryEngine<'a, T> {
    indexes: &'a dyn IndexLookup<T>,
}

impl<'a, T> QueryEngine<'a, T> {
    pub fn new(indexes: &'a dyn IndexLookup<T>) -> Self {
        Self { indexes }
    }

    /// Parses and evaluates a loose filter
    pub fn find(&self, query: &Value) -> QueryResult<Vec<ItemId>> {
        let selector = parse_query(query)?;
        self.find_selector(&selector)
    }

    /// Evaluates an already-parsed selector
    pub fn find_selector(&self, selector: &Selector) -> QueryResult<Vec<ItemId>> {
        let mut blocks = Vec::new();
        for (combinator, filters) in selector.blocks() {
            blocks.push((combinator, self.resolve(filters)?));
        }

        let partials: Vec<Vec<ItemId>> = blocks
            .into_iter()
            .map(|(combinator, resolved)| {
                let results = resolved
                    .into_iter()
                    .map(|(index, condition)| apply(index, condition));
                match combinator {
                    Combinator::And => intersect(results.collect()),
                    Combinator::Or => results.flatten().collect(),
                }
            })
            .collect();

        let ids = intersect(partials);
        let filters = selector.filters().count().to_string();
        let results = ids.len().to_string();
        log_event(
            Event::QueryEvaluated,
            &[("filters", filters.as_str()), ("results", results.as_str())],
        );
        Ok(ids)
    }

    fn resolve<'f>(
        &self,
        filters: &'f [Filter],
    ) -> QueryResult<Vec<(&'a dyn Index<T>, &'f Condition)>> {
        filters
            .iter()
            .map(|filter| {
                self.indexes
                    .lookup(&filter.index)
                    .map(|index| (index, &filter.condition))
                    .ok_or_else(|| QueryError::unknown_index(filter.index.as_str()))
            })
            .collect()
    }
}

/// Runs one condition against one index
pub fn apply<T>(index: &dyn Index<T>, condition: &Condition) -> Vec<ItemId> {
    match condition {
        Condition::Lt(key) => index.lt(key),
        Condition::Lte(key) => index.lte(key),
        Condition::Gt(key) => index.gt(key),
        Condition::Gte(key) => index.gte(key),
        Condition::Eq(key) => index.find(key),
        Condition::In(keys) => index.find_many(keys),
    }
}

/// Intersection of id lists.
///
/// The shortest list (the first one on ties) drives the output order.
/// A candidate already accepted is accepted again without re-checking,
/// so duplicates in the driving list survive. No lists yields nothing.
pub fn intersect(mut lists: Vec<Vec<ItemId>>) -> Vec<ItemId> {
    let Some(shortest) = lists
        .iter()
        .enumerate()
        .min_by_key(|(_, list)| list.len())
        .map(|(pos, _)| pos)
    else {
        return Vec::new();
    };
    let driver = lists.remove(shortest);
    let others: Vec<HashSet<&ItemId>> =
        lists.iter().map(|list| list.iter().collect()).collect();

    let mut accepted: HashSet<ItemId> = HashSet::new();
    let mut out = Vec::with_capacity(driver.len());
    for id in driver {
        if accepted.contains(&id) || others.iter().all(|set| set.contains(&id)) {
            accepted.insert(id.clone());
            out.push(id);
        }
    }
    out
}
