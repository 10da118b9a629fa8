//! Loose filter parsing
//!
//! Accepted input shapes, all normalised to a [`Selector`]:
//!
//! - `{"$and": [..], "$or": [..]}`: explicit combinators
//! - `[{..}, {..}]`: implicit `$and` over the parts
//! - `{"index": ..}`: implicit `$and` over a single part
//!
//! Within a part each `index: value` pair becomes one [`Filter`]:
//!
//! - an object whose keys all start with `$` is an operator object
//! - an array is shorthand for `$in`
//! - any scalar is shorthand for `$eq`
//!
//! Pairs inside a part follow the key order of the JSON map.
//!
//! # Invariants
//!
//! - Parsing never consults the registered indexes
//! - Every rejection is `AERO_QUERY_SYNTAX`

use serde_json::{Map, Value};

use crate::index::IndexKey;

use super::ast::{Condition, Filter, Operator, Selector};
use super::errors::{QueryError, QueryResult};

/// Top-level shape of a filter before normalisation
#[derive(Debug, Clone, Copy)]
pub enum LooseQuery<'a> {
    /// Object carrying `$and` and/or `$or`
    Combinator(&'a Map<String, Value>),
    /// Array of parts, implicitly `$and`
    Parts(&'a [Value]),
    /// Single part, implicitly `$and`
    Shorthand(&'a Map<String, Value>),
}

impl<'a> LooseQuery<'a> {
    /// Classifies a filter value by its top-level shape
    pub fn from_value(value: &'a Value) -> QueryResult<Self> {
        match value {
            Value::Array(parts) => Ok(LooseQuery::Parts(parts)),
            Value::Object(map) if map.keys().any(|k| k.starts_with('$')) => {
                Ok(LooseQuery::Combinator(map))
            }
            Value::Object(map) => Ok(LooseQuery::Shorthand(map)),
            other => Err(QueryError::syntax(format!(
                "Query must be an object or an array, got {}",
                json_type(other)
            ))),
        }
    }

    /// Normalises into the strict form
    pub fn into_selector(self) -> QueryResult<Selector> {
        match self {
            LooseQuery::Combinator(map) => {
                let mut selector = Selector::default();
                for (key, value) in map {
                    match key.as_str() {
                        "$and" => selector.and = Some(parse_block(key, value)?),
                        "$or" => selector.or = Some(parse_block(key, value)?),
                        k if k.starts_with('$') => {
                            return Err(QueryError::syntax(format!("Unknown combinator '{}'", k)))
                        }
                        k => {
                            return Err(QueryError::syntax(format!(
                                "Index '{}' cannot be mixed with $and/$or at the top level",
                                k
                            )))
                        }
                    }
                }
                Ok(selector)
            }
            LooseQuery::Parts(parts) => Ok(Selector::and(parse_parts(parts)?)),
            LooseQuery::Shorthand(part) => Ok(Selector::and(parse_part(part)?)),
        }
    }
}

/// Parses any accepted filter shape into a [`Selector`]
pub fn parse_query(value: &Value) -> QueryResult<Selector> {
    LooseQuery::from_value(value)?.into_selector()
}

fn parse_block(combinator: &str, value: &Value) -> QueryResult<Vec<Filter>> {
    match value {
        Value::Array(parts) => parse_parts(parts),
        other => Err(QueryError::syntax(format!(
            "{} expects an array of objects, got {}",
            combinator,
            json_type(other)
        ))),
    }
}

fn parse_parts(parts: &[Value]) -> QueryResult<Vec<Filter>> {
    let mut filters = Vec::new();
    for part in parts {
        match part {
            Value::Object(map) => filters.extend(parse_part(map)?),
            other => {
                return Err(QueryError::syntax(format!(
                    "Query part must be an object, got {}",
                    json_type(other)
                )))
            }
        }
    }
    Ok(filters)
}

fn parse_part(part: &Map<String, Value>) -> QueryResult<Vec<Filter>> {
    let mut filters = Vec::with_capacity(part.len());
    for (index, value) in part {
        if index.starts_with('$') {
            return Err(QueryError::syntax(format!(
                "Combinator '{}' is only allowed at the top level",
                index
            )));
        }
        match value {
            Value::Object(ops) if is_operator_object(ops) => {
                for (op, operand) in ops {
                    let operator = Operator::parse(op).ok_or_else(|| {
                        QueryError::syntax(format!("Unknown operator '{}' on index '{}'", op, index))
                    })?;
                    filters.push(Filter::new(index.as_str(), condition(operator, operand)?));
                }
            }
            Value::Object(_) => {
                return Err(QueryError::syntax(format!(
                    "Value for index '{}' must be a scalar, an array or an operator object",
                    index
                )))
            }
            Value::Array(values) => {
                filters.push(Filter::new(index.as_str(), Condition::In(scalars(values)?)));
            }
            scalar => filters.push(Filter::new(index.as_str(), Condition::Eq(scalar_key(scalar)?))),
        }
    }
    Ok(filters)
}

fn is_operator_object(map: &Map<String, Value>) -> bool {
    !map.is_empty() && map.keys().all(|k| k.starts_with('$'))
}

fn condition(operator: Operator, operand: &Value) -> QueryResult<Condition> {
    Ok(match operator {
        Operator::Lt => Condition::Lt(scalar_key(operand)?),
        Operator::Lte => Condition::Lte(scalar_key(operand)?),
        Operator::Gt => Condition::Gt(scalar_key(operand)?),
        Operator::Gte => Condition::Gte(scalar_key(operand)?),
        Operator::Eq => Condition::Eq(scalar_key(operand)?),
        Operator::In => match operand {
            Value::Array(values) => Condition::In(scalars(values)?),
            other => {
                return Err(QueryError::syntax(format!(
                    "$in expects an array, got {}",
                    json_type(other)
                )))
            }
        },
    })
}

fn scalars(values: &[Value]) -> QueryResult<Vec<IndexKey>> {
    values.iter().map(scalar_key).collect()
}

fn scalar_key(value: &Value) -> QueryResult<IndexKey> {
    IndexKey::from_json(value).ok_or_else(|| {
        QueryError::syntax(format!("Operand must be a scalar, got {}", json_type(value)))
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
