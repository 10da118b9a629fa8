//! Strict query AST
//!
//! Every accepted filter expression normalises to a [`Selector`]:
//! optional `$and` and `$or` lists of single-index [`Filter`]s.

use serde_json::{Map, Value};

use crate::index::IndexKey;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    In,
}

impl Operator {
    /// Returns the operator as written in filters
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Lt => "$lt",
            Operator::Lte => "$lte",
            Operator::Gt => "$gt",
            Operator::Gte => "$gte",
            Operator::Eq => "$eq",
            Operator::In => "$in",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "$lt" => Some(Operator::Lt),
            "$lte" => Some(Operator::Lte),
            "$gt" => Some(Operator::Gt),
            "$gte" => Some(Operator::Gte),
            "$eq" => Some(Operator::Eq),
            "$in" => Some(Operator::In),
            _ => None,
        }
    }

    /// Returns true for `$lt`, `$lte`, `$gt`, `$gte`
    pub fn is_range(&self) -> bool {
        matches!(self, Operator::Lt | Operator::Lte | Operator::Gt | Operator::Gte)
    }
}

/// Operator bound to its operand
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Lt(IndexKey),
    Lte(IndexKey),
    Gt(IndexKey),
    Gte(IndexKey),
    Eq(IndexKey),
    In(Vec<IndexKey>),
}

impl Condition {
    pub fn operator(&self) -> Operator {
        match self {
            Condition::Lt(_) => Operator::Lt,
            Condition::Lte(_) => Operator::Lte,
            Condition::Gt(_) => Operator::Gt,
            Condition::Gte(_) => Operator::Gte,
            Condition::Eq(_) => Operator::Eq,
            Condition::In(_) => Operator::In,
        }
    }

    fn operand_json(&self) -> Value {
        match self {
            Condition::Lt(k)
            | Condition::Lte(k)
            | Condition::Gt(k)
            | Condition::Gte(k)
            | Condition::Eq(k) => k.to_json(),
            Condition::In(keys) => Value::Array(keys.iter().map(IndexKey::to_json).collect()),
        }
    }
}

/// One condition against one named index
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Index name
    pub index: String,
    pub condition: Condition,
}

impl Filter {
    pub fn new(index: impl Into<String>, condition: Condition) -> Self {
        Self {
            index: index.into(),
            condition,
        }
    }

    pub fn eq(index: impl Into<String>, key: impl Into<IndexKey>) -> Self {
        Self::new(index, Condition::Eq(key.into()))
    }

    pub fn lt(index: impl Into<String>, key: impl Into<IndexKey>) -> Self {
        Self::new(index, Condition::Lt(key.into()))
    }

    pub fn lte(index: impl Into<String>, key: impl Into<IndexKey>) -> Self {
        Self::new(index, Condition::Lte(key.into()))
    }

    pub fn gt(index: impl Into<String>, key: impl Into<IndexKey>) -> Self {
        Self::new(index, Condition::Gt(key.into()))
    }

    pub fn gte(index: impl Into<String>, key: impl Into<IndexKey>) -> Self {
        Self::new(index, Condition::Gte(key.into()))
    }

    pub fn in_list<I, K>(index: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<IndexKey>,
    {
        Self::new(index, Condition::In(keys.into_iter().map(Into::into).collect()))
    }

    /// Strict JSON form: `{index: {operator: operand}}`
    pub fn to_json(&self) -> Value {
        let mut op = Map::new();
        op.insert(self.condition.operator().as_str().to_string(), self.condition.operand_json());
        let mut part = Map::new();
        part.insert(self.index.clone(), Value::Object(op));
        Value::Object(part)
    }
}

/// Boolean combinators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Combinator::And => "$and",
            Combinator::Or => "$or",
        }
    }
}

/// Parsed query.
///
/// A present combinator with no filters is kept (`Some(vec![])`) and
/// evaluates to nothing, as does a selector with no combinators.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selector {
    pub and: Option<Vec<Filter>>,
    pub or: Option<Vec<Filter>>,
}

impl Selector {
    /// Selector with only an `$and` block
    pub fn and(filters: Vec<Filter>) -> Self {
        Self {
            and: Some(filters),
            or: None,
        }
    }

    /// Selector with only an `$or` block
    pub fn or(filters: Vec<Filter>) -> Self {
        Self {
            and: None,
            or: Some(filters),
        }
    }

    pub fn with_and(mut self, filters: Vec<Filter>) -> Self {
        self.and = Some(filters);
        self
    }

    pub fn with_or(mut self, filters: Vec<Filter>) -> Self {
        self.or = Some(filters);
        self
    }

    /// Present combinator blocks, `$and` first
    pub fn blocks(&self) -> impl Iterator<Item = (Combinator, &[Filter])> {
        [
            (Combinator::And, self.and.as_deref()),
            (Combinator::Or, self.or.as_deref()),
        ]
        .into_iter()
        .filter_map(|(combinator, filters)| filters.map(|f| (combinator, f)))
    }

    /// Every filter in every block
    pub fn filters(&self) -> impl Iterator<Item = &Filter> {
        self.blocks().flat_map(|(_, filters)| filters.iter())
    }

    /// Strict JSON form: `{"$and": [...], "$or": [...]}`
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        for (combinator, filters) in self.blocks() {
            out.insert(
                combinator.as_str().to_string(),
                Value::Array(filters.iter().map(Filter::to_json).collect()),
            );
        }
        Value::Object(out)
    }
}

impl From<Selector> for Value {
    fn from(selector: Selector) -> Self {
        selector.to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_round_trip() {
        for op in [
            Operator::Lt,
            Operator::Lte,
            Operator::Gt,
            Operator::Gte,
            Operator::Eq,
            Operator::In,
        ] {
            assert_eq!(Operator::parse(op.as_str()), Some(op));
        }
        assert_eq!(Operator::parse("$ne"), None);
        assert!(Operator::Gte.is_range());
        assert!(!Operator::In.is_range());
    }

    #[test]
    fn test_filter_to_json() {
        assert_eq!(Filter::eq("color", "red").to_json(), json!({"color": {"$eq": "red"}}));
        assert_eq!(
            Filter::in_list("n", [1i64, 2]).to_json(),
            json!({"n": {"$in": [1, 2]}})
        );
    }

    #[test]
    fn test_selector_blocks() {
        let selector = Selector::and(vec![Filter::gt("age", 3i64)]).with_or(vec![
            Filter::eq("a", 1i64),
            Filter::eq("b", 2i64),
        ]);
        let blocks: Vec<_> = selector.blocks().map(|(c, f)| (c, f.len())).collect();
        assert_eq!(blocks, vec![(Combinator::And, 1), (Combinator::Or, 2)]);
        assert_eq!(selector.filters().count(), 3);
        assert_eq!(
            selector.to_json(),
            json!({"$and": [{"age": {"$gt": 3}}], "$or": [{"a": {"$eq": 1}}, {"b": {"$eq": 2}}]})
        );
    }

    #[test]
    fn test_empty_selector() {
        let selector = Selector::default();
        assert_eq!(selector.blocks().count(), 0);
        assert_eq!(selector.to_json(), json!({}));
    }
}
