//! Query layer
//!
//! Loose JSON filters are parsed into a strict [`Selector`] and evaluated
//! against named indexes by the [`QueryEngine`].

mod ast;
mod engine;
mod errors;
mod parser;

pub use ast::{Combinator, Condition, Filter, Operator, Selector};
pub use engine::{apply, intersect, IndexLookup, QueryEngine};
pub use errors::{QueryError, QueryErrorCode, QueryResult, Severity};
pub use parser::{parse_query, LooseQuery};
