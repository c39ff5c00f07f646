//! Filter-expression compilation.
//!
//! The pipeline: a wire filter spec (JSON) parses into a `FilterNode`
//! tree with coerced values, compiles into a `Predicate` with resolved
//! fields, relations, and operators, and lands in a `ComposedQuery`
//! alongside the order and group specs. Every stage is pure over
//! request-scoped input; the registry and operator table are read-only.

pub mod coerce;
pub mod compile;
pub mod filter;
pub mod op;
pub mod plan;
pub mod predicate;
pub(crate) mod resolve;

pub use compile::QueryBuilder;
pub use filter::{Argument, Filter, FilterNode};
pub use op::{BinaryOp, Operator, RelatedOp, UnaryOp};
pub use plan::{ComposedQuery, GroupKey, OrderDirection, OrderKey, SortTarget};
pub use predicate::{CompareOp, ComparePredicate, Predicate, Quantifier};

use thiserror::Error as ThisError;

///
/// QueryError
/// Everything that can go wrong turning a filter spec into a query.
///

#[derive(Debug, ThisError)]
pub enum QueryError {
    #[error("unknown operator '{op}'")]
    UnknownOperator { op: String },

    #[error("operator '{op}' expects {expected}")]
    ArityMismatch { op: String, expected: &'static str },

    #[error("unknown field '{field}' on entity '{entity}'")]
    UnknownField { entity: String, field: String },

    #[error("unknown entity '{entity}'")]
    UnknownEntity { entity: String },

    #[error(
        "cannot compare field '{field}' to NULL; use the is_null / is_not_null operators instead"
    )]
    ComparisonToNull { field: String },

    #[error("cannot parse '{value}' as a {target} value for field '{field}'")]
    DateTimeParse {
        field: String,
        value: String,
        target: &'static str,
    },

    #[error("malformed filter: {0}")]
    MalformedFilter(#[from] MalformedFilterError),
}

impl QueryError {
    pub(crate) fn unknown_field(entity: &str, field: &str) -> Self {
        Self::UnknownField {
            entity: entity.to_string(),
            field: field.to_string(),
        }
    }

    pub(crate) fn arity(op: &str, expected: &'static str) -> Self {
        Self::ArityMismatch {
            op: op.to_string(),
            expected,
        }
    }
}

///
/// MalformedFilterError
/// Structural defects in the wire filter spec, before any resolution.
///

#[derive(Debug, ThisError)]
pub enum MalformedFilterError {
    #[error("filter node must be a JSON object")]
    NotAnObject,

    #[error("filter node contains both \"and\" and \"or\"")]
    ConflictingJunctions,

    #[error("junction value must be a non-empty array of filter nodes")]
    EmptyJunction,

    #[error("leaf filter is missing required key \"name\"")]
    MissingFieldName,

    #[error("leaf filter is missing required key \"op\"")]
    MissingOperator,

    #[error("filter nesting exceeds the configured depth limit of {limit}")]
    DepthExceeded { limit: usize },
}

///
/// QueryOptions
/// Compiler knobs; defaults match production behavior.
///

#[derive(Clone, Copy, Debug)]
pub struct QueryOptions {
    /// Maximum filter-tree nesting depth accepted from clients.
    ///
    /// Junctions and `has`/`any` sub-filters both count toward the
    /// bound, so adversarial nesting fails fast instead of recursing.
    pub max_filter_depth: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            max_filter_depth: 32,
        }
    }
}
