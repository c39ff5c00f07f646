//! Core engine for SieveDB: schema metadata, filter parsing, query
//! compilation, and the execution boundary, with the ergonomics
//! exported via the `prelude`.

// public exports are one module level down
pub mod db;
pub mod error;
pub mod model;
pub mod query;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::Error;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, executors, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{MemoryDatasource, Response, Row, SearchExecutor, SearchParams},
        model::{
            ColumnType, EntityModel, FieldKind, FieldModel, ProxyModel, RelationCardinality,
            RelationModel, SchemaRegistry,
        },
        query::{ComposedQuery, FilterNode, Predicate, QueryBuilder, QueryOptions},
        value::Value,
    };
}
