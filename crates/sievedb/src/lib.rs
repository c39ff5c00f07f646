//! SieveDB — a schema-first search compiler.
//!
//! ## Crate layout
//! - `core`: schema metadata, filter parsing, query compilation, and
//!   the execution boundary.
//!
//! The `prelude` module mirrors the surface used by integrating
//! request handlers: declare entity models, register them once, then
//! compile and run searches against a datasource.

pub use sievedb_core as core;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use sievedb_core::Error;

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        db::{
            Datasource as _, MemoryDatasource, Response, Row, SearchExecutor, SearchParams,
            SearchResult,
        },
        model::{
            ColumnType, EntityModel, FieldKind, FieldModel, ProxyModel, RelationCardinality,
            RelationModel, SchemaRegistry,
        },
        query::{ComposedQuery, FilterNode, Predicate, QueryBuilder, QueryOptions},
        value::Value,
    };
}
