use crate::{db::response::Response, model::SchemaRegistry, query::plan::ComposedQuery};
use thiserror::Error as ThisError;

///
/// ExecuteError
/// Failures at the execution boundary: the query itself is well-formed
/// by the time it arrives here, so these are data-layer defects.
///

#[derive(Debug, ThisError)]
pub enum ExecuteError {
    #[error("no table for entity '{entity}'")]
    UnknownEntity { entity: String },

    #[error("relation '{relation}' on entity '{entity}' is not executable")]
    UnknownRelation { entity: String, relation: String },

    #[error("relation '{relation}' on entity '{entity}' links outside its target table")]
    BrokenLink { entity: String, relation: String },
}

///
/// Datasource
///
/// The single I/O boundary of the engine. Given a composed query,
/// materialize the matching rows in query order. Implementations own
/// retries, timeouts, and transactions; the core never re-enters.
///

pub trait Datasource {
    fn execute(
        &self,
        schema: &SchemaRegistry,
        query: &ComposedQuery,
    ) -> Result<Response, ExecuteError>;
}
