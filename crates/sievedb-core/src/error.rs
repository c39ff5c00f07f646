use crate::{
    db::{datasource::ExecuteError, response::ResponseError},
    model::registry::SchemaError,
    query::QueryError,
};
use thiserror::Error as ThisError;

///
/// Error
///
/// Top-level error for one search invocation. Every variant wraps a
/// layer-specific error transparently; nothing is retried or recovered
/// inside the engine.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Execute(#[from] ExecuteError),

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
