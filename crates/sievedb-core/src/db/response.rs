use crate::value::Value;
use derive_more::{Deref, IntoIterator};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// ResponseError
/// Cardinality failures when interpreting a materialized response.
///

#[derive(Debug, ThisError)]
pub enum ResponseError {
    #[error("expected exactly one row, found 0 (entity {entity})")]
    NotFound { entity: &'static str },

    #[error("expected exactly one row, found {count} (entity {entity})")]
    NotUnique { entity: &'static str, count: u32 },
}

///
/// Row
/// One materialized result row, keyed by field name.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    values: BTreeMap<String, Value>,
}

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.values.insert(field.into(), value);
        self
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Field value with missing fields flattened to `Null`.
    #[must_use]
    pub fn value_or_null(&self, field: &str) -> Value {
        self.values.get(field).cloned().unwrap_or(Value::Null)
    }
}

///
/// Response
/// Materialized query result: ordered rows for one entity.
///

#[derive(Debug, Deref, IntoIterator)]
pub struct Response {
    entity: &'static str,
    #[deref]
    #[into_iterator(owned)]
    rows: Vec<Row>,
}

impl Response {
    #[must_use]
    pub const fn new(entity: &'static str, rows: Vec<Row>) -> Self {
        Self { entity, rows }
    }

    #[must_use]
    pub const fn entity(&self) -> &'static str {
        self.entity
    }

    /// Number of rows in the response, truncated to `u32`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn count(&self) -> u32 {
        self.rows.len() as u32
    }

    /// Require exactly one row.
    pub fn one(self) -> Result<Row, ResponseError> {
        let count = self.count();

        match count {
            0 => Err(ResponseError::NotFound {
                entity: self.entity,
            }),
            1 => Ok(self.rows.into_iter().next().expect("count checked above")),
            _ => Err(ResponseError::NotUnique {
                entity: self.entity,
                count,
            }),
        }
    }

    /// Require at most one row.
    pub fn one_opt(self) -> Result<Option<Row>, ResponseError> {
        match self.count() {
            0 => Ok(None),
            1 => Ok(self.rows.into_iter().next()),
            count => Err(ResponseError::NotUnique {
                entity: self.entity,
                count,
            }),
        }
    }
}
