use crate::query::predicate::Predicate;
use serde::{Deserialize, Serialize};

///
/// OrderDirection
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    /// Wire form: `"+"` sorts ascending, anything else descending.
    #[must_use]
    pub fn from_sign(sign: &str) -> Self {
        if sign == "+" { Self::Asc } else { Self::Desc }
    }
}

///
/// SortTarget
///
/// What an order or group key points at: a field on the queried entity,
/// or a field on a directly related entity (which requires a join).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SortTarget {
    Field(String),
    Related { relation: String, field: String },
}

///
/// OrderKey
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderKey {
    pub target: SortTarget,
    pub direction: OrderDirection,
}

///
/// GroupKey
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroupKey {
    pub target: SortTarget,
}

///
/// ComposedQuery
///
/// The accumulated, not-yet-executed query: entity, compiled predicate,
/// joins introduced by order/group keys, and the order and group specs
/// in client order. Phase order is fixed at compile time (filter, then
/// order, then group); limit/offset remain the caller's concern.
///

#[derive(Debug)]
pub struct ComposedQuery {
    pub entity: &'static str,
    pub predicate: Option<Predicate>,
    /// Relations that must be joined before ordering/grouping applies.
    /// Join semantics are inner: rows without a related row drop out.
    pub joins: Vec<String>,
    pub order: Vec<OrderKey>,
    pub group: Vec<GroupKey>,
}

impl ComposedQuery {
    pub(crate) fn new(entity: &'static str) -> Self {
        Self {
            entity,
            predicate: None,
            joins: Vec::new(),
            order: Vec::new(),
            group: Vec::new(),
        }
    }

    pub(crate) fn add_join(&mut self, relation: &str) {
        if !self.joins.iter().any(|existing| existing == relation) {
            self.joins.push(relation.to_string());
        }
    }
}
