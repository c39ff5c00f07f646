use crate::value::Value;
use std::ops::{BitAnd, BitOr};

///
/// Predicate AST
///
/// The compiled form of a filter tree: field names are resolved against
/// one entity, operators are concrete, and relationship traversal is
/// explicit. This layer carries no wire syntax and no schema lookups;
/// it is what the execution boundary consumes.
///

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

///
/// ComparePredicate
///

#[derive(Clone, Debug, PartialEq)]
pub struct ComparePredicate {
    pub field: String,
    pub op: CompareOp,
    pub value: Value,
}

///
/// Quantifier
///
/// How a related predicate binds: `Has` requires the (single) related
/// entity to satisfy it, `Any` requires at least one of a collection.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Quantifier {
    Has,
    Any,
}

///
/// Predicate
///

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    And(Vec<Self>),
    Or(Vec<Self>),
    Compare(ComparePredicate),
    CompareFields {
        field: String,
        op: CompareOp,
        other: String,
    },
    IsNull {
        field: String,
    },
    IsNotNull {
        field: String,
    },
    Match {
        field: String,
        pattern: String,
        case_insensitive: bool,
    },
    In {
        field: String,
        values: Vec<Value>,
        negated: bool,
    },
    Related {
        relation: String,
        quantifier: Quantifier,
        predicate: Box<Self>,
    },
}

impl Predicate {
    #[must_use]
    pub fn compare(field: impl Into<String>, op: CompareOp, value: Value) -> Self {
        Self::Compare(ComparePredicate {
            field: field.into(),
            op,
            value,
        })
    }

    #[must_use]
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    #[must_use]
    pub fn ne(field: impl Into<String>, value: Value) -> Self {
        Self::compare(field, CompareOp::Ne, value)
    }

    #[must_use]
    pub fn lt(field: impl Into<String>, value: Value) -> Self {
        Self::compare(field, CompareOp::Lt, value)
    }

    #[must_use]
    pub fn lte(field: impl Into<String>, value: Value) -> Self {
        Self::compare(field, CompareOp::Lte, value)
    }

    #[must_use]
    pub fn gt(field: impl Into<String>, value: Value) -> Self {
        Self::compare(field, CompareOp::Gt, value)
    }

    #[must_use]
    pub fn gte(field: impl Into<String>, value: Value) -> Self {
        Self::compare(field, CompareOp::Gte, value)
    }

    #[must_use]
    pub fn related(
        relation: impl Into<String>,
        quantifier: Quantifier,
        predicate: Self,
    ) -> Self {
        Self::Related {
            relation: relation.into(),
            quantifier,
            predicate: Box::new(predicate),
        }
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}
