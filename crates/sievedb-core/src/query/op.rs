use crate::query::QueryError;

///
/// Operator
///
/// Arity-tagged operator resolved from a client-supplied name. The
/// synonym table is part of the wire contract and must not drift:
/// clients match on exact strings.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operator {
    Unary(UnaryOp),
    Binary(BinaryOp),
    Related(RelatedOp),
}

impl Operator {
    /// Resolve an operator name (or any of its synonyms).
    pub fn lookup(name: &str) -> Result<Self, QueryError> {
        let op = match name {
            // Operators which accept no argument.
            "is_null" => Self::Unary(UnaryOp::IsNull),
            "is_not_null" => Self::Unary(UnaryOp::IsNotNull),
            // Operators which accept a single argument.
            "==" | "eq" | "equals" | "equal_to" => Self::Binary(BinaryOp::Eq),
            "!=" | "ne" | "neq" | "not_equal_to" | "does_not_equal" => Self::Binary(BinaryOp::Ne),
            ">" | "gt" => Self::Binary(BinaryOp::Gt),
            "<" | "lt" => Self::Binary(BinaryOp::Lt),
            ">=" | "ge" | "gte" | "geq" => Self::Binary(BinaryOp::Gte),
            "<=" | "le" | "lte" | "leq" => Self::Binary(BinaryOp::Lte),
            "ilike" => Self::Binary(BinaryOp::Ilike),
            "like" => Self::Binary(BinaryOp::Like),
            "in" => Self::Binary(BinaryOp::In),
            "not_in" => Self::Binary(BinaryOp::NotIn),
            // Operators which accept a nested sub-filter.
            "has" => Self::Related(RelatedOp::Has),
            "any" => Self::Related(RelatedOp::Any),
            _ => {
                return Err(QueryError::UnknownOperator {
                    op: name.to_string(),
                });
            }
        };

        Ok(op)
    }

    #[must_use]
    pub const fn arity(self) -> u8 {
        match self {
            Self::Unary(_) => 1,
            Self::Binary(_) => 2,
            Self::Related(_) => 3,
        }
    }
}

///
/// UnaryOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnaryOp {
    IsNull,
    IsNotNull,
}

///
/// BinaryOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    Ilike,
    In,
    NotIn,
}

impl BinaryOp {
    /// Equality family: the operators guarded against null literals.
    #[must_use]
    pub const fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::Ne)
    }

    #[must_use]
    pub const fn is_membership(self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

///
/// RelatedOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RelatedOp {
    Has,
    Any,
}
