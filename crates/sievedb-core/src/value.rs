use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use std::{cmp::Ordering, mem::discriminant};

///
/// Value
///
/// Runtime scalar (or list-of-scalar) value flowing through filter
/// compilation and row evaluation. Variants cover the declared column
/// types this engine can compare; anything else is `Unsupported` and
/// never matches.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Duration(TimeDelta),
    Float(f64),
    Int(i64),
    List(Vec<Self>),
    Text(String),
    Time(NaiveTime),
    Unsupported,
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert a JSON value into a runtime value.
    ///
    /// Objects have no scalar meaning here and map to `Unsupported`;
    /// nested sub-filter objects are kept as raw JSON upstream and never
    /// reach this conversion.
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n.as_i64().map_or_else(
                || n.as_f64().map_or(Self::Unsupported, Self::Float),
                Self::Int,
            ),
            serde_json::Value::String(s) => Self::Text(s.clone()),
            serde_json::Value::Array(items) => {
                Self::List(items.iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(_) => Self::Unsupported,
        }
    }

    /// Render the value back into JSON for structural round-trips.
    ///
    /// Temporal values use their canonical textual forms; durations
    /// render as whole seconds.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null | Self::Unsupported => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => {
                serde_json::Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string())
            }
            Self::Duration(d) => serde_json::Value::Number(d.num_seconds().into()),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Int(i) => serde_json::Value::Number((*i).into()),
            Self::List(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Time(t) => serde_json::Value::String(t.format("%H:%M:%S").to_string()),
        }
    }

    /// Semantic comparison used by predicate evaluation.
    ///
    /// Identical variants compare strictly; integers widen against
    /// floats. Returns `None` when the comparison is undefined, which
    /// evaluators must treat as "does not match".
    #[must_use]
    pub fn cmp_coerced(&self, other: &Self) -> Option<Ordering> {
        if same_variant(self, other) {
            return strict_ordering(self, other);
        }

        match (self, other) {
            (Self::Int(a), Self::Float(b)) => numeric_cmp(*a as f64, *b),
            (Self::Float(a), Self::Int(b)) => numeric_cmp(*a, *b as f64),
            _ => None,
        }
    }

    /// Semantic equality; `None` when undefined (null or mixed variants).
    #[must_use]
    pub fn eq_coerced(&self, other: &Self) -> Option<bool> {
        self.cmp_coerced(other).map(|ord| ord == Ordering::Equal)
    }

    /// Canonical total ordering for sort keys.
    ///
    /// Strict or widened ordering where defined, then a fixed variant
    /// rank so mixed-variant keys still sort deterministically.
    #[must_use]
    pub fn canonical_cmp(left: &Self, right: &Self) -> Ordering {
        if let Some(ordering) = left.cmp_coerced(right) {
            return ordering;
        }

        canonical_rank(left).cmp(&canonical_rank(right))
    }
}

const fn canonical_rank(value: &Value) -> u8 {
    match value {
        Value::Bool(_) => 0,
        Value::Date(_) => 1,
        Value::DateTime(_) => 2,
        Value::Duration(_) => 3,
        Value::Float(_) => 4,
        Value::Int(_) => 5,
        Value::List(_) => 6,
        Value::Null => 7,
        Value::Text(_) => 8,
        Value::Time(_) => 9,
        Value::Unsupported => 10,
    }
}

fn numeric_cmp(left: f64, right: f64) -> Option<Ordering> {
    left.partial_cmp(&right)
}

fn same_variant(left: &Value, right: &Value) -> bool {
    discriminant(left) == discriminant(right)
}

/// Strict ordering for identical value variants.
///
/// Returns `None` for variants that do not support ordering (null,
/// unsupported) so evaluation can treat those comparisons as undefined.
fn strict_ordering(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        (Value::Duration(a), Value::Duration(b)) => Some(a.cmp(b)),
        (Value::Float(a), Value::Float(b)) => Some(a.total_cmp(b)),
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::List(a), Value::List(b)) => Some(list_ordering(a, b)),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn list_ordering(left: &[Value], right: &[Value]) -> Ordering {
    for (a, b) in left.iter().zip(right.iter()) {
        let ord = Value::canonical_cmp(a, b);
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len())
}
