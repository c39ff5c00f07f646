///
/// FieldModel
/// Runtime field metadata used by resolution, coercion, and compilation.
///

#[derive(Debug)]
pub struct FieldModel {
    /// Field name as used in filter, sort, and group paths.
    pub name: &'static str,
    /// Column, relation, or association-proxy shape.
    pub kind: FieldKind,
}

impl FieldModel {
    #[must_use]
    pub const fn column_type(&self) -> Option<ColumnType> {
        match self.kind {
            FieldKind::Column(ty) => Some(ty),
            FieldKind::Relation(_) | FieldKind::Proxy(_) => None,
        }
    }

    #[must_use]
    pub const fn is_relation(&self) -> bool {
        matches!(self.kind, FieldKind::Relation(_))
    }

    #[must_use]
    pub const fn as_relation(&self) -> Option<&RelationModel> {
        match &self.kind {
            FieldKind::Relation(relation) => Some(relation),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_proxy(&self) -> Option<&ProxyModel> {
        match &self.kind {
            FieldKind::Proxy(proxy) => Some(proxy),
            _ => None,
        }
    }
}

///
/// FieldKind
///
/// The three attribute shapes a filter path may land on: a plain
/// column, a named relation, or a proxy that reaches through an
/// indirection entity.
///

#[derive(Debug)]
pub enum FieldKind {
    Column(ColumnType),
    Relation(RelationModel),
    Proxy(ProxyModel),
}

///
/// ColumnType
///
/// Declared type surface needed by value coercion. Anything the
/// coercer has no rule for is `Other` and passes through untouched.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ColumnType {
    Boolean,
    Date,
    DateTime,
    Duration,
    Float,
    Integer,
    Text,
    Time,
    Other,
}

impl ColumnType {
    #[must_use]
    pub const fn is_temporal(self) -> bool {
        matches!(self, Self::Date | Self::DateTime | Self::Time | Self::Duration)
    }
}

///
/// RelationModel
///

#[derive(Debug)]
pub struct RelationModel {
    /// Entity name of the relation target.
    pub target: &'static str,
    pub cardinality: RelationCardinality,
}

///
/// RelationCardinality
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RelationCardinality {
    ToOne,
    ToMany,
}

///
/// ProxyModel
///
/// Association proxy: an attribute that reads as a scalar or collection
/// but is mediated by an indirection entity. `via` names a relation on
/// the owning entity; `remote` names the attribute on the via-entity
/// the proxy forwards to (which may itself be a relation).
///

#[derive(Debug)]
pub struct ProxyModel {
    pub via: &'static str,
    pub remote: &'static str,
}
