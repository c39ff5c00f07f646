use crate::{
    model::{EntityModel, FieldKind, RelationCardinality, SchemaRegistry},
    query::QueryError,
};

///
/// ResolvedField
///
/// The concrete target a field name refers to on a given entity: a
/// plain column, a relation, or an association proxy flattened into its
/// hops. Recomputed per compile; never stored.
///

#[derive(Debug)]
pub(crate) enum ResolvedField {
    Column {
        name: &'static str,
    },
    Relation {
        name: &'static str,
        target: &'static EntityModel,
        cardinality: RelationCardinality,
    },
    Proxy {
        /// Relation on the owning entity leading to the indirection entity.
        via: &'static str,
        via_cardinality: RelationCardinality,
        via_target: &'static EntityModel,
        /// Attribute on the indirection entity the proxy forwards to.
        remote: RemoteAttr,
    },
}

///
/// RemoteAttr
/// Where an association proxy lands on its indirection entity.
///

#[derive(Debug)]
pub(crate) enum RemoteAttr {
    Column,
    Relation {
        name: &'static str,
        target: &'static EntityModel,
        cardinality: RelationCardinality,
    },
}

impl ResolvedField {
    /// The entity a `has`/`any` sub-filter on this field is parsed against.
    pub(crate) const fn sub_filter_entity(&self) -> Option<&'static EntityModel> {
        match self {
            Self::Column { .. } => None,
            Self::Relation { target, .. } => Some(*target),
            Self::Proxy {
                via_target, remote, ..
            } => match remote {
                RemoteAttr::Column => Some(*via_target),
                RemoteAttr::Relation { target, .. } => Some(*target),
            },
        }
    }
}

/// Resolve `field` on `entity`, flattening association proxies.
pub(crate) fn resolve_field(
    schema: &SchemaRegistry,
    entity: &EntityModel,
    field: &str,
) -> Result<ResolvedField, QueryError> {
    let model = entity
        .field(field)
        .ok_or_else(|| QueryError::unknown_field(entity.entity_name, field))?;

    let resolved = match &model.kind {
        FieldKind::Column(_) => ResolvedField::Column { name: model.name },
        FieldKind::Relation(rel) => {
            let target = schema
                .entity(rel.target)
                .ok_or_else(|| QueryError::unknown_field(entity.entity_name, field))?;
            ResolvedField::Relation {
                name: model.name,
                target,
                cardinality: rel.cardinality,
            }
        }
        FieldKind::Proxy(proxy) => {
            let via_field = entity
                .field(proxy.via)
                .ok_or_else(|| QueryError::unknown_field(entity.entity_name, proxy.via))?;
            let via_model = via_field
                .as_relation()
                .ok_or_else(|| QueryError::unknown_field(entity.entity_name, proxy.via))?;
            let via_target = schema
                .entity(via_model.target)
                .ok_or_else(|| QueryError::unknown_field(entity.entity_name, proxy.via))?;

            let remote = match &via_target
                .field(proxy.remote)
                .ok_or_else(|| QueryError::unknown_field(via_target.entity_name, proxy.remote))?
                .kind
            {
                FieldKind::Column(_) => RemoteAttr::Column,
                FieldKind::Relation(remote_rel) => {
                    let target = schema.entity(remote_rel.target).ok_or_else(|| {
                        QueryError::unknown_field(via_target.entity_name, proxy.remote)
                    })?;
                    RemoteAttr::Relation {
                        name: proxy.remote,
                        target,
                        cardinality: remote_rel.cardinality,
                    }
                }
                FieldKind::Proxy(_) => {
                    // Chained proxies have no defined traversal.
                    return Err(QueryError::unknown_field(
                        via_target.entity_name,
                        proxy.remote,
                    ));
                }
            };

            ResolvedField::Proxy {
                via: via_field.name,
                via_cardinality: via_model.cardinality,
                via_target,
                remote,
            }
        }
    };

    Ok(resolved)
}

/// Split a relation-qualified path (`relation__field`) into its parts.
pub(crate) fn split_relation_path(field: &str) -> (Option<&str>, &str) {
    match field.split_once("__") {
        Some((relation, name)) => (Some(relation), name),
        None => (None, field),
    }
}
