use crate::model::{
    entity::EntityModel,
    field::{FieldKind, FieldModel},
};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// SchemaError
/// Registration-time schema contract violations.
///

#[derive(Debug, ThisError)]
pub enum SchemaError {
    #[error("entity '{entity}' is already registered")]
    DuplicateEntity { entity: String },

    #[error("entity '{entity}' declares duplicate field '{field}'")]
    DuplicateField { entity: String, field: String },

    #[error("entity '{entity}' primary key '{field}' is not a declared column")]
    InvalidPrimaryKey { entity: String, field: String },

    #[error("entity '{entity}' relation '{relation}' targets unregistered entity '{target}'")]
    DanglingRelation {
        entity: String,
        relation: String,
        target: String,
    },

    #[error("entity '{entity}' proxy '{field}' goes via '{via}', which is not a relation")]
    InvalidProxy {
        entity: String,
        field: String,
        via: String,
    },
}

///
/// SchemaRegistry
///
/// The schema-reflection surface the compiler depends on: a read-only
/// mapping from entity name to its registered model, built once at
/// startup. No mutation happens after `validate`.
///

#[derive(Default)]
pub struct SchemaRegistry {
    entities: BTreeMap<&'static str, &'static EntityModel>,
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one entity model. Registration order is free; referential
    /// integrity is checked by `validate` once every entity is in.
    pub fn register(&mut self, model: &'static EntityModel) -> Result<(), SchemaError> {
        if self.entities.contains_key(model.entity_name) {
            return Err(SchemaError::DuplicateEntity {
                entity: model.entity_name.to_string(),
            });
        }
        self.entities.insert(model.entity_name, model);

        Ok(())
    }

    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&'static EntityModel> {
        self.entities.get(name).copied()
    }

    /// Resolve the entity a relation or proxy field leads to.
    ///
    /// For proxies this is the proxy target: the remote attribute's
    /// relation target when the remote attribute is itself a relation,
    /// otherwise the via-entity.
    #[must_use]
    pub fn related_entity(
        &self,
        model: &EntityModel,
        relation: &str,
    ) -> Option<&'static EntityModel> {
        match &model.field(relation)?.kind {
            FieldKind::Column(_) => None,
            FieldKind::Relation(rel) => self.entity(rel.target),
            FieldKind::Proxy(proxy) => {
                let via = self.relation_target(model, proxy.via)?;
                match &via.field(proxy.remote)?.kind {
                    FieldKind::Relation(remote) => self.entity(remote.target),
                    FieldKind::Column(_) | FieldKind::Proxy(_) => Some(via),
                }
            }
        }
    }

    /// Resolve a plain relation field to its target entity.
    #[must_use]
    pub fn relation_target(
        &self,
        model: &EntityModel,
        relation: &str,
    ) -> Option<&'static EntityModel> {
        let rel = model.field(relation)?.as_relation()?;

        self.entity(rel.target)
    }

    /// Check referential integrity across every registered entity.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for model in self.entities.values() {
            self.validate_entity(model)?;
        }

        Ok(())
    }

    fn validate_entity(&self, model: &EntityModel) -> Result<(), SchemaError> {
        let mut seen: Vec<&str> = Vec::new();
        for field in model.fields {
            if seen.contains(&field.name) {
                return Err(SchemaError::DuplicateField {
                    entity: model.entity_name.to_string(),
                    field: field.name.to_string(),
                });
            }
            seen.push(field.name);
            self.validate_field(model, field)?;
        }

        for pk in model.primary_keys {
            let is_column = model
                .field(pk)
                .is_some_and(|field| field.column_type().is_some());
            if !is_column {
                return Err(SchemaError::InvalidPrimaryKey {
                    entity: model.entity_name.to_string(),
                    field: (*pk).to_string(),
                });
            }
        }

        Ok(())
    }

    fn validate_field(&self, model: &EntityModel, field: &FieldModel) -> Result<(), SchemaError> {
        match &field.kind {
            FieldKind::Column(_) => Ok(()),
            FieldKind::Relation(rel) => {
                if self.entity(rel.target).is_none() {
                    return Err(SchemaError::DanglingRelation {
                        entity: model.entity_name.to_string(),
                        relation: field.name.to_string(),
                        target: rel.target.to_string(),
                    });
                }

                Ok(())
            }
            FieldKind::Proxy(proxy) => {
                if self.relation_target(model, proxy.via).is_none() {
                    return Err(SchemaError::InvalidProxy {
                        entity: model.entity_name.to_string(),
                        field: field.name.to_string(),
                        via: proxy.via.to_string(),
                    });
                }

                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SchemaRegistry;
    use crate::test_fixtures;

    #[test]
    fn fixture_schema_validates() {
        let registry = test_fixtures::registry();

        assert!(registry.validate().is_ok());
    }

    #[test]
    fn related_entity_follows_proxies_to_their_target() {
        let registry = test_fixtures::registry();
        let article = registry.entity("article").unwrap();

        let target = registry.related_entity(article, "tags").unwrap();
        assert_eq!(target.entity_name, "tag");
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = SchemaRegistry::new();
        registry.register(&test_fixtures::PERSON).unwrap();

        assert!(registry.register(&test_fixtures::PERSON).is_err());
    }
}
