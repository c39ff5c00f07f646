use crate::model::field::FieldModel;

///
/// EntityModel
/// Minimal runtime model for one entity, registered once at startup.
///

#[derive(Debug)]
pub struct EntityModel {
    /// Stable external name used in filter paths and diagnostics.
    pub entity_name: &'static str,
    /// Ordered field list (authoritative for resolution).
    pub fields: &'static [FieldModel],
    /// Primary key field names in declaration order.
    ///
    /// Declaration order drives the default sort, so it must be stable.
    pub primary_keys: &'static [&'static str],
}

impl EntityModel {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldModel> {
        self.fields.iter().find(|field| field.name == name)
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}
