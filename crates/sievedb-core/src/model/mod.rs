//! Runtime schema metadata.
//!
//! These are the *runtime representations* of the integrator's declared
//! schema: entities, fields, relations, and the registry the compiler
//! resolves paths against. Registration happens once at startup; every
//! type here is read-only afterwards.

pub mod entity;
pub mod field;
pub mod registry;

pub use entity::EntityModel;
pub use field::{ColumnType, FieldKind, FieldModel, ProxyModel, RelationCardinality, RelationModel};
pub use registry::{SchemaError, SchemaRegistry};
