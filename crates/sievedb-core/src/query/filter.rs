use crate::{
    model::EntityModel,
    query::{MalformedFilterError, QueryError, QueryOptions, coerce},
    value::Value,
};

///
/// Filter
///
/// One leaf comparison as submitted by the client: a field path, a raw
/// operator name, and either a coerced argument or another field path
/// to compare against. Immutable once parsed.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    /// Field path; may be relation-qualified (`relation__field`).
    pub field: String,
    /// Raw operator name, resolved against the registry at compile time.
    pub op: String,
    pub argument: Option<Argument>,
    /// Alternate right-hand side: a field on the same entity.
    pub other_field: Option<String>,
}

///
/// Argument
///
/// The right-hand side of a leaf comparison. Nested JSON objects are
/// kept raw: they are `has`/`any` sub-filters and can only be parsed
/// once compilation knows the related entity.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Argument {
    Value(Value),
    List(Vec<Value>),
    Nested(serde_json::Value),
}

///
/// FilterNode
///
/// The filter tree: a leaf comparison or an AND/OR junction over child
/// trees. Junctions submitted by clients are never empty.
///

#[derive(Clone, Debug, PartialEq)]
pub enum FilterNode {
    Leaf(Filter),
    And(Vec<Self>),
    Or(Vec<Self>),
}

impl FilterNode {
    /// Parse one wire filter object into a tree, coercing leaf values
    /// against `entity`'s declared types.
    pub fn parse(
        entity: &EntityModel,
        spec: &serde_json::Value,
        options: &QueryOptions,
    ) -> Result<Self, QueryError> {
        Self::parse_at_depth(entity, spec, options, 0)
    }

    fn parse_at_depth(
        entity: &EntityModel,
        spec: &serde_json::Value,
        options: &QueryOptions,
        depth: usize,
    ) -> Result<Self, QueryError> {
        if depth >= options.max_filter_depth {
            return Err(MalformedFilterError::DepthExceeded {
                limit: options.max_filter_depth,
            }
            .into());
        }

        let Some(object) = spec.as_object() else {
            return Err(MalformedFilterError::NotAnObject.into());
        };

        let disjunction = object.get("or");
        let conjunction = object.get("and");
        if disjunction.is_some() && conjunction.is_some() {
            return Err(MalformedFilterError::ConflictingJunctions.into());
        }

        if let Some(children) = disjunction {
            let children = Self::parse_children(entity, children, options, depth)?;
            return Ok(Self::Or(children));
        }
        if let Some(children) = conjunction {
            let children = Self::parse_children(entity, children, options, depth)?;
            return Ok(Self::And(children));
        }

        Self::parse_leaf(entity, object).map(Self::Leaf)
    }

    fn parse_children(
        entity: &EntityModel,
        children: &serde_json::Value,
        options: &QueryOptions,
        depth: usize,
    ) -> Result<Vec<Self>, QueryError> {
        let items = children
            .as_array()
            .filter(|items| !items.is_empty())
            .ok_or(MalformedFilterError::EmptyJunction)?;

        items
            .iter()
            .map(|item| Self::parse_at_depth(entity, item, options, depth + 1))
            .collect()
    }

    fn parse_leaf(
        entity: &EntityModel,
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Filter, QueryError> {
        let field = object
            .get("name")
            .and_then(serde_json::Value::as_str)
            .ok_or(MalformedFilterError::MissingFieldName)?
            .to_string();
        let op = object
            .get("op")
            .and_then(serde_json::Value::as_str)
            .ok_or(MalformedFilterError::MissingOperator)?
            .to_string();
        let other_field = object
            .get("field")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);

        let argument = match object.get("val") {
            Some(raw) => coerce::coerce_argument(entity, &field, raw)?,
            None => None,
        };

        Ok(Filter {
            field,
            op,
            argument,
            other_field,
        })
    }

    /// Re-serialize the tree's structural shape for diagnostics and
    /// round-trip checks. Coerced values render in canonical form.
    #[must_use]
    pub fn shape(&self) -> serde_json::Value {
        match self {
            Self::Leaf(filter) => {
                let mut object = serde_json::Map::new();
                object.insert("name".to_string(), filter.field.clone().into());
                object.insert("op".to_string(), filter.op.clone().into());
                match &filter.argument {
                    Some(Argument::Value(value)) => {
                        object.insert("val".to_string(), value.to_json());
                    }
                    Some(Argument::List(values)) => {
                        object.insert(
                            "val".to_string(),
                            serde_json::Value::Array(
                                values.iter().map(Value::to_json).collect(),
                            ),
                        );
                    }
                    Some(Argument::Nested(raw)) => {
                        object.insert("val".to_string(), raw.clone());
                    }
                    None => {}
                }
                if let Some(other) = &filter.other_field {
                    object.insert("field".to_string(), other.clone().into());
                }
                serde_json::Value::Object(object)
            }
            Self::And(children) => serde_json::json!({
                "and": children.iter().map(Self::shape).collect::<Vec<_>>(),
            }),
            Self::Or(children) => serde_json::json!({
                "or": children.iter().map(Self::shape).collect::<Vec<_>>(),
            }),
        }
    }
}
