use crate::{
    model::{EntityModel, RelationCardinality, SchemaRegistry},
    query::{
        MalformedFilterError, QueryError, QueryOptions,
        coerce,
        filter::{Argument, Filter, FilterNode},
        op::{BinaryOp, Operator, RelatedOp, UnaryOp},
        plan::{ComposedQuery, GroupKey, OrderDirection, OrderKey, SortTarget},
        predicate::{CompareOp, Predicate, Quantifier},
        resolve::{RemoteAttr, ResolvedField, resolve_field, split_relation_path},
    },
    value::Value,
};

///
/// QueryBuilder
///
/// Compiles client-supplied search parameters into a `ComposedQuery`.
/// Purely a coordinator: every failure originates in the operator
/// table, the resolver, or value coercion, and propagates unchanged.
///
/// Phase order is fixed: filter, then order, then group. Filtering
/// must narrow the candidate set before order/group joins are added,
/// or unrelated joins multiply rows.
///

pub struct QueryBuilder<'a> {
    schema: &'a SchemaRegistry,
    options: QueryOptions,
}

impl<'a> QueryBuilder<'a> {
    #[must_use]
    pub fn new(schema: &'a SchemaRegistry) -> Self {
        Self {
            schema,
            options: QueryOptions::default(),
        }
    }

    #[must_use]
    pub const fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    /// Build a composed query for `entity_name`.
    ///
    /// `filters` is the wire-level list of filter objects (implicitly
    /// AND-combined), `sort` an ordered list of `(sign, path)` pairs,
    /// `group_by` an ordered list of paths. When `suppress_ordering`
    /// is set no order keys are emitted at all, not even the default
    /// primary-key order.
    pub fn create_query(
        &self,
        entity_name: &str,
        filters: &[serde_json::Value],
        sort: &[(String, String)],
        group_by: &[String],
        suppress_ordering: bool,
    ) -> Result<ComposedQuery, QueryError> {
        let entity = self
            .schema
            .entity(entity_name)
            .ok_or_else(|| QueryError::UnknownEntity {
                entity: entity_name.to_string(),
            })?;

        let mut query = ComposedQuery::new(entity.entity_name);

        // 1. Filter.
        let mut predicates = Vec::with_capacity(filters.len());
        for spec in filters {
            let node = FilterNode::parse(entity, spec, &self.options)?;
            predicates.push(self.compile_node(entity, &node, 0)?);
        }
        query.predicate = match predicates.len() {
            0 => None,
            1 => predicates.pop(),
            _ => Some(Predicate::And(predicates)),
        };

        // 2. Order. Default to ascending primary keys in declaration
        // order so unpaged and paged reads stay deterministic.
        if !suppress_ordering {
            if sort.is_empty() {
                for pk in entity.primary_keys {
                    query.order.push(OrderKey {
                        target: SortTarget::Field((*pk).to_string()),
                        direction: OrderDirection::Asc,
                    });
                }
            } else {
                for (sign, path) in sort {
                    let target = self.resolve_sort_target(entity, path, &mut query)?;
                    query.order.push(OrderKey {
                        target,
                        direction: OrderDirection::from_sign(sign),
                    });
                }
            }
        }

        // 3. Group.
        for path in group_by {
            let target = self.resolve_sort_target(entity, path, &mut query)?;
            query.group.push(GroupKey { target });
        }

        Ok(query)
    }

    // A `.`-separated path names a field on a directly related entity
    // and forces a join against it.
    fn resolve_sort_target(
        &self,
        entity: &'static EntityModel,
        path: &str,
        query: &mut ComposedQuery,
    ) -> Result<SortTarget, QueryError> {
        if let Some((relation, field)) = path.split_once('.') {
            let resolved = resolve_field(self.schema, entity, relation)?;
            let ResolvedField::Relation { name, target, .. } = resolved else {
                return Err(QueryError::unknown_field(entity.entity_name, path));
            };
            if !target.has_field(field) {
                return Err(QueryError::unknown_field(target.entity_name, field));
            }
            query.add_join(name);

            return Ok(SortTarget::Related {
                relation: name.to_string(),
                field: field.to_string(),
            });
        }

        if !entity.has_field(path) {
            return Err(QueryError::unknown_field(entity.entity_name, path));
        }

        Ok(SortTarget::Field(path.to_string()))
    }

    fn compile_node(
        &self,
        entity: &'static EntityModel,
        node: &FilterNode,
        depth: usize,
    ) -> Result<Predicate, QueryError> {
        match node {
            FilterNode::Leaf(filter) => self.compile_leaf(entity, filter, depth),
            FilterNode::And(children) => Ok(Predicate::And(
                children
                    .iter()
                    .map(|child| self.compile_node(entity, child, depth))
                    .collect::<Result<_, _>>()?,
            )),
            FilterNode::Or(children) => Ok(Predicate::Or(
                children
                    .iter()
                    .map(|child| self.compile_node(entity, child, depth))
                    .collect::<Result<_, _>>()?,
            )),
        }
    }

    fn compile_leaf(
        &self,
        entity: &'static EntityModel,
        filter: &Filter,
        depth: usize,
    ) -> Result<Predicate, QueryError> {
        let op = Operator::lookup(&filter.op)?;
        let (prefix, base) = split_relation_path(&filter.field);

        match op {
            Operator::Unary(unary) => self.compile_unary(entity, filter, unary, prefix, base),
            Operator::Binary(binary) => self.compile_binary(entity, filter, binary, prefix, base),
            Operator::Related(related) => {
                self.compile_related(entity, filter, related, prefix, base, depth)
            }
        }
    }

    fn compile_unary(
        &self,
        entity: &'static EntityModel,
        filter: &Filter,
        unary: UnaryOp,
        prefix: Option<&str>,
        base: &str,
    ) -> Result<Predicate, QueryError> {
        if filter.argument.is_some() || filter.other_field.is_some() {
            return Err(QueryError::arity(&filter.op, "no argument"));
        }

        if let Some(relation) = prefix {
            let resolved = resolve_field(self.schema, entity, relation)?;
            let target = related_target(entity, &resolved, &filter.field)?;
            if !target.has_field(base) {
                return Err(QueryError::unknown_field(target.entity_name, base));
            }

            return Ok(wrap_related(&resolved, unary_predicate(unary, base)));
        }

        let resolved = resolve_field(self.schema, entity, base)?;
        let field = match resolved {
            ResolvedField::Column { name, .. } | ResolvedField::Relation { name, .. } => name,
            // A null proxy is an empty via-collection.
            ResolvedField::Proxy { via, .. } => via,
        };

        Ok(unary_predicate(unary, field))
    }

    fn compile_binary(
        &self,
        entity: &'static EntityModel,
        filter: &Filter,
        binary: BinaryOp,
        prefix: Option<&str>,
        base: &str,
    ) -> Result<Predicate, QueryError> {
        // Relation-qualified comparison: quantify over the related
        // entity and compare there.
        if let Some(relation) = prefix {
            let resolved = resolve_field(self.schema, entity, relation)?;
            let target = related_target(entity, &resolved, &filter.field)?;
            let inner =
                self.binary_predicate(target, base, &filter.op, binary, filter.argument.as_ref())?;

            return Ok(wrap_related(&resolved, inner));
        }

        // Field-to-field comparison on the same entity; an `other`
        // field takes precedence over any literal, matching the wire
        // contract's compile path.
        if let Some(other) = &filter.other_field {
            let CompareOpKind::Comparison(op) = compare_kind(binary) else {
                return Err(QueryError::arity(&filter.op, "a literal value"));
            };
            require_column(self.schema, entity, base)?;
            require_column(self.schema, entity, other)?;

            return Ok(Predicate::CompareFields {
                field: base.to_string(),
                op,
                other: other.clone(),
            });
        }

        self.binary_predicate(entity, base, &filter.op, binary, filter.argument.as_ref())
    }

    // One binary comparison with a literal argument, on `entity`.
    // Arguments parsed before the owning entity was known (relation-
    // qualified paths, sub-filters) are re-coerced here.
    fn binary_predicate(
        &self,
        entity: &'static EntityModel,
        field: &str,
        op_name: &str,
        binary: BinaryOp,
        argument: Option<&Argument>,
    ) -> Result<Predicate, QueryError> {
        require_column(self.schema, entity, field)?;

        let Some(argument) = argument else {
            // The null-literal guard applies to the equality family
            // only; is_null / is_not_null are the documented substitute.
            if binary.is_equality() {
                return Err(QueryError::ComparisonToNull {
                    field: field.to_string(),
                });
            }
            let expected = if binary.is_membership() {
                "a sequence argument"
            } else {
                "an argument"
            };

            return Err(QueryError::arity(op_name, expected));
        };

        match argument {
            Argument::Value(value) => {
                let value = coerce::coerce_value(entity, field, value.clone())?;
                let predicate = match compare_kind(binary) {
                    CompareOpKind::Comparison(op) => Predicate::compare(field, op, value),
                    CompareOpKind::Pattern { case_insensitive } => {
                        let Value::Text(pattern) = value else {
                            return Err(QueryError::arity(op_name, "a string pattern"));
                        };
                        Predicate::Match {
                            field: field.to_string(),
                            pattern,
                            case_insensitive,
                        }
                    }
                    CompareOpKind::Membership { .. } => {
                        return Err(QueryError::arity(op_name, "a sequence argument"));
                    }
                };

                Ok(predicate)
            }
            Argument::List(values) => {
                let CompareOpKind::Membership { negated } = compare_kind(binary) else {
                    return Err(QueryError::arity(op_name, "a scalar argument"));
                };
                let values = values
                    .iter()
                    .map(|value| coerce::coerce_value(entity, field, value.clone()))
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(Predicate::In {
                    field: field.to_string(),
                    values,
                    negated,
                })
            }
            Argument::Nested(_) => Err(QueryError::arity(op_name, "a scalar argument")),
        }
    }

    fn compile_related(
        &self,
        entity: &'static EntityModel,
        filter: &Filter,
        related: RelatedOp,
        prefix: Option<&str>,
        base: &str,
        depth: usize,
    ) -> Result<Predicate, QueryError> {
        if filter.other_field.is_some() {
            return Err(QueryError::arity(&filter.op, "a sub-filter argument"));
        }

        let relation = prefix.unwrap_or(base);
        let resolved = resolve_field(self.schema, entity, relation)?;
        check_related_cardinality(&filter.op, related, &resolved)?;
        let target = related_target(entity, &resolved, &filter.field)?;

        let inner = match filter.argument.as_ref() {
            None => return Err(QueryError::arity(&filter.op, "a sub-filter argument")),
            // Sub-filters count toward the nesting bound to keep
            // adversarial `has` chains from recursing unboundedly.
            Some(Argument::Nested(raw)) => {
                if depth >= self.options.max_filter_depth {
                    return Err(MalformedFilterError::DepthExceeded {
                        limit: self.options.max_filter_depth,
                    }
                    .into());
                }
                let node = FilterNode::parse(target, raw, &self.options)?;
                self.compile_node(target, &node, depth + 1)?
            }
            // Legacy form: a bare scalar means equality on the
            // identically-named field of the related entity.
            Some(Argument::Value(value)) => {
                require_column(self.schema, target, base)?;
                let value = coerce::coerce_value(target, base, value.clone())?;
                Predicate::eq(base, value)
            }
            Some(Argument::List(_)) => {
                return Err(QueryError::arity(&filter.op, "a sub-filter argument"));
            }
        };

        Ok(wrap_related(&resolved, inner))
    }
}

///
/// CompareOpKind
/// Shape of a binary operator's right-hand side.
///

enum CompareOpKind {
    Comparison(CompareOp),
    Pattern { case_insensitive: bool },
    Membership { negated: bool },
}

const fn compare_kind(binary: BinaryOp) -> CompareOpKind {
    match binary {
        BinaryOp::Eq => CompareOpKind::Comparison(CompareOp::Eq),
        BinaryOp::Ne => CompareOpKind::Comparison(CompareOp::Ne),
        BinaryOp::Lt => CompareOpKind::Comparison(CompareOp::Lt),
        BinaryOp::Lte => CompareOpKind::Comparison(CompareOp::Lte),
        BinaryOp::Gt => CompareOpKind::Comparison(CompareOp::Gt),
        BinaryOp::Gte => CompareOpKind::Comparison(CompareOp::Gte),
        BinaryOp::Like => CompareOpKind::Pattern {
            case_insensitive: false,
        },
        BinaryOp::Ilike => CompareOpKind::Pattern {
            case_insensitive: true,
        },
        BinaryOp::In => CompareOpKind::Membership { negated: false },
        BinaryOp::NotIn => CompareOpKind::Membership { negated: true },
    }
}

fn unary_predicate(unary: UnaryOp, field: &str) -> Predicate {
    match unary {
        UnaryOp::IsNull => Predicate::IsNull {
            field: field.to_string(),
        },
        UnaryOp::IsNotNull => Predicate::IsNotNull {
            field: field.to_string(),
        },
    }
}

const fn quantifier_for(cardinality: RelationCardinality) -> Quantifier {
    match cardinality {
        RelationCardinality::ToOne => Quantifier::Has,
        RelationCardinality::ToMany => Quantifier::Any,
    }
}

// `has` binds to-one, `any` binds to-many; for proxies the outer hop
// decides.
fn check_related_cardinality(
    op_name: &str,
    related: RelatedOp,
    resolved: &ResolvedField,
) -> Result<(), QueryError> {
    let cardinality = match resolved {
        ResolvedField::Relation { cardinality, .. } => *cardinality,
        ResolvedField::Proxy {
            via_cardinality, ..
        } => *via_cardinality,
        ResolvedField::Column { .. } => {
            return Err(QueryError::arity(op_name, "a relation field"));
        }
    };

    match (related, cardinality) {
        (RelatedOp::Has, RelationCardinality::ToOne)
        | (RelatedOp::Any, RelationCardinality::ToMany) => Ok(()),
        (RelatedOp::Has, RelationCardinality::ToMany) => {
            Err(QueryError::arity(op_name, "a to-one relation field"))
        }
        (RelatedOp::Any, RelationCardinality::ToOne) => {
            Err(QueryError::arity(op_name, "a to-many relation field"))
        }
    }
}

// The entity an inner predicate on this resolved field applies to.
fn related_target(
    entity: &EntityModel,
    resolved: &ResolvedField,
    path: &str,
) -> Result<&'static EntityModel, QueryError> {
    resolved
        .sub_filter_entity()
        .ok_or_else(|| QueryError::unknown_field(entity.entity_name, path))
}

// Wrap an inner predicate in the traversal a resolved field implies:
// one hop for relations, up to two for association proxies.
fn wrap_related(resolved: &ResolvedField, inner: Predicate) -> Predicate {
    match resolved {
        // Callers reject column fields before wrapping.
        ResolvedField::Column { name } => Predicate::related(*name, Quantifier::Has, inner),
        ResolvedField::Relation {
            name, cardinality, ..
        } => Predicate::related(*name, quantifier_for(*cardinality), inner),
        ResolvedField::Proxy {
            via,
            via_cardinality,
            remote,
            ..
        } => {
            let inner = match remote {
                RemoteAttr::Column => inner,
                RemoteAttr::Relation {
                    name, cardinality, ..
                } => Predicate::related(*name, quantifier_for(*cardinality), inner),
            };

            Predicate::related(*via, quantifier_for(*via_cardinality), inner)
        }
    }
}

fn require_column(
    schema: &SchemaRegistry,
    entity: &'static EntityModel,
    field: &str,
) -> Result<(), QueryError> {
    match resolve_field(schema, entity, field)? {
        ResolvedField::Column { .. } => Ok(()),
        _ => Err(QueryError::unknown_field(entity.entity_name, field)),
    }
}
