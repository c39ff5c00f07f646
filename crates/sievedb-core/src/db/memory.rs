use crate::{
    db::{
        datasource::{Datasource, ExecuteError},
        response::{Response, Row},
    },
    model::{EntityModel, SchemaRegistry},
    query::{
        plan::{ComposedQuery, OrderDirection, SortTarget},
        predicate::{CompareOp, Predicate, Quantifier},
    },
    value::Value,
};
use std::{cmp::Ordering, collections::BTreeMap};

///
/// MemoryDatasource
///
/// Reference execution backend: tables of rows with explicit relation
/// links, evaluated entirely in memory. Semantics mirror the relational
/// reading of a composed query: predicate filter, then inner joins for
/// order/group keys, then canonical value ordering and grouping.
///

#[derive(Debug, Default)]
pub struct MemoryDatasource {
    tables: BTreeMap<String, Vec<StoredRow>>,
}

#[derive(Clone, Debug, Default)]
struct StoredRow {
    values: BTreeMap<String, Value>,
    /// Relation name to row indexes in the target entity's table.
    links: BTreeMap<String, Vec<usize>>,
}

impl MemoryDatasource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row and return its index, used as a link target.
    pub fn insert(
        &mut self,
        entity: &str,
        values: impl IntoIterator<Item = (&'static str, Value)>,
    ) -> usize {
        let table = self.tables.entry(entity.to_string()).or_default();
        table.push(StoredRow {
            values: values
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
            links: BTreeMap::new(),
        });

        table.len() - 1
    }

    /// Link `row` to `target_row` through `relation`. Links are
    /// one-directional; set up both sides where the schema has both.
    pub fn link(&mut self, entity: &str, row: usize, relation: &str, target_row: usize) {
        if let Some(stored) = self
            .tables
            .get_mut(entity)
            .and_then(|table| table.get_mut(row))
        {
            stored
                .links
                .entry(relation.to_string())
                .or_default()
                .push(target_row);
        }
    }

    fn table(&self, entity: &str) -> &[StoredRow] {
        self.tables.get(entity).map_or(&[], Vec::as_slice)
    }

    fn eval(
        &self,
        schema: &SchemaRegistry,
        model: &'static EntityModel,
        row: &StoredRow,
        predicate: &Predicate,
    ) -> Result<bool, ExecuteError> {
        let matched = match predicate {
            Predicate::And(children) => {
                for child in children {
                    if !self.eval(schema, model, row, child)? {
                        return Ok(false);
                    }
                }
                true
            }
            Predicate::Or(children) => {
                for child in children {
                    if self.eval(schema, model, row, child)? {
                        return Ok(true);
                    }
                }
                false
            }
            Predicate::Compare(compare) => {
                let value = row.values.get(&compare.field);
                value.is_some_and(|value| compare_matches(value, compare.op, &compare.value))
            }
            Predicate::CompareFields { field, op, other } => {
                match (row.values.get(field), row.values.get(other)) {
                    (Some(left), Some(right)) => compare_matches(left, *op, right),
                    _ => false,
                }
            }
            Predicate::IsNull { field } => field_is_null(row, field),
            Predicate::IsNotNull { field } => !field_is_null(row, field),
            Predicate::Match {
                field,
                pattern,
                case_insensitive,
            } => match row.values.get(field) {
                Some(Value::Text(text)) => like_match(pattern, text, *case_insensitive),
                _ => false,
            },
            Predicate::In {
                field,
                values,
                negated,
            } => {
                let Some(value) = row.values.get(field) else {
                    return Ok(false);
                };
                if value.is_null() {
                    return Ok(false);
                }
                let contained = values
                    .iter()
                    .any(|candidate| value.eq_coerced(candidate) == Some(true));
                if *negated { !contained } else { contained }
            }
            Predicate::Related {
                relation,
                quantifier: Quantifier::Has | Quantifier::Any,
                predicate,
            } => {
                let target = schema.relation_target(model, relation).ok_or_else(|| {
                    ExecuteError::UnknownRelation {
                        entity: model.entity_name.to_string(),
                        relation: relation.clone(),
                    }
                })?;
                let target_table = self.table(target.entity_name);

                // Both quantifiers require at least one satisfying
                // related row; `Has` simply never sees more than one.
                let mut any = false;
                for index in row.links.get(relation).into_iter().flatten() {
                    let linked =
                        target_table
                            .get(*index)
                            .ok_or_else(|| ExecuteError::BrokenLink {
                                entity: model.entity_name.to_string(),
                                relation: relation.clone(),
                            })?;
                    if self.eval(schema, target, linked, predicate)? {
                        any = true;
                        break;
                    }
                }
                any
            }
        };

        Ok(matched)
    }

    fn sort_key(
        &self,
        schema: &SchemaRegistry,
        model: &'static EntityModel,
        row: &StoredRow,
        target: &SortTarget,
    ) -> Value {
        match target {
            SortTarget::Field(field) => row.values.get(field).cloned().unwrap_or(Value::Null),
            SortTarget::Related { relation, field } => {
                self.related_value(schema, model, row, relation, field)
            }
        }
    }

    // Joined sort keys read the first linked row, matching the to-one
    // join the compiler resolved the path against.
    fn related_value(
        &self,
        schema: &SchemaRegistry,
        model: &'static EntityModel,
        row: &StoredRow,
        relation: &str,
        field: &str,
    ) -> Value {
        let Some(&index) = row.links.get(relation).and_then(|links| links.first()) else {
            return Value::Null;
        };
        let Some(target) = schema.relation_target(model, relation) else {
            return Value::Null;
        };

        self.table(target.entity_name)
            .get(index)
            .and_then(|linked| linked.values.get(field))
            .cloned()
            .unwrap_or(Value::Null)
    }
}

impl Datasource for MemoryDatasource {
    fn execute(
        &self,
        schema: &SchemaRegistry,
        query: &ComposedQuery,
    ) -> Result<Response, ExecuteError> {
        let model = schema
            .entity(query.entity)
            .ok_or_else(|| ExecuteError::UnknownEntity {
                entity: query.entity.to_string(),
            })?;
        let table = self.table(model.entity_name);

        // 1. Filter.
        let mut selected: Vec<&StoredRow> = Vec::new();
        for row in table {
            let keep = match &query.predicate {
                Some(predicate) => self.eval(schema, model, row, predicate)?,
                None => true,
            };
            if keep {
                selected.push(row);
            }
        }

        // 2. Join: inner semantics, rows without a related row drop out.
        if !query.joins.is_empty() {
            selected.retain(|row| {
                query.joins.iter().all(|relation| {
                    row.links
                        .get(relation)
                        .is_some_and(|links| !links.is_empty())
                })
            });
        }

        // 3. Order.
        if !query.order.is_empty() {
            let mut keyed: Vec<(Vec<Value>, &StoredRow)> = selected
                .into_iter()
                .map(|row| {
                    let keys = query
                        .order
                        .iter()
                        .map(|key| self.sort_key(schema, model, row, &key.target))
                        .collect();
                    (keys, row)
                })
                .collect();
            keyed.sort_by(|(a, _), (b, _)| {
                for (key, (left, right)) in query.order.iter().zip(a.iter().zip(b.iter())) {
                    let ord = Value::canonical_cmp(left, right);
                    let ord = match key.direction {
                        OrderDirection::Asc => ord,
                        OrderDirection::Desc => ord.reverse(),
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
            selected = keyed.into_iter().map(|(_, row)| row).collect();
        }

        // 4. Group: one representative row per distinct key, in order.
        if !query.group.is_empty() {
            let mut seen: Vec<Vec<Value>> = Vec::new();
            selected.retain(|row| {
                let keys: Vec<Value> = query
                    .group
                    .iter()
                    .map(|key| self.sort_key(schema, model, row, &key.target))
                    .collect();
                if seen.iter().any(|existing| {
                    existing.len() == keys.len()
                        && existing
                            .iter()
                            .zip(keys.iter())
                            .all(|(a, b)| Value::canonical_cmp(a, b) == Ordering::Equal)
                }) {
                    false
                } else {
                    seen.push(keys);
                    true
                }
            });
        }

        let rows = selected
            .into_iter()
            .map(|stored| {
                let mut row = Row::new();
                for (name, value) in &stored.values {
                    row = row.with(name.clone(), value.clone());
                }
                row
            })
            .collect();

        Ok(Response::new(model.entity_name, rows))
    }
}

/// SQL LIKE over `%` (any run) and `_` (any single character).
fn like_match(pattern: &str, text: &str, case_insensitive: bool) -> bool {
    if case_insensitive {
        let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
        let text: Vec<char> = text.to_lowercase().chars().collect();
        return like(&pattern, &text);
    }

    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    like(&pattern, &text)
}

fn like(pattern: &[char], text: &[char]) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some('%') => {
            like(&pattern[1..], text) || (!text.is_empty() && like(pattern, &text[1..]))
        }
        Some('_') => !text.is_empty() && like(&pattern[1..], &text[1..]),
        Some(ch) => text.first() == Some(ch) && like(&pattern[1..], &text[1..]),
    }
}

fn compare_matches(left: &Value, op: CompareOp, right: &Value) -> bool {
    let Some(ordering) = left.cmp_coerced(right) else {
        // Undefined comparisons (nulls, mixed variants) never match.
        return false;
    };

    match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Lte => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Gte => ordering != Ordering::Less,
    }
}

// Null for columns with no value; for relation links, an empty link set.
fn field_is_null(row: &StoredRow, field: &str) -> bool {
    if let Some(links) = row.links.get(field) {
        return links.is_empty();
    }

    row.values.get(field).is_none_or(Value::is_null)
}
