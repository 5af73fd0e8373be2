//! Dependency analysis: junction synthesis, table ordering, cycle breaking.
//!
//! The analyzer runs after validation and enriches the schema into the form
//! the diff engine and the emitters consume:
//!
//! - every `many_to_many` field is consumed and realized as a junction
//!   table with two NOT NULL cascading foreign keys and a composite unique
//!   index
//! - tables are put into a total order in which every table precedes the
//!   tables that reference it, so `CREATE TABLE` statements can carry their
//!   foreign-key constraints inline
//! - foreign-key cycles are broken; each broken edge becomes a deferred
//!   constraint emitted as a trailing `ALTER TABLE` after all creates
//!
//! The foreign-key graph is held as adjacency on table names. Cycles are
//! detected with an explicit DFS color marking; ties inside an independent
//! set break lexicographically, which keeps the order stable across runs.

use crate::schema::model::{Field, FieldType, Index, OnDelete, Schema, Table};
use std::collections::BTreeMap;

/// A foreign key pulled out of its `CREATE TABLE` to break a cycle.
///
/// Emitted as an `ALTER TABLE ... ADD CONSTRAINT` after every table of the
/// migration exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredConstraint {
    /// Table that owns the foreign-key column.
    pub table: String,
    /// The foreign-key field.
    pub field: String,
    /// The referenced table.
    pub references: String,
    pub on_delete: OnDelete,
}

impl DeferredConstraint {
    /// Deterministic constraint name used in ADD/DROP CONSTRAINT pairs.
    pub fn constraint_name(&self) -> String {
        format!("fk_{}_{}", self.table, self.field)
    }
}

/// The analyzer's output: the enriched schema plus emission metadata.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Schema with junction tables realized and `many_to_many` fields
    /// consumed, in canonical order.
    pub schema: Schema,
    /// Table names in dependency order: referenced tables first.
    pub order: Vec<String>,
    /// Constraints deferred to after all creates, in discovery order.
    pub deferred: Vec<DeferredConstraint>,
}

impl Analysis {
    /// True when the given foreign-key edge was deferred.
    pub fn is_deferred(&self, table: &str, field: &str) -> bool {
        self.deferred.iter().any(|d| d.table == table && d.field == field)
    }
}

/// Analyzes a validated schema.
pub fn analyze(schema: &Schema) -> Analysis {
    let mut enriched = schema.clone();
    synthesize_junctions(&mut enriched);

    let (order, deferred) = sort_tables(&enriched);
    Analysis {
        schema: enriched,
        order,
        deferred,
    }
}

/// Realizes every `many_to_many` field as a junction table.
///
/// The junction carries `{near}_id` and `{far}_id` foreign keys, both NOT
/// NULL and cascading on delete, plus a composite unique index over the
/// pair. An explicit junction name wins over the `{near}_{far}` default; a
/// junction whose name already exists is realized only once.
fn synthesize_junctions(schema: &mut Schema) {
    let mut junctions: Vec<Table> = Vec::new();

    for table in &schema.tables {
        for field in &table.fields {
            let relation = match &field.many_to_many {
                Some(relation) => relation,
                None => continue,
            };

            let name = relation.junction.clone().unwrap_or_else(|| format!("{}_{}", table.name, relation.table));
            if schema.table(&name).is_some() || junctions.iter().any(|j| j.name == name) {
                continue;
            }

            let near_field = format!("{}_id", table.name);
            let far_field = if relation.table == table.name {
                // Self-relation: the two legs need distinct column names.
                format!("related_{}_id", relation.table)
            } else {
                format!("{}_id", relation.table)
            };

            junctions.push(Table {
                name: name.clone(),
                fields: vec![
                    Field::referencing(near_field.clone(), table.name.clone(), OnDelete::Cascade),
                    Field::referencing(far_field.clone(), relation.table.clone(), OnDelete::Cascade),
                ],
                indexes: vec![Index {
                    name: format!("idx_{}_unique", name),
                    fields: vec![near_field, far_field],
                    unique: true,
                }],
            });
        }
    }

    for table in &mut schema.tables {
        table.fields.retain(|f| f.field_type != FieldType::ManyToMany);
    }
    schema.tables.extend(junctions);
    schema.canonicalize();
}

#[derive(Clone, Copy, PartialEq)]
enum Color {
    White,
    Gray,
    Black,
}

/// DFS post-order over the foreign-key graph.
///
/// Emits referenced tables before their referencers. A back edge (the
/// target is gray) closes a cycle; the edge is recorded as deferred and
/// skipped, which is exactly "break at the edge leaving the later table"
/// because roots and adjacency are walked in lexicographic order.
fn sort_tables(schema: &Schema) -> (Vec<String>, Vec<DeferredConstraint>) {
    // Adjacency: owner table -> outgoing foreign-key edges, sorted.
    let mut adjacency: BTreeMap<&str, Vec<(&str, &str, OnDelete)>> = BTreeMap::new();
    for table in &schema.tables {
        let mut edges = Vec::new();
        for field in &table.fields {
            if let Some(fk) = &field.foreign_key {
                // Self-references stay inline; a table can reference itself
                // inside its own CREATE TABLE.
                if fk.table != table.name && schema.table(&fk.table).is_some() {
                    edges.push((fk.table.as_str(), field.name.as_str(), fk.on_delete));
                }
            }
        }
        edges.sort();
        adjacency.insert(table.name.as_str(), edges);
    }

    let mut colors: BTreeMap<&str, Color> = schema.tables.iter().map(|t| (t.name.as_str(), Color::White)).collect();
    let mut order = Vec::new();
    let mut deferred = Vec::new();

    // Tables are already in canonical (sorted) order.
    for table in &schema.tables {
        visit(table.name.as_str(), &adjacency, &mut colors, &mut order, &mut deferred);
    }

    (order, deferred)
}

fn visit<'a>(
    name: &'a str,
    adjacency: &BTreeMap<&'a str, Vec<(&'a str, &'a str, OnDelete)>>,
    colors: &mut BTreeMap<&'a str, Color>,
    order: &mut Vec<String>,
    deferred: &mut Vec<DeferredConstraint>,
) {
    if colors[name] != Color::White {
        return;
    }
    colors.insert(name, Color::Gray);

    for (target, field, on_delete) in &adjacency[name] {
        match colors[target] {
            Color::White => visit(target, adjacency, colors, order, deferred),
            Color::Gray => deferred.push(DeferredConstraint {
                table: name.to_string(),
                field: field.to_string(),
                references: target.to_string(),
                on_delete: *on_delete,
            }),
            Color::Black => {}
        }
    }

    colors.insert(name, Color::Black);
    order.push(name.to_string());
}
