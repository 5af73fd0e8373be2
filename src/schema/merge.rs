//! Combining multiple schema documents into one canonical schema.
//!
//! The effective schema of a project is the merge of the root document with
//! every transitively included document. Merging is commutative modulo
//! tie-breaking: input order only decides which source wins when both carry
//! an equally ranked attribute, never the semantics of the result.
//!
//! ## Conflict Rules
//!
//! When the same field appears in two documents, attributes combine by
//! dominance:
//!
//! - type mismatch is fatal
//! - the larger `length` wins for varchar; the larger `precision` and
//!   `scale` win independently for decimal
//! - NOT NULL wins over nullable; `primary_key: true` wins over false
//! - two differing explicit defaults are fatal; a single one wins
//! - `auto_create`/`auto_update` true wins
//! - the stricter `on_delete` wins (RESTRICT/PROTECT > NO_ACTION >
//!   SET_NULL > CASCADE); a differing target table is fatal
//!
//! Indexes with identical name and definition deduplicate; identical name
//! with a different definition is fatal. The per-dialect defaults tables
//! union; one symbol mapping to two different fragments is fatal.

use crate::schema::error::{Error, Result};
use crate::schema::model::{Field, Schema, Table};
use std::collections::BTreeMap;

/// Merges any number of loaded schemas into one canonical schema.
///
/// The result carries the first non-empty database identity, the union of
/// all tables and defaults, no include entries, and canonical ordering.
pub fn merge(schemas: &[Schema]) -> Result<Schema> {
    let mut merged = Schema::default();

    // Origin of the first document that contributed each table, for
    // conflict reporting.
    let mut table_origins: BTreeMap<String, String> = BTreeMap::new();

    for schema in schemas {
        if merged.database.name.is_empty() {
            merged.database = schema.database.clone();
        }

        merge_defaults(&mut merged, schema)?;

        for table in &schema.tables {
            match merged.tables.iter().position(|t| t.name == table.name) {
                Some(i) => {
                    let left = table_origins.get(&table.name).cloned().unwrap_or_default();
                    merge_table(&mut merged.tables[i], table, &left, &schema.origin)?;
                }
                None => {
                    merged.tables.push(table.clone());
                    table_origins.insert(table.name.clone(), schema.origin.clone());
                }
            }
        }
    }

    merged.include.clear();
    merged.origin.clear();
    merged.database.tool_version.clear();
    merged.canonicalize();
    Ok(merged)
}

fn merge_defaults(merged: &mut Schema, schema: &Schema) -> Result<()> {
    for (dialect, symbols) in &schema.defaults {
        let target = merged.defaults.entry(dialect.clone()).or_default();
        for (symbol, fragment) in symbols {
            match target.get(symbol).cloned() {
                Some(existing) if existing != *fragment => {
                    return Err(Error::MergeConflict {
                        location: format!("defaults.{}.{}", dialect, symbol),
                        detail: format!("'{}' vs '{}'", existing, fragment),
                        left: "earlier document".to_string(),
                        right: schema.origin.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    target.insert(symbol.clone(), fragment.clone());
                }
            }
        }
    }
    Ok(())
}

fn merge_table(into: &mut Table, from: &Table, left: &str, right: &str) -> Result<()> {
    let table_name = into.name.clone();

    for field in &from.fields {
        match into.fields.iter().position(|f| f.name == field.name) {
            Some(i) => merge_field(&mut into.fields[i], field, &table_name, left, right)?,
            None => into.fields.push(field.clone()),
        }
    }

    for index in &from.indexes {
        match into.indexes.iter().position(|i| i.name == index.name) {
            Some(i) if into.indexes[i].definition_eq(index) => {}
            Some(_) => {
                return Err(Error::MergeConflict {
                    location: format!("{}.{}", table_name, index.name),
                    detail: "index redefined with a different field list or uniqueness".to_string(),
                    left: left.to_string(),
                    right: right.to_string(),
                });
            }
            None => into.indexes.push(index.clone()),
        }
    }

    Ok(())
}

fn merge_field(into: &mut Field, from: &Field, table: &str, left: &str, right: &str) -> Result<()> {
    let location = format!("{}.{}", table, into.name);
    let conflict = move |detail: String| Error::MergeConflict {
        location: location.clone(),
        detail,
        left: left.to_string(),
        right: right.to_string(),
    };

    if into.field_type != from.field_type {
        return Err(conflict(format!("type mismatch: {} vs {}", into.field_type, from.field_type)));
    }

    // Size attributes: the larger bound wins, each independently.
    into.length = max_option(into.length, from.length);
    into.precision = max_option(into.precision, from.precision);
    into.scale = max_option(into.scale, from.scale);

    into.primary_key |= from.primary_key;
    into.auto_create |= from.auto_create;
    into.auto_update |= from.auto_update;

    // NOT NULL is the stricter constraint and always wins.
    into.nullable = match (into.nullable, from.nullable) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), _) | (_, Some(true)) => Some(true),
        (None, None) => None,
    };

    match (&into.default, &from.default) {
        (Some(a), Some(b)) if a != b => {
            return Err(conflict(format!("default mismatch: '{}' vs '{}'", a, b)));
        }
        (None, Some(b)) => into.default = Some(b.clone()),
        _ => {}
    }

    match (&mut into.foreign_key, &from.foreign_key) {
        (Some(a), Some(b)) => {
            if a.table != b.table {
                return Err(conflict(format!("foreign key targets differ: {} vs {}", a.table, b.table)));
            }
            if b.on_delete.strictness() > a.on_delete.strictness() {
                a.on_delete = b.on_delete;
            }
        }
        (None, Some(b)) => into.foreign_key = Some(b.clone()),
        _ => {}
    }

    match (&mut into.many_to_many, &from.many_to_many) {
        (Some(a), Some(b)) => {
            if a.table != b.table {
                return Err(conflict(format!("many-to-many targets differ: {} vs {}", a.table, b.table)));
            }
            match (&a.junction, &b.junction) {
                (Some(x), Some(y)) if x != y => {
                    return Err(conflict(format!("junction names differ: {} vs {}", x, y)));
                }
                (None, Some(y)) => a.junction = Some(y.clone()),
                _ => {}
            }
        }
        (None, Some(b)) => into.many_to_many = Some(b.clone()),
        _ => {}
    }

    Ok(())
}

fn max_option(a: Option<u32>, b: Option<u32>) -> Option<u32> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}
