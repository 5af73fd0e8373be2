//! Structural diff between two schema snapshots.
//!
//! The diff engine compares the enriched schema of the current run against
//! the last snapshot and produces the ordered change list the writer turns
//! into DDL. Comparison is name-keyed throughout: tables match by name,
//! fields by name, indexes by name. An index whose definition changed is a
//! removal followed by an addition; renames are never detected, a renamed
//! item diffs as drop + add.
//!
//! ## Emission Order
//!
//! Additions come out in dependency order (referenced tables first), so
//! every `CREATE TABLE` can reference what precedes it. Removals come out
//! in reverse dependency order, so dependents disappear before their
//! dependencies. The full list is stable across runs for equal inputs:
//!
//! 1. added tables, in dependency order
//! 2. per surviving table in dependency order: index removals, field
//!    additions, field modifications, index additions
//! 3. per surviving table in reverse dependency order: field removals
//! 4. removed tables, in reverse dependency order

use crate::schema::analyze::Analysis;
use crate::schema::model::Table;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

/// One atomic structural change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    TableAdded(String),
    TableRemoved(String),
    FieldAdded { table: String, field: String },
    FieldRemoved { table: String, field: String },
    FieldModified { table: String, field: String },
    IndexAdded { table: String, index: String },
    IndexRemoved { table: String, index: String },
}

impl Change {
    /// The configuration vocabulary kind of this change.
    pub fn kind(&self) -> ChangeKind {
        match self {
            Change::TableAdded(_) => ChangeKind::TableAdded,
            Change::TableRemoved(_) => ChangeKind::TableRemoved,
            Change::FieldAdded { .. } => ChangeKind::FieldAdded,
            Change::FieldRemoved { .. } => ChangeKind::FieldRemoved,
            Change::FieldModified { .. } => ChangeKind::FieldModified,
            Change::IndexAdded { .. } => ChangeKind::IndexAdded,
            Change::IndexRemoved { .. } => ChangeKind::IndexRemoved,
        }
    }

    /// The table this change touches.
    pub fn table(&self) -> &str {
        match self {
            Change::TableAdded(table) | Change::TableRemoved(table) => table,
            Change::FieldAdded { table, .. }
            | Change::FieldRemoved { table, .. }
            | Change::FieldModified { table, .. }
            | Change::IndexAdded { table, .. }
            | Change::IndexRemoved { table, .. } => table,
        }
    }

    /// Short human description, used in plans, prompts and annotations.
    pub fn describe(&self) -> String {
        match self {
            Change::TableAdded(table) => format!("add table {}", table),
            Change::TableRemoved(table) => format!("drop table {}", table),
            Change::FieldAdded { table, field } => format!("add column {}.{}", table, field),
            Change::FieldRemoved { table, field } => format!("drop column {}.{}", table, field),
            Change::FieldModified { table, field } => format!("alter column {}.{}", table, field),
            Change::IndexAdded { table, index } => format!("add index {}.{}", table, index),
            Change::IndexRemoved { table, index } => format!("drop index {}.{}", table, index),
        }
    }
}

/// Change kinds as spelled in configuration.
///
/// `table_renamed` and `field_renamed` are accepted so destructive-set
/// configurations can list them, even though the diff engine itself always
/// emits drop + add for renames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    TableAdded,
    TableRemoved,
    FieldAdded,
    FieldRemoved,
    FieldModified,
    IndexAdded,
    IndexRemoved,
    TableRenamed,
    FieldRenamed,
}

impl Display for ChangeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            ChangeKind::TableAdded => "table_added",
            ChangeKind::TableRemoved => "table_removed",
            ChangeKind::FieldAdded => "field_added",
            ChangeKind::FieldRemoved => "field_removed",
            ChangeKind::FieldModified => "field_modified",
            ChangeKind::IndexAdded => "index_added",
            ChangeKind::IndexRemoved => "index_removed",
            ChangeKind::TableRenamed => "table_renamed",
            ChangeKind::FieldRenamed => "field_renamed",
        };
        f.write_str(text)
    }
}

/// Computes the ordered change list between two analyzed schemas.
///
/// With no previous snapshot every table of the new schema is an addition:
/// the initial migration.
pub fn diff(old: Option<&Analysis>, new: &Analysis) -> Vec<Change> {
    let mut changes = Vec::new();

    let old = match old {
        Some(old) => old,
        None => {
            for name in &new.order {
                changes.push(Change::TableAdded(name.clone()));
            }
            return changes;
        }
    };

    let old_names: BTreeSet<&str> = old.schema.tables.iter().map(|t| t.name.as_str()).collect();
    let new_names: BTreeSet<&str> = new.schema.tables.iter().map(|t| t.name.as_str()).collect();

    for name in &new.order {
        if !old_names.contains(name.as_str()) {
            changes.push(Change::TableAdded(name.clone()));
        }
    }

    for name in &new.order {
        if let (Some(old_table), Some(new_table)) = (old.schema.table(name), new.schema.table(name)) {
            diff_table(old_table, new_table, &mut changes);
        }
    }

    for name in old.order.iter().rev() {
        if let (Some(old_table), Some(new_table)) = (old.schema.table(name), new.schema.table(name)) {
            for field in old_table.fields.iter().rev() {
                if new_table.field(&field.name).is_none() {
                    changes.push(Change::FieldRemoved {
                        table: name.clone(),
                        field: field.name.clone(),
                    });
                }
            }
        }
    }

    for name in old.order.iter().rev() {
        if !new_names.contains(name.as_str()) {
            changes.push(Change::TableRemoved(name.clone()));
        }
    }

    changes
}

/// Per-table additions and modifications; removals are handled globally so
/// they land in reverse dependency order.
fn diff_table(old: &Table, new: &Table, changes: &mut Vec<Change>) {
    for index in &old.indexes {
        let gone = match new.index(&index.name) {
            None => true,
            Some(redefined) => !redefined.definition_eq(index),
        };
        if gone {
            changes.push(Change::IndexRemoved {
                table: new.name.clone(),
                index: index.name.clone(),
            });
        }
    }

    for field in &new.fields {
        match old.field(&field.name) {
            None => changes.push(Change::FieldAdded {
                table: new.name.clone(),
                field: field.name.clone(),
            }),
            Some(previous) if !previous.definition_eq(field) => changes.push(Change::FieldModified {
                table: new.name.clone(),
                field: field.name.clone(),
            }),
            Some(_) => {}
        }
    }

    for index in &new.indexes {
        let fresh = match old.index(&index.name) {
            None => true,
            Some(previous) => !previous.definition_eq(index),
        };
        if fresh {
            changes.push(Change::IndexAdded {
                table: new.name.clone(),
                index: index.name.clone(),
            });
        }
    }
}

/// True when the change list contains anything that affects emitted DDL.
///
/// Purely cosmetic differences (attribute respelling, ordering) never make
/// it into the list in the first place, so emptiness is the whole test.
pub fn has_changes(changes: &[Change]) -> bool {
    !changes.is_empty()
}
