//! SQLite provider.
//!
//! Double-quoted identifiers and the narrowest ALTER support of the set:
//! columns can be added, dropped and renamed, but never altered in place,
//! and foreign keys cannot be added or dropped after table creation. Those
//! operations come back as unsupported placeholders that name the manual
//! table-recreation step. Serial primary keys use the engine's
//! `INTEGER PRIMARY KEY AUTOINCREMENT` form, which must appear inline in
//! the column definition.

use super::{Ddl, Dialect, EmitOptions, SqlDialect};
use crate::schema::analyze::DeferredConstraint;
use crate::schema::model::{Field, FieldType, Schema, Table};

pub struct Sqlite {
    options: EmitOptions,
}

impl Sqlite {
    pub fn new(options: EmitOptions) -> Self {
        Sqlite { options }
    }
}

impl SqlDialect for Sqlite {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn options(&self) -> &EmitOptions {
        &self.options
    }

    fn quote_raw(&self, ident: &str) -> String {
        format!("\"{}\"", ident)
    }

    fn scalar_type(&self, field: &Field) -> String {
        match field.field_type {
            FieldType::Varchar => format!("VARCHAR({})", field.length.unwrap_or(255)),
            FieldType::Text => "TEXT".to_string(),
            FieldType::Integer => "INTEGER".to_string(),
            FieldType::Bigint => "BIGINT".to_string(),
            FieldType::Serial => "INTEGER".to_string(),
            FieldType::Float => "REAL".to_string(),
            FieldType::Decimal => format!("DECIMAL({}, {})", field.precision.unwrap_or(10), field.scale.unwrap_or(0)),
            FieldType::Boolean => "BOOLEAN".to_string(),
            FieldType::Date => "DATE".to_string(),
            FieldType::Time => "TIME".to_string(),
            FieldType::Timestamp => "TIMESTAMP".to_string(),
            FieldType::Uuid => "TEXT".to_string(),
            FieldType::Jsonb => "TEXT".to_string(),
            FieldType::ForeignKey | FieldType::ManyToMany => "INTEGER".to_string(),
        }
    }

    fn create_table(&self, table: &Table, schema: &Schema, deferred: &[DeferredConstraint]) -> Ddl {
        let serial_pk = table.primary_key().filter(|pk| pk.field_type == FieldType::Serial);
        let mut lines = Vec::new();

        for field in &table.fields {
            if serial_pk.map(|pk| pk.name == field.name).unwrap_or(false) {
                // AUTOINCREMENT is only valid on an inline INTEGER PRIMARY KEY.
                lines.push(format!("    {} INTEGER PRIMARY KEY AUTOINCREMENT", self.quote(&field.name)));
            } else {
                lines.push(format!("    {}", self.column_def(field, schema)));
            }
        }

        if serial_pk.is_none() {
            if let Some(pk) = table.primary_key() {
                lines.push(format!("    PRIMARY KEY ({})", self.quote(&pk.name)));
            }
        }

        for field in &table.fields {
            if deferred.iter().any(|d| d.table == table.name && d.field == field.name) {
                continue;
            }
            if let Some(clause) = self.foreign_key_clause(table, field, schema) {
                lines.push(format!("    {}", clause));
            }
        }

        Ddl::Stmt(format!("CREATE TABLE {} (\n{}\n);", self.table_ref(&table.name), lines.join(",\n")))
    }

    fn alter_column(&self, table: &str, old: &Field, new: &Field, schema: &Schema) -> Vec<Ddl> {
        let _ = (old, schema);
        vec![Ddl::unsupported(
            format!("SQLite cannot alter column {}.{} in place", table, new.name),
            "recreate the table with the new definition and copy the data over",
        )]
    }

    fn add_foreign_key(&self, constraint: &DeferredConstraint, schema: &Schema) -> Ddl {
        let _ = schema;
        Ddl::unsupported(
            format!(
                "SQLite cannot add foreign key {}.{} -> {} after table creation",
                constraint.table, constraint.field, constraint.references
            ),
            "recreate the table with the constraint in its definition",
        )
    }

    fn drop_foreign_key(&self, constraint: &DeferredConstraint) -> Ddl {
        Ddl::unsupported(
            format!("SQLite cannot drop foreign key {} from {}", constraint.constraint_name(), constraint.table),
            "recreate the table without the constraint",
        )
    }
}
