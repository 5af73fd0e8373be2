//! PostgreSQL provider: the canonical, full-capability dialect.
//!
//! Double-quoted identifiers, native UUID and JSONB, SERIAL auto-increment,
//! and every ALTER operation of the capability set expressed directly.
//! Column modifications decompose into separate `ALTER COLUMN` statements
//! for type, nullability and default, so each emitted statement stays a
//! single reviewable operation.

use super::{Ddl, Dialect, EmitOptions, SqlDialect};
use crate::schema::model::{Field, FieldType, Schema};

pub struct Postgres {
    options: EmitOptions,
}

impl Postgres {
    pub fn new(options: EmitOptions) -> Self {
        Postgres { options }
    }
}

impl SqlDialect for Postgres {
    fn dialect(&self) -> Dialect {
        Dialect::Postgresql
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
            FieldType::Serial => "SERIAL".to_string(),
            FieldType::Float => "DOUBLE PRECISION".to_string(),
            FieldType::Decimal => format!("DECIMAL({}, {})", field.precision.unwrap_or(10), field.scale.unwrap_or(0)),
            FieldType::Boolean => "BOOLEAN".to_string(),
            FieldType::Date => "DATE".to_string(),
            FieldType::Time => "TIME".to_string(),
            FieldType::Timestamp => "TIMESTAMP".to_string(),
            FieldType::Uuid => "UUID".to_string(),
            FieldType::Jsonb => "JSONB".to_string(),
            // Relationship pseudo-types are resolved via column_type; this
            // is only the fallback when the target cannot be inspected.
            FieldType::ForeignKey | FieldType::ManyToMany => "BIGINT".to_string(),
        }
    }

    fn alter_column(&self, table: &str, old: &Field, new: &Field, schema: &Schema) -> Vec<Ddl> {
        let mut statements = Vec::new();
        let table_ref = self.table_ref(table);
        let column = self.quote(&new.name);

        let old_type = self.column_type(old, schema);
        let new_type = self.column_type(new, schema);
        if old_type != new_type {
            statements.push(Ddl::Stmt(format!("ALTER TABLE {} ALTER COLUMN {} TYPE {};", table_ref, column, new_type)));
        }

        if old.is_nullable() != new.is_nullable() {
            let clause = if new.is_nullable() { "DROP NOT NULL" } else { "SET NOT NULL" };
            statements.push(Ddl::Stmt(format!("ALTER TABLE {} ALTER COLUMN {} {};", table_ref, column, clause)));
        }

        let old_default = self.resolve_default(old, schema);
        let new_default = self.resolve_default(new, schema);
        if old_default != new_default {
            match new_default {
                Some(value) => statements.push(Ddl::Stmt(format!(
                    "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {};",
                    table_ref, column, value
                ))),
                None => statements.push(Ddl::Stmt(format!("ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT;", table_ref, column))),
            }
        }

        statements
    }
}
