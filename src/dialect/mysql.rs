//! MySQL provider.
//!
//! Backtick quoting, `AUTO_INCREMENT` for serials, `CHAR(36)` UUID storage,
//! native JSON, and timestamp maintenance via `ON UPDATE CURRENT_TIMESTAMP`.
//! Column modifications are a single `MODIFY COLUMN` carrying the full new
//! definition; index and foreign-key drops use the MySQL-specific spellings.

use super::{Ddl, Dialect, EmitOptions, SqlDialect};
use crate::schema::analyze::DeferredConstraint;
use crate::schema::model::{Field, FieldType, Schema};

pub struct Mysql {
    options: EmitOptions,
}

impl Mysql {
    pub fn new(options: EmitOptions) -> Self {
        Mysql { options }
    }
}

impl SqlDialect for Mysql {
    fn dialect(&self) -> Dialect {
        Dialect::Mysql
    }

    fn options(&self) -> &EmitOptions {
        &self.options
    }

    fn quote_raw(&self, ident: &str) -> String {
        format!("`{}`", ident)
    }

    fn scalar_type(&self, field: &Field) -> String {
        match field.field_type {
            FieldType::Varchar => format!("VARCHAR({})", field.length.unwrap_or(255)),
            FieldType::Text => "TEXT".to_string(),
            FieldType::Integer => "INT".to_string(),
            FieldType::Bigint => "BIGINT".to_string(),
            FieldType::Serial => "BIGINT".to_string(),
            FieldType::Float => "DOUBLE".to_string(),
            FieldType::Decimal => format!("DECIMAL({}, {})", field.precision.unwrap_or(10), field.scale.unwrap_or(0)),
            FieldType::Boolean => "BOOLEAN".to_string(),
            FieldType::Date => "DATE".to_string(),
            FieldType::Time => "TIME".to_string(),
            // DATETIME sidesteps the TIMESTAMP range limit while still
            // accepting CURRENT_TIMESTAMP defaults.
            FieldType::Timestamp => "DATETIME".to_string(),
            FieldType::Uuid => "CHAR(36)".to_string(),
            FieldType::Jsonb => "JSON".to_string(),
            FieldType::ForeignKey | FieldType::ManyToMany => "BIGINT".to_string(),
        }
    }

    fn column_def(&self, field: &Field, schema: &Schema) -> String {
        let mut parts = vec![self.quote(&field.name), self.column_type(field, schema)];
        if !field.is_nullable() {
            parts.push("NOT NULL".to_string());
        }
        if field.field_type == FieldType::Serial {
            parts.push("AUTO_INCREMENT".to_string());
        }
        if let Some(default) = self.resolve_default(field, schema) {
            parts.push(format!("DEFAULT {}", default));
        }
        if field.auto_update {
            parts.push("ON UPDATE CURRENT_TIMESTAMP".to_string());
        }
        parts.join(" ")
    }

    fn alter_column(&self, table: &str, old: &Field, new: &Field, schema: &Schema) -> Vec<Ddl> {
        let _ = old;
        vec![Ddl::Stmt(format!(
            "ALTER TABLE {} MODIFY COLUMN {};",
            self.table_ref(table),
            self.column_def(new, schema)
        ))]
    }

    fn drop_index(&self, table: &str, index: &str) -> Ddl {
        Ddl::Stmt(format!("DROP INDEX {} ON {};", self.quote(index), self.table_ref(table)))
    }

    fn drop_foreign_key(&self, constraint: &DeferredConstraint) -> Ddl {
        Ddl::Stmt(format!(
            "ALTER TABLE {} DROP FOREIGN KEY {};",
            self.table_ref(&constraint.table),
            self.quote(&constraint.constraint_name())
        ))
    }
}
