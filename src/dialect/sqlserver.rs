//! SQL Server provider.
//!
//! Bracket quoting, `IDENTITY(1,1)` serials, `UNIQUEIDENTIFIER` UUIDs and
//! Unicode string storage throughout (`NVARCHAR`, with `NVARCHAR(MAX)` as
//! the JSON fallback). Booleans map to `BIT`, so boolean defaults emit as
//! `1`/`0`. Column modifications restate type and nullability in one
//! `ALTER COLUMN`; a default change cannot be expressed without knowing
//! the server-generated constraint name and comes back unsupported.
//! Renames go through `sp_rename`.

use super::{Ddl, Dialect, EmitOptions, SqlDialect};
use crate::schema::model::{Field, FieldType, Schema};

pub struct SqlServer {
    options: EmitOptions,
}

impl SqlServer {
    pub fn new(options: EmitOptions) -> Self {
        SqlServer { options }
    }
}

impl SqlDialect for SqlServer {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlserver
    }

    fn options(&self) -> &EmitOptions {
        &self.options
    }

    fn quote_raw(&self, ident: &str) -> String {
        format!("[{}]", ident)
    }

    fn now_fragment(&self) -> &'static str {
        "GETDATE()"
    }

    fn scalar_type(&self, field: &Field) -> String {
        match field.field_type {
            FieldType::Varchar => format!("NVARCHAR({})", field.length.unwrap_or(255)),
            FieldType::Text => "NVARCHAR(MAX)".to_string(),
            FieldType::Integer => "INT".to_string(),
            FieldType::Bigint => "BIGINT".to_string(),
            FieldType::Serial => "BIGINT".to_string(),
            FieldType::Float => "FLOAT".to_string(),
            FieldType::Decimal => format!("DECIMAL({}, {})", field.precision.unwrap_or(10), field.scale.unwrap_or(0)),
            FieldType::Boolean => "BIT".to_string(),
            FieldType::Date => "DATE".to_string(),
            FieldType::Time => "TIME".to_string(),
            FieldType::Timestamp => "DATETIME2".to_string(),
            FieldType::Uuid => "UNIQUEIDENTIFIER".to_string(),
            FieldType::Jsonb => "NVARCHAR(MAX)".to_string(),
            FieldType::ForeignKey | FieldType::ManyToMany => "BIGINT".to_string(),
        }
    }

    fn resolve_default(&self, field: &Field, schema: &Schema) -> Option<String> {
        if field.default.is_none() && field.auto_create {
            let now = schema.default_fragment(self.dialect().key(), "now").unwrap_or_else(|| self.now_fragment());
            return Some(now.to_string());
        }

        let raw = field.default.as_deref()?;
        if let Some(fragment) = schema.default_fragment(self.dialect().key(), raw) {
            return Some(fragment.to_string());
        }
        // BIT columns take 1/0, not TRUE/FALSE.
        match raw {
            "true" => return Some("1".to_string()),
            "false" => return Some("0".to_string()),
            _ => {}
        }
        if raw.parse::<f64>().is_ok() {
            return Some(raw.to_string());
        }
        Some(super::quote_literal(raw))
    }

    fn column_def(&self, field: &Field, schema: &Schema) -> String {
        let mut parts = vec![self.quote(&field.name), self.column_type(field, schema)];
        if field.field_type == FieldType::Serial {
            parts.push("IDENTITY(1,1)".to_string());
        }
        if !field.is_nullable() {
            parts.push("NOT NULL".to_string());
        }
        if let Some(default) = self.resolve_default(field, schema) {
            parts.push(format!("DEFAULT {}", default));
        }
        parts.join(" ")
    }

    fn add_column(&self, table: &str, field: &Field, schema: &Schema) -> Ddl {
        Ddl::Stmt(format!("ALTER TABLE {} ADD {};", self.table_ref(table), self.column_def(field, schema)))
    }

    fn alter_column(&self, table: &str, old: &Field, new: &Field, schema: &Schema) -> Vec<Ddl> {
        let mut statements = Vec::new();

        let type_changed = self.column_type(old, schema) != self.column_type(new, schema);
        if type_changed || old.is_nullable() != new.is_nullable() {
            let null_clause = if new.is_nullable() { "NULL" } else { "NOT NULL" };
            statements.push(Ddl::Stmt(format!(
                "ALTER TABLE {} ALTER COLUMN {} {} {};",
                self.table_ref(table),
                self.quote(&new.name),
                self.column_type(new, schema),
                null_clause
            )));
        }

        if self.resolve_default(old, schema) != self.resolve_default(new, schema) {
            statements.push(Ddl::unsupported(
                format!("SQL Server binds defaults of {}.{} through a named constraint", table, new.name),
                "drop the existing default constraint by name, then add the new default",
            ));
        }

        statements
    }

    fn drop_index(&self, table: &str, index: &str) -> Ddl {
        Ddl::Stmt(format!("DROP INDEX {} ON {};", self.quote(index), self.table_ref(table)))
    }

    fn rename_table(&self, old: &str, new: &str) -> Ddl {
        Ddl::Stmt(format!("EXEC sp_rename '{}', '{}';", old, new))
    }

    fn rename_column(&self, table: &str, old: &str, new: &str) -> Ddl {
        Ddl::Stmt(format!("EXEC sp_rename '{}.{}', '{}', 'COLUMN';", table, old, new))
    }
}
