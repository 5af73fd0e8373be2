//! Dialect-aware SQL emission.
//!
//! Every supported database engine implements the [`SqlDialect`] capability
//! set: identifier quoting, type mapping, default resolution, and one
//! emitter per DDL operation. The shared mechanics (column definitions,
//! CREATE TABLE assembly, default-value resolution) live in the trait's
//! default methods; each provider overrides only where its engine differs.
//!
//! Emitters never fail generation. An operation the engine cannot express
//! comes back as [`Ddl::Unsupported`] and is rendered by the migration
//! writer as a commented placeholder naming the required manual action.
//!
//! ## Adding a Dialect
//!
//! New engines are added by implementing the capability set and extending
//! the [`Dialect`] enum; nothing else in the pipeline changes.

pub mod mysql;
pub mod postgres;
pub mod sqlite;
pub mod sqlserver;

use crate::schema::analyze::DeferredConstraint;
use crate::schema::model::{Field, FieldType, Index, Schema, Table};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// The closed set of supported SQL dialects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgresql,
    Mysql,
    Sqlite,
    Sqlserver,
}

impl Dialect {
    /// All dialects, in presentation order.
    pub const ALL: [Dialect; 4] = [Dialect::Postgresql, Dialect::Mysql, Dialect::Sqlite, Dialect::Sqlserver];

    /// The key used in configuration and per-dialect defaults tables.
    pub fn key(self) -> &'static str {
        match self {
            Dialect::Postgresql => "postgresql",
            Dialect::Mysql => "mysql",
            Dialect::Sqlite => "sqlite",
            Dialect::Sqlserver => "sqlserver",
        }
    }

    /// Constructs the emitter for this dialect.
    pub fn provider(self, options: EmitOptions) -> Box<dyn SqlDialect> {
        match self {
            Dialect::Postgresql => Box::new(postgres::Postgres::new(options)),
            Dialect::Mysql => Box::new(mysql::Mysql::new(options)),
            Dialect::Sqlite => Box::new(sqlite::Sqlite::new(options)),
            Dialect::Sqlserver => Box::new(sqlserver::SqlServer::new(options)),
        }
    }

    /// Maximum varchar length, when the engine caps it.
    pub fn max_varchar_length(self) -> Option<u32> {
        match self {
            Dialect::Postgresql => Some(10_485_760),
            Dialect::Mysql => Some(65_535),
            Dialect::Sqlite => None,
            Dialect::Sqlserver => Some(8_000),
        }
    }

    /// Maximum decimal precision, when the engine caps it.
    pub fn max_decimal_precision(self) -> Option<u32> {
        match self {
            Dialect::Postgresql => Some(1_000),
            Dialect::Mysql => Some(65),
            Dialect::Sqlite => None,
            Dialect::Sqlserver => Some(38),
        }
    }

    /// Whether the engine has a native JSON column type.
    pub fn native_json(self) -> bool {
        matches!(self, Dialect::Postgresql | Dialect::Mysql)
    }

    /// The storage type JSON degrades to on engines without one.
    pub fn json_fallback(self) -> &'static str {
        match self {
            Dialect::Postgresql => "JSONB",
            Dialect::Mysql => "JSON",
            Dialect::Sqlite => "TEXT",
            Dialect::Sqlserver => "NVARCHAR(MAX)",
        }
    }

    /// Whether the engine has a native UUID column type.
    pub fn native_uuid(self) -> bool {
        matches!(self, Dialect::Postgresql | Dialect::Sqlserver)
    }

    /// The storage type UUID degrades to on engines without one.
    pub fn uuid_fallback(self) -> &'static str {
        match self {
            Dialect::Postgresql => "UUID",
            Dialect::Mysql => "CHAR(36)",
            Dialect::Sqlite => "TEXT",
            Dialect::Sqlserver => "UNIQUEIDENTIFIER",
        }
    }
}

impl Display for Dialect {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Options every provider is constructed with.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Quote identifiers in emitted DDL.
    pub quote_identifiers: bool,
    /// Namespace tables live in, for engines with schema support.
    pub default_schema: Option<String>,
}

impl Default for EmitOptions {
    fn default() -> Self {
        EmitOptions {
            quote_identifiers: true,
            default_schema: None,
        }
    }
}

/// One emitted DDL operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ddl {
    /// A complete SQL statement, terminated with `;`.
    Stmt(String),
    /// The engine cannot express the operation; rendered as a commented
    /// placeholder, never executed.
    Unsupported { reason: String, action: String },
}

impl Ddl {
    pub fn unsupported(reason: impl Into<String>, action: impl Into<String>) -> Self {
        Ddl::Unsupported {
            reason: reason.into(),
            action: action.into(),
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Ddl::Unsupported { .. })
    }
}

/// The emission capability set of one database engine.
pub trait SqlDialect {
    fn dialect(&self) -> Dialect;

    fn options(&self) -> &EmitOptions;

    /// Quotes an identifier unconditionally, in the engine's own style.
    fn quote_raw(&self, ident: &str) -> String;

    /// Maps a non-relationship field type to the engine's SQL type.
    fn scalar_type(&self, field: &Field) -> String;

    /// The engine's current-timestamp expression.
    fn now_fragment(&self) -> &'static str {
        "CURRENT_TIMESTAMP"
    }

    /// Whether tables can be namespace-qualified.
    fn supports_schemas(&self) -> bool {
        matches!(self.dialect(), Dialect::Postgresql | Dialect::Sqlserver)
    }

    /// Quotes an identifier, honoring the `quote_identifiers` option.
    fn quote(&self, ident: &str) -> String {
        if self.options().quote_identifiers {
            self.quote_raw(ident)
        } else {
            ident.to_string()
        }
    }

    /// Table reference, namespace-qualified where supported and configured.
    fn table_ref(&self, name: &str) -> String {
        match &self.options().default_schema {
            Some(namespace) if self.supports_schemas() => {
                format!("{}.{}", self.quote(namespace), self.quote(name))
            }
            _ => self.quote(name),
        }
    }

    /// SQL column type of a field, with foreign keys typed after the
    /// referenced table's primary key (UUID target gives a UUID column,
    /// serial and bigint targets give BIGINT).
    fn column_type(&self, field: &Field, schema: &Schema) -> String {
        if field.field_type != FieldType::ForeignKey {
            return self.scalar_type(field);
        }
        let target_pk = field
            .foreign_key
            .as_ref()
            .and_then(|fk| schema.table(&fk.table))
            .and_then(|t| t.primary_key());
        match target_pk {
            Some(pk) if matches!(pk.field_type, FieldType::Serial | FieldType::Bigint) => {
                self.scalar_type(&Field::new("", FieldType::Bigint))
            }
            Some(pk) => self.scalar_type(pk),
            None => self.scalar_type(&Field::new("", FieldType::Bigint)),
        }
    }

    /// Resolves a field's default to an SQL fragment.
    ///
    /// Symbolic names go through the schema's per-dialect defaults table
    /// first. Unresolved values that read as numbers or booleans are
    /// emitted literally; everything else becomes a quoted string.
    fn resolve_default(&self, field: &Field, schema: &Schema) -> Option<String> {
        if field.default.is_none() && field.auto_create {
            let now = schema
                .default_fragment(self.dialect().key(), "now")
                .unwrap_or_else(|| self.now_fragment());
            return Some(now.to_string());
        }

        let raw = field.default.as_deref()?;
        if let Some(fragment) = schema.default_fragment(self.dialect().key(), raw) {
            return Some(fragment.to_string());
        }
        if raw == "true" || raw == "false" || raw.parse::<f64>().is_ok() {
            return Some(raw.to_string());
        }
        Some(quote_literal(raw))
    }

    /// One column definition line: name, type, nullability, default.
    fn column_def(&self, field: &Field, schema: &Schema) -> String {
        let mut parts = vec![self.quote(&field.name), self.column_type(field, schema)];
        if !field.is_nullable() {
            parts.push("NOT NULL".to_string());
        }
        if let Some(default) = self.resolve_default(field, schema) {
            parts.push(format!("DEFAULT {}", default));
        }
        parts.join(" ")
    }

    /// Inline foreign-key constraint clause for a CREATE TABLE body.
    fn foreign_key_clause(&self, table: &Table, field: &Field, schema: &Schema) -> Option<String> {
        let fk = field.foreign_key.as_ref()?;
        let target_pk = schema
            .table(&fk.table)
            .and_then(|t| t.primary_key())
            .map(|pk| pk.name.clone())
            .unwrap_or_else(|| "id".to_string());
        Some(format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {}",
            self.quote(&format!("fk_{}_{}", table.name, field.name)),
            self.quote(&field.name),
            self.table_ref(&fk.table),
            self.quote(&target_pk),
            fk.on_delete.sql()
        ))
    }

    /// Emits a CREATE TABLE with inline constraints, skipping any
    /// foreign-key edge listed as deferred.
    fn create_table(&self, table: &Table, schema: &Schema, deferred: &[DeferredConstraint]) -> Ddl {
        let mut lines: Vec<String> = table.fields.iter().map(|f| format!("    {}", self.column_def(f, schema))).collect();

        if let Some(pk) = table.primary_key() {
            lines.push(format!("    PRIMARY KEY ({})", self.quote(&pk.name)));
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

    fn drop_table(&self, table: &str) -> Ddl {
        Ddl::Stmt(format!("DROP TABLE {};", self.table_ref(table)))
    }

    fn add_column(&self, table: &str, field: &Field, schema: &Schema) -> Ddl {
        Ddl::Stmt(format!("ALTER TABLE {} ADD COLUMN {};", self.table_ref(table), self.column_def(field, schema)))
    }

    fn drop_column(&self, table: &str, field: &str) -> Ddl {
        Ddl::Stmt(format!("ALTER TABLE {} DROP COLUMN {};", self.table_ref(table), self.quote(field)))
    }

    /// Emits the statements that take a column from `old` to `new`.
    fn alter_column(&self, table: &str, old: &Field, new: &Field, schema: &Schema) -> Vec<Ddl>;

    fn create_index(&self, table: &str, index: &Index) -> Ddl {
        let unique = if index.unique { "UNIQUE " } else { "" };
        let fields: Vec<String> = index.fields.iter().map(|f| self.quote(f)).collect();
        Ddl::Stmt(format!(
            "CREATE {}INDEX {} ON {} ({});",
            unique,
            self.quote(&index.name),
            self.table_ref(table),
            fields.join(", ")
        ))
    }

    fn drop_index(&self, table: &str, index: &str) -> Ddl {
        let _ = table;
        Ddl::Stmt(format!("DROP INDEX {};", self.quote(index)))
    }

    fn rename_table(&self, old: &str, new: &str) -> Ddl {
        Ddl::Stmt(format!("ALTER TABLE {} RENAME TO {};", self.table_ref(old), self.quote(new)))
    }

    fn rename_column(&self, table: &str, old: &str, new: &str) -> Ddl {
        Ddl::Stmt(format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {};",
            self.table_ref(table),
            self.quote(old),
            self.quote(new)
        ))
    }

    /// Out-of-line foreign key, used for deferred constraints and for
    /// foreign-key columns added to existing tables.
    fn add_foreign_key(&self, constraint: &DeferredConstraint, schema: &Schema) -> Ddl {
        let target_pk = schema
            .table(&constraint.references)
            .and_then(|t| t.primary_key())
            .map(|pk| pk.name.clone())
            .unwrap_or_else(|| "id".to_string());
        Ddl::Stmt(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {};",
            self.table_ref(&constraint.table),
            self.quote(&constraint.constraint_name()),
            self.quote(&constraint.field),
            self.table_ref(&constraint.references),
            self.quote(&target_pk),
            constraint.on_delete.sql()
        ))
    }

    fn drop_foreign_key(&self, constraint: &DeferredConstraint) -> Ddl {
        Ddl::Stmt(format!(
            "ALTER TABLE {} DROP CONSTRAINT {};",
            self.table_ref(&constraint.table),
            self.quote(&constraint.constraint_name())
        ))
    }
}

/// Single-quoted SQL string literal with embedded quotes doubled.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
