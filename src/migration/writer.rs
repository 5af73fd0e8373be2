//! Migration assembly: forward and reverse scripts, numbering, naming.
//!
//! The writer takes the ordered change list and the two analyzed schemas
//! and produces one migration artifact: a numbered, slug-named file whose
//! sections are delimited by the sentinel comments the goose runner
//! recognizes. The up section carries the forward DDL in change order with
//! deferred foreign keys batched after all creates; the down section
//! carries the exact inverses in reverse order, reconstructed from the
//! previous snapshot, every statement preceded by a review comment.
//!
//! ## File Layout
//!
//! ```text
//! -- +goose Up
//! -- +goose StatementBegin
//! <forward DDL>
//! -- +goose StatementEnd
//! -- +goose Down
//! -- +goose StatementBegin
//! <reverse DDL>
//! -- +goose StatementEnd
//! ```
//!
//! The writer refuses to overwrite an existing migration file and never
//! touches the snapshot; committing the snapshot after a successful write
//! is the caller's step, so a crash in between leaves the previous
//! snapshot authoritative.

use crate::dialect::{Ddl, EmitOptions, SqlDialect};
use crate::libs::config::Config;
use crate::migration::destructive::{DestructivePolicy, Verdict};
use crate::migration::numbering;
use crate::schema::analyze::{Analysis, DeferredConstraint};
use crate::schema::diff::{Change, ChangeKind};
use crate::schema::error::{Error, Result};
use crate::schema::model::ForeignKey;
use chrono::Utc;
use std::collections::BTreeSet;
use std::fs;

/// Maximum slug length in generated filenames.
const SLUG_CAP: usize = 48;

/// One generated migration artifact.
#[derive(Debug, Clone)]
pub struct Migration {
    pub number: String,
    pub filename: String,
    pub up_sql: String,
    pub down_sql: String,
    /// True when any forward change was classified destructive.
    pub destructive: bool,
}

impl Migration {
    /// The full file content, sentinel markers included.
    pub fn content(&self) -> String {
        let mut text = String::new();
        text.push_str("-- +goose Up\n-- +goose StatementBegin\n");
        if !self.up_sql.is_empty() {
            text.push_str(&self.up_sql);
            text.push('\n');
        }
        text.push_str("-- +goose StatementEnd\n-- +goose Down\n-- +goose StatementBegin\n");
        if !self.down_sql.is_empty() {
            text.push_str(&self.down_sql);
            text.push('\n');
        }
        text.push_str("-- +goose StatementEnd\n");
        text
    }
}

/// Assembles and writes migration files.
pub struct MigrationWriter<'a> {
    config: &'a Config,
    provider: Box<dyn SqlDialect>,
    policy: DestructivePolicy,
    confirm: Option<Box<dyn FnMut(&str) -> bool + 'a>>,
}

impl<'a> MigrationWriter<'a> {
    pub fn new(config: &'a Config) -> Self {
        let provider = config.dialect.provider(EmitOptions {
            quote_identifiers: config.quote_identifiers,
            default_schema: config.default_schema.clone(),
        });
        MigrationWriter {
            config,
            provider,
            policy: DestructivePolicy::new(config.destructive_operations.iter().copied(), config.silent),
            confirm: None,
        }
    }

    /// Installs the destructive-statement confirmation hook, consulted for
    /// each destructive change when silent mode is off.
    pub fn with_confirm(mut self, confirm: impl FnMut(&str) -> bool + 'a) -> Self {
        self.confirm = Some(Box::new(confirm));
        self
    }

    /// Renders the migration without touching the filesystem beyond the
    /// numbering scan. Used directly by dry runs.
    pub fn render(&mut self, changes: &[Change], old: Option<&Analysis>, new: &Analysis, name: Option<&str>) -> Result<Migration> {
        let number = numbering::next_number(
            &self.config.migrations_dir,
            self.config.file_prefix,
            &self.config.timestamp_format,
            Utc::now(),
        )?;
        let slug = match name {
            Some(name) => sanitize_slug(name),
            None => derive_slug(changes),
        };
        let filename = format!("{}_{}.sql", number, slug);

        let added_tables: BTreeSet<&str> = changes
            .iter()
            .filter_map(|c| match c {
                Change::TableAdded(table) => Some(table.as_str()),
                _ => None,
            })
            .collect();
        let added_fields: BTreeSet<(&str, &str)> = changes
            .iter()
            .filter_map(|c| match c {
                Change::FieldAdded { table, field } => Some((table.as_str(), field.as_str())),
                _ => None,
            })
            .collect();

        // Deferred constraints that this migration introduces; everything
        // else was already applied by an earlier migration.
        let emitted_deferred: Vec<&DeferredConstraint> = new
            .deferred
            .iter()
            .filter(|d| added_tables.contains(d.table.as_str()) || added_fields.contains(&(d.table.as_str(), d.field.as_str())))
            .collect();

        let mut up: Vec<String> = Vec::new();
        let mut destructive = false;

        for change in changes {
            let statements = self.forward_statements(change, old, new);
            match self.policy.resolve(change, self.confirm.as_mut().map(|f| f.as_mut() as &mut _)) {
                Some(Verdict::Annotate) => {
                    destructive = true;
                    up.push(format!("{}{}", self.config.review_prefix, change.describe()));
                    for ddl in statements {
                        self.push_ddl(ddl, &mut up);
                    }
                }
                Some(Verdict::Reject) => {
                    destructive = true;
                    up.push(format!("{}{}", self.config.rejection_prefix, change.describe()));
                }
                None => {
                    for ddl in statements {
                        self.push_ddl(ddl, &mut up);
                    }
                }
            }
        }

        for constraint in &emitted_deferred {
            self.push_ddl(self.provider.add_foreign_key(constraint, &new.schema), &mut up);
        }

        let down = if self.config.include_down {
            self.render_down(changes, old, new, &emitted_deferred)
        } else {
            Vec::new()
        };

        Ok(Migration {
            number,
            filename,
            up_sql: up.join("\n"),
            down_sql: down.join("\n"),
            destructive,
        })
    }

    /// Renders the migration and writes it into the migrations directory.
    ///
    /// An existing file with the same name is never overwritten.
    pub fn write(&mut self, changes: &[Change], old: Option<&Analysis>, new: &Analysis, name: Option<&str>) -> Result<Migration> {
        let migration = self.render(changes, old, new, name)?;

        fs::create_dir_all(&self.config.migrations_dir)?;
        let path = self.config.migrations_dir.join(&migration.filename);
        if path.exists() {
            return Err(Error::MigrationExists(migration.filename.clone()));
        }
        fs::write(&path, migration.content())?;

        Ok(migration)
    }

    /// Forward DDL for one change.
    fn forward_statements(&self, change: &Change, old: Option<&Analysis>, new: &Analysis) -> Vec<Ddl> {
        let provider = self.provider.as_ref();
        let mut statements = Vec::new();

        match change {
            Change::TableAdded(name) => {
                if let Some(table) = new.schema.table(name) {
                    statements.push(provider.create_table(table, &new.schema, &new.deferred));
                    for index in &table.indexes {
                        statements.push(provider.create_index(name, index));
                    }
                }
            }
            Change::TableRemoved(name) => {
                statements.push(provider.drop_table(name));
            }
            Change::FieldAdded { table, field } => {
                if let Some(new_field) = new.schema.table(table).and_then(|t| t.field(field)) {
                    statements.push(provider.add_column(table, new_field, &new.schema));
                    if let Some(fk) = &new_field.foreign_key {
                        if !new.is_deferred(table, field) {
                            statements.push(provider.add_foreign_key(&constraint_for(table, field, fk), &new.schema));
                        }
                    }
                }
            }
            Change::FieldRemoved { table, field } => {
                let old_field = old.and_then(|a| a.schema.table(table)).and_then(|t| t.field(field));
                if let Some(fk) = old_field.and_then(|f| f.foreign_key.as_ref()) {
                    // The constraint has to go before its column does.
                    statements.push(provider.drop_foreign_key(&constraint_for(table, field, fk)));
                }
                statements.push(provider.drop_column(table, field));
            }
            Change::FieldModified { table, field } => {
                let old_field = old.and_then(|a| a.schema.table(table)).and_then(|t| t.field(field));
                let new_field = new.schema.table(table).and_then(|t| t.field(field));
                if let (Some(before), Some(after)) = (old_field, new_field) {
                    if before.foreign_key != after.foreign_key {
                        if let Some(fk) = &before.foreign_key {
                            statements.push(provider.drop_foreign_key(&constraint_for(table, field, fk)));
                        }
                    }
                    statements.extend(provider.alter_column(table, before, after, &new.schema));
                    if before.foreign_key != after.foreign_key {
                        if let Some(fk) = &after.foreign_key {
                            statements.push(provider.add_foreign_key(&constraint_for(table, field, fk), &new.schema));
                        }
                    }
                }
            }
            Change::IndexAdded { table, index } => {
                if let Some(definition) = new.schema.table(table).and_then(|t| t.index(index)) {
                    statements.push(provider.create_index(table, definition));
                }
            }
            Change::IndexRemoved { table, index } => {
                statements.push(provider.drop_index(table, index));
            }
        }

        statements
    }

    /// Reverse DDL for one change, reconstructed from the old snapshot.
    fn reverse_statements(&self, change: &Change, old: Option<&Analysis>, new: &Analysis) -> Vec<Ddl> {
        let provider = self.provider.as_ref();
        let mut statements = Vec::new();

        match change {
            Change::TableAdded(name) => {
                statements.push(provider.drop_table(name));
            }
            Change::TableRemoved(name) => {
                if let Some(old) = old {
                    if let Some(table) = old.schema.table(name) {
                        statements.push(provider.create_table(table, &old.schema, &old.deferred));
                        for index in &table.indexes {
                            statements.push(provider.create_index(name, index));
                        }
                    }
                }
            }
            Change::FieldAdded { table, field } => {
                let new_field = new.schema.table(table).and_then(|t| t.field(field));
                if let Some(fk) = new_field.and_then(|f| f.foreign_key.as_ref()) {
                    if !new.is_deferred(table, field) {
                        statements.push(provider.drop_foreign_key(&constraint_for(table, field, fk)));
                    }
                }
                statements.push(provider.drop_column(table, field));
            }
            Change::FieldRemoved { table, field } => {
                if let Some(old) = old {
                    if let Some(old_field) = old.schema.table(table).and_then(|t| t.field(field)) {
                        statements.push(provider.add_column(table, old_field, &old.schema));
                        if let Some(fk) = &old_field.foreign_key {
                            if !old.is_deferred(table, field) {
                                statements.push(provider.add_foreign_key(&constraint_for(table, field, fk), &old.schema));
                            }
                        }
                    }
                }
            }
            Change::FieldModified { table, field } => {
                let old_field = old.and_then(|a| a.schema.table(table)).and_then(|t| t.field(field));
                let new_field = new.schema.table(table).and_then(|t| t.field(field));
                if let (Some(before), Some(after), Some(old)) = (old_field, new_field, old) {
                    if before.foreign_key != after.foreign_key {
                        if let Some(fk) = &after.foreign_key {
                            statements.push(provider.drop_foreign_key(&constraint_for(table, field, fk)));
                        }
                    }
                    statements.extend(provider.alter_column(table, after, before, &old.schema));
                    if before.foreign_key != after.foreign_key {
                        if let Some(fk) = &before.foreign_key {
                            statements.push(provider.add_foreign_key(&constraint_for(table, field, fk), &old.schema));
                        }
                    }
                }
            }
            Change::IndexAdded { table, index } => {
                statements.push(provider.drop_index(table, index));
            }
            Change::IndexRemoved { table, index } => {
                if let Some(old) = old {
                    if let Some(definition) = old.schema.table(table).and_then(|t| t.index(index)) {
                        statements.push(provider.create_index(table, definition));
                    }
                }
            }
        }

        statements
    }

    /// The down section: inverses in reverse order, each statement behind a
    /// review comment. Deferred constraints added by the up section are
    /// dropped first so cyclically linked tables can be dropped at all;
    /// deferred constraints of recreated tables are restored last.
    fn render_down(&self, changes: &[Change], old: Option<&Analysis>, new: &Analysis, emitted_deferred: &[&DeferredConstraint]) -> Vec<String> {
        let mut down = Vec::new();

        for constraint in emitted_deferred.iter().rev() {
            down.push(format!(
                "{}reverts deferred foreign key {}.{}",
                self.config.review_prefix, constraint.table, constraint.field
            ));
            self.push_ddl(self.provider.drop_foreign_key(constraint), &mut down);
        }

        let mut recreated: BTreeSet<&str> = BTreeSet::new();

        for change in changes.iter().rev() {
            let statements = self.reverse_statements(change, old, new);
            for ddl in statements {
                down.push(format!("{}reverts {}", self.config.review_prefix, change.describe()));
                self.push_ddl(ddl, &mut down);
            }
            if let Change::TableRemoved(name) = change {
                recreated.insert(name.as_str());
            }
        }

        if let Some(old) = old {
            for constraint in old.deferred.iter().filter(|d| recreated.contains(d.table.as_str())) {
                down.push(format!(
                    "{}restores deferred foreign key {}.{}",
                    self.config.review_prefix, constraint.table, constraint.field
                ));
                self.push_ddl(self.provider.add_foreign_key(constraint, &old.schema), &mut down);
            }
        }

        down
    }

    /// Renders one DDL result into output lines. Unsupported operations
    /// become commented placeholders naming the manual action; generation
    /// never fails on them.
    fn push_ddl(&self, ddl: Ddl, lines: &mut Vec<String>) {
        match ddl {
            Ddl::Stmt(sql) => lines.push(sql),
            Ddl::Unsupported { reason, action } => {
                lines.push(format!("-- [{}] {}; manual action required: {}", self.provider.dialect(), reason, action));
            }
        }
    }
}

fn constraint_for(table: &str, field: &str, fk: &ForeignKey) -> DeferredConstraint {
    DeferredConstraint {
        table: table.to_string(),
        field: field.to_string(),
        references: fk.table.clone(),
        on_delete: fk.on_delete,
    }
}

/// Derives a filename slug from the change list when the caller gave none.
fn derive_slug(changes: &[Change]) -> String {
    let kinds: BTreeSet<ChangeKind> = changes.iter().map(|c| c.kind()).collect();
    let mut tables: Vec<&str> = Vec::new();
    for change in changes {
        if !tables.contains(&change.table()) {
            tables.push(change.table());
        }
    }

    let slug = if kinds == BTreeSet::from([ChangeKind::TableAdded]) {
        match tables.as_slice() {
            [table] => format!("create_{}", table),
            [a, b] => format!("create_{}_and_{}", a, b),
            _ => format!("create_{}_tables", tables.len()),
        }
    } else if kinds == BTreeSet::from([ChangeKind::TableRemoved]) {
        match tables.as_slice() {
            [table] => format!("drop_{}", table),
            [a, b] => format!("drop_{}_and_{}", a, b),
            _ => format!("drop_{}_tables", tables.len()),
        }
    } else if let [Change::FieldAdded { table, field }] = changes {
        format!("add_{}_to_{}", field, table)
    } else if let [Change::FieldRemoved { table, field }] = changes {
        format!("remove_{}_from_{}", field, table)
    } else if kinds == BTreeSet::from([ChangeKind::FieldAdded]) && tables.len() == 1 {
        format!("add_columns_to_{}", tables[0])
    } else if tables.len() == 1 {
        format!("update_{}", tables[0])
    } else {
        format!("migrate_{}_tables", tables.len())
    };

    sanitize_slug(&slug)
}

/// Restricts a slug to `[a-z0-9_]`, collapsing everything else.
fn sanitize_slug(name: &str) -> String {
    let mut slug = String::new();
    let mut last_was_underscore = false;

    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            slug.push(ch);
            last_was_underscore = false;
        } else if !last_was_underscore && !slug.is_empty() {
            slug.push('_');
            last_was_underscore = true;
        }
    }

    while slug.ends_with('_') {
        slug.pop();
    }
    slug.truncate(SLUG_CAP);
    while slug.ends_with('_') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("migration");
    }
    slug
}
