//! Structural, referential and dialect-specific schema validation.
//!
//! Validation runs as three passes over the merged schema. Each pass
//! accumulates every finding it can make before the pipeline aborts, so a
//! single run surfaces the complete list for that pass instead of stopping
//! at the first problem. Warnings never block generation; errors do.
//!
//! 1. **Structural** — attribute applicability, internal name uniqueness,
//!    descriptor/type consistency, the primary-key rules.
//! 2. **Referential** — foreign-key and many-to-many targets exist, index
//!    fields exist, symbolic defaults resolve for the target dialect.
//! 3. **Dialect-specific** — size caps and degraded type representations
//!    of the selected dialect.

use crate::dialect::Dialect;
use crate::schema::error::{Error, Result};
use crate::schema::model::{FieldType, Schema, SYMBOLIC_DEFAULTS};
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

/// Severity of one validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// One validation finding with its schema location.
#[derive(Debug, Clone)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
    pub location: String,
}

impl Finding {
    fn error(location: impl Into<String>, message: impl Into<String>) -> Self {
        Finding {
            severity: Severity::Error,
            message: message.into(),
            location: location.into(),
        }
    }

    fn warning(location: impl Into<String>, message: impl Into<String>) -> Self {
        Finding {
            severity: Severity::Warning,
            message: message.into(),
            location: location.into(),
        }
    }
}

impl Display for Finding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.location, self.message)
    }
}

/// Validates a merged schema against the selected dialect.
///
/// Returns the accumulated warnings on success. When a pass produces any
/// error, every finding collected up to the end of that pass is returned
/// in [`Error::Validation`] and later passes do not run.
pub fn validate(schema: &Schema, dialect: Dialect) -> Result<Vec<Finding>> {
    let mut findings = Vec::new();

    structural(schema, &mut findings);
    check_pass(&findings)?;

    referential(schema, dialect, &mut findings);
    check_pass(&findings)?;

    dialect_specific(schema, dialect, &mut findings);
    check_pass(&findings)?;

    Ok(findings)
}

fn check_pass(findings: &[Finding]) -> Result<()> {
    if findings.iter().any(|f| f.severity == Severity::Error) {
        return Err(Error::Validation(findings.to_vec()));
    }
    Ok(())
}

fn structural(schema: &Schema, findings: &mut Vec<Finding>) {
    let mut table_names = BTreeSet::new();

    for table in &schema.tables {
        if table.name.is_empty() {
            findings.push(Finding::error("schema", "table without a name"));
            continue;
        }
        if !table_names.insert(table.name.as_str()) {
            findings.push(Finding::error(&table.name, "duplicate table name"));
        }
        if table.fields.is_empty() {
            findings.push(Finding::warning(&table.name, "table has no fields"));
        }

        let mut field_names = BTreeSet::new();
        let mut primary_keys = 0;

        for field in &table.fields {
            let location = format!("{}.{}", table.name, field.name);

            if field.name.is_empty() {
                findings.push(Finding::error(&table.name, "field without a name"));
                continue;
            }
            if !field_names.insert(field.name.as_str()) {
                findings.push(Finding::error(&location, "duplicate field name"));
            }
            if field.primary_key {
                primary_keys += 1;
                if field.nullable == Some(true) {
                    findings.push(Finding::error(&location, "primary key fields cannot be nullable"));
                }
            }

            match field.field_type {
                FieldType::Varchar => {
                    if field.length.is_none() {
                        findings.push(Finding::warning(&location, "varchar without length, dialect default applies"));
                    }
                }
                FieldType::Text => {}
                _ => {
                    if field.length.is_some() {
                        findings.push(Finding::error(&location, "length is only valid on varchar and text fields"));
                    }
                }
            }

            if field.field_type == FieldType::Decimal {
                if field.precision.is_none() {
                    findings.push(Finding::warning(&location, "decimal without precision, dialect default applies"));
                }
                if let (Some(precision), Some(scale)) = (field.precision, field.scale) {
                    if scale > precision {
                        findings.push(Finding::error(&location, "decimal scale exceeds precision"));
                    }
                }
            } else if field.precision.is_some() || field.scale.is_some() {
                findings.push(Finding::error(&location, "precision/scale are only valid on decimal fields"));
            }

            if (field.auto_create || field.auto_update) && field.field_type != FieldType::Timestamp {
                findings.push(Finding::error(&location, "auto_create/auto_update are only valid on timestamp fields"));
            }

            match (field.field_type == FieldType::ForeignKey, field.foreign_key.is_some()) {
                (true, false) => findings.push(Finding::error(&location, "foreign_key field without a foreign_key descriptor")),
                (false, true) => findings.push(Finding::error(&location, "foreign_key descriptor on a non-foreign_key field")),
                _ => {}
            }

            match (field.field_type == FieldType::ManyToMany, field.many_to_many.is_some()) {
                (true, false) => findings.push(Finding::error(&location, "many_to_many field without a many_to_many descriptor")),
                (false, true) => findings.push(Finding::error(&location, "many_to_many descriptor on a non-many_to_many field")),
                _ => {}
            }

            if field.field_type == FieldType::ManyToMany && field.primary_key {
                findings.push(Finding::error(&location, "many_to_many fields cannot be primary keys"));
            }
        }

        if primary_keys > 1 {
            findings.push(Finding::error(&table.name, "more than one primary key field"));
        }

        let mut index_names = BTreeSet::new();
        for index in &table.indexes {
            let location = format!("{}.{}", table.name, index.name);
            if !index_names.insert(index.name.as_str()) {
                findings.push(Finding::error(&location, "duplicate index name"));
            }
            if index.fields.is_empty() {
                findings.push(Finding::error(&location, "index without fields"));
            }
        }
    }
}

fn referential(schema: &Schema, dialect: Dialect, findings: &mut Vec<Finding>) {
    for table in &schema.tables {
        for field in &table.fields {
            let location = format!("{}.{}", table.name, field.name);

            if let Some(fk) = &field.foreign_key {
                match schema.table(&fk.table) {
                    None => findings.push(Finding::error(&location, format!("foreign key references unknown table '{}'", fk.table))),
                    Some(target) => {
                        if target.primary_key().is_none() {
                            findings.push(Finding::error(
                                &location,
                                format!("foreign key target '{}' has no primary key", fk.table),
                            ));
                        }
                    }
                }
            }

            if let Some(m2m) = &field.many_to_many {
                if schema.table(&m2m.table).is_none() {
                    findings.push(Finding::error(&location, format!("many_to_many references unknown table '{}'", m2m.table)));
                }
            }

            if let Some(default) = &field.default {
                let symbolic = SYMBOLIC_DEFAULTS.contains(&default.as_str());
                let resolvable = schema.default_fragment(dialect.key(), default).is_some();
                if symbolic && !resolvable && !is_literal(default) {
                    findings.push(Finding::error(
                        &location,
                        format!("symbolic default '{}' has no entry for dialect '{}'", default, dialect.key()),
                    ));
                }
            }
        }

        for index in &table.indexes {
            let location = format!("{}.{}", table.name, index.name);
            for field_name in &index.fields {
                match table.field(field_name) {
                    None => findings.push(Finding::error(&location, format!("index references unknown field '{}'", field_name))),
                    Some(field) if field.field_type == FieldType::ManyToMany => {
                        findings.push(Finding::error(&location, format!("index references many_to_many field '{}'", field_name)));
                    }
                    Some(_) => {}
                }
            }
        }
    }
}

fn dialect_specific(schema: &Schema, dialect: Dialect, findings: &mut Vec<Finding>) {
    for table in &schema.tables {
        for field in &table.fields {
            let location = format!("{}.{}", table.name, field.name);

            if field.field_type == FieldType::Varchar {
                if let (Some(length), Some(cap)) = (field.length, dialect.max_varchar_length()) {
                    if length > cap {
                        findings.push(Finding::error(
                            &location,
                            format!("varchar length {} exceeds the {} maximum of {}", length, dialect, cap),
                        ));
                    }
                }
            }

            if field.field_type == FieldType::Decimal {
                if let (Some(precision), Some(cap)) = (field.precision, dialect.max_decimal_precision()) {
                    if precision > cap {
                        findings.push(Finding::error(
                            &location,
                            format!("decimal precision {} exceeds the {} maximum of {}", precision, dialect, cap),
                        ));
                    }
                }
            }

            if field.field_type == FieldType::Jsonb && !dialect.native_json() {
                findings.push(Finding::warning(
                    &location,
                    format!("{} has no native JSON type; the column degrades to {}", dialect, dialect.json_fallback()),
                ));
            }

            if field.field_type == FieldType::Uuid && !dialect.native_uuid() {
                findings.push(Finding::warning(
                    &location,
                    format!("{} has no native UUID type; the column degrades to {}", dialect, dialect.uuid_fallback()),
                ));
            }
        }
    }
}

/// True when the value is emitted literally without a defaults-table entry.
fn is_literal(value: &str) -> bool {
    value == "true" || value == "false" || value.parse::<f64>().is_ok()
}
