//! Canonical in-memory representation of a declarative database schema.
//!
//! Every stage of the generation pipeline works on the types in this module:
//! the loader parses YAML documents into [`Schema`] values, the merger folds
//! any number of them into one, and the diff engine compares two canonical
//! schemas field by field. Schemas are treated as immutable once validated;
//! later stages only take read-only views.
//!
//! ## Document Shape
//!
//! ```yaml
//! database:
//!   name: myapp
//!   version: "1.0"
//! defaults:
//!   postgresql:
//!     now: CURRENT_TIMESTAMP
//! include:
//!   - origin: github.com/acme/auth
//!     path: schema/schema.yaml
//! tables:
//!   - name: users
//!     fields:
//!       - name: id
//!         type: uuid
//!         primary_key: true
//!         default: new_uuid
//!     indexes:
//!       - name: idx_users_email
//!         fields: [email]
//!         unique: true
//! ```
//!
//! ## Canonical Order
//!
//! Serialization and emission never depend on author or map order. After
//! [`Schema::canonicalize`]: tables sort by name, fields sort with primary
//! keys first then by name, indexes sort by name, and the defaults table is
//! a sorted map throughout. Equivalent schemas therefore serialize to
//! byte-identical documents.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Per-dialect table of symbolic default values.
///
/// Maps a dialect key (e.g. `postgresql`) to a map from symbolic name
/// (e.g. `now`, `new_uuid`) to the dialect-native SQL fragment emitted in
/// `DEFAULT` clauses.
pub type DefaultsTable = BTreeMap<String, BTreeMap<String, String>>;

/// The symbolic default names recognized in a field's `default` attribute.
///
/// This vocabulary is closed: any other string in a `default` position is
/// treated as a literal value and emitted per the dialect's literal rules.
pub const SYMBOLIC_DEFAULTS: &[&str] = &[
    "now",
    "new_uuid",
    "blank",
    "zero",
    "true",
    "false",
    "null",
    "today",
    "current_time",
    "array",
    "object",
];

/// Root document describing one database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Logical database identity and version strings.
    #[serde(default)]
    pub database: DatabaseInfo,

    /// Per-dialect symbolic default table. Unioned across merged documents.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: DefaultsTable,

    /// References to other schema documents merged into this one.
    ///
    /// Includes are resolved transitively by the loader and cleared by the
    /// merger; a merged schema never carries include entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<Include>,

    /// The tables of this schema. Unique by name after merge.
    #[serde(default)]
    pub tables: Vec<Table>,

    /// Where this document came from, for conflict reporting.
    ///
    /// Set by the loader, never serialized. Empty for the root project.
    #[serde(skip)]
    pub origin: String,
}

impl Schema {
    /// Looks up a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Looks up a table by name for mutation.
    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.name == name)
    }

    /// Resolves a symbolic default fragment for one dialect key.
    pub fn default_fragment(&self, dialect_key: &str, symbol: &str) -> Option<&str> {
        self.defaults.get(dialect_key).and_then(|m| m.get(symbol)).map(String::as_str)
    }

    /// Sorts tables, fields and indexes into canonical order.
    ///
    /// Field order inside a table is presentation-only (the diff engine
    /// compares by name), but a fixed order keeps snapshots byte-stable
    /// across merges.
    pub fn canonicalize(&mut self) {
        self.tables.sort_by(|a, b| a.name.cmp(&b.name));
        for table in &mut self.tables {
            table.canonicalize();
        }
    }
}

/// Identity block of a schema document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    /// Logical name of the database this schema describes.
    #[serde(default)]
    pub name: String,

    /// Schema version string. Opaque to the generator.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// Version of the tool that wrote the document.
    ///
    /// Stamped into snapshots on save; a snapshot written by a newer tool
    /// than the running binary is refused.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tool_version: String,
}

/// Reference to another schema document by `(origin, relative path)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Include {
    /// Module origin the path is resolved against. Empty for the local project.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub origin: String,

    /// Path of the included document relative to its origin.
    pub path: String,
}

/// One database table: an ordered list of fields plus its indexes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,

    #[serde(default)]
    pub fields: Vec<Field>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<Index>,
}

impl Table {
    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Looks up an index by name.
    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Returns the primary-key field, if the table declares one.
    pub fn primary_key(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.primary_key)
    }

    /// Sorts fields (primary keys first, then by name) and indexes (by name).
    pub fn canonicalize(&mut self) {
        self.fields.sort_by(|a, b| b.primary_key.cmp(&a.primary_key).then(a.name.cmp(&b.name)));
        self.indexes.sort_by(|a, b| a.name.cmp(&b.name));
    }
}

/// One column definition, or a relationship pseudo-field.
///
/// Fields of type `foreign_key` become columns whose SQL type is inferred
/// from the referenced table's primary key. Fields of type `many_to_many`
/// never become columns; the dependency analyzer consumes them and
/// synthesizes a junction table instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Maximum length for `varchar`/`text` columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,

    /// Total digits for `decimal` columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,

    /// Fractional digits for `decimal` columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub primary_key: bool,

    /// Tri-state nullability: unspecified defaults to nullable, except for
    /// primary keys which are always NOT NULL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    /// Default value: either a literal, or one of [`SYMBOLIC_DEFAULTS`]
    /// resolved through the schema's per-dialect defaults table.
    ///
    /// YAML scalars of any kind are accepted here (`default: 0` and
    /// `default: "0"` are the same default).
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de_scalar_string")]
    pub default: Option<String>,

    /// Populate with the current timestamp on row creation.
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_create: bool,

    /// Refresh with the current timestamp on row update.
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_update: bool,

    /// Present when `type = foreign_key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKey>,

    /// Present when `type = many_to_many`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub many_to_many: Option<ManyToMany>,
}

impl Field {
    /// Creates a plain field of the given type with all attributes unset.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Field {
            name: name.into(),
            field_type,
            ..Field::default()
        }
    }

    /// Creates a NOT NULL foreign-key field referencing `table`.
    pub fn referencing(name: impl Into<String>, table: impl Into<String>, on_delete: OnDelete) -> Self {
        Field {
            name: name.into(),
            field_type: FieldType::ForeignKey,
            nullable: Some(false),
            foreign_key: Some(ForeignKey {
                table: table.into(),
                on_delete,
            }),
            ..Field::default()
        }
    }

    /// Effective nullability after applying the primary-key rule.
    pub fn is_nullable(&self) -> bool {
        if self.primary_key {
            return false;
        }
        self.nullable.unwrap_or(true)
    }

    /// Compares the semantic column definition of two fields.
    ///
    /// Name is excluded (the diff engine matches fields by name first);
    /// everything that changes emitted DDL participates. Unspecified and
    /// explicit `nullable: true` compare equal, so a purely cosmetic
    /// respelling never produces a change.
    pub fn definition_eq(&self, other: &Field) -> bool {
        self.field_type == other.field_type
            && self.length == other.length
            && self.precision == other.precision
            && self.scale == other.scale
            && self.primary_key == other.primary_key
            && self.is_nullable() == other.is_nullable()
            && self.default == other.default
            && self.auto_create == other.auto_create
            && self.auto_update == other.auto_update
            && self.foreign_key == other.foreign_key
            && self.many_to_many == other.many_to_many
    }
}

/// The closed set of database-agnostic field types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[default]
    Varchar,
    Text,
    Integer,
    Bigint,
    Serial,
    Float,
    Decimal,
    Boolean,
    Date,
    Time,
    Timestamp,
    Uuid,
    Jsonb,
    ForeignKey,
    ManyToMany,
}

impl FieldType {
    /// The document spelling of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Varchar => "varchar",
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Bigint => "bigint",
            FieldType::Serial => "serial",
            FieldType::Float => "float",
            FieldType::Decimal => "decimal",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Timestamp => "timestamp",
            FieldType::Uuid => "uuid",
            FieldType::Jsonb => "jsonb",
            FieldType::ForeignKey => "foreign_key",
            FieldType::ManyToMany => "many_to_many",
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Foreign-key descriptor for a `foreign_key` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// The referenced table. Must exist and carry a unique primary key.
    pub table: String,

    #[serde(default)]
    pub on_delete: OnDelete,
}

/// Referential action applied when the referenced row is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnDelete {
    Cascade,
    Restrict,
    SetNull,
    Protect,
    #[default]
    NoAction,
}

impl OnDelete {
    /// Strictness rank used for merge conflict resolution.
    ///
    /// RESTRICT/PROTECT > NO_ACTION > SET_NULL > CASCADE; the stricter
    /// action wins when two documents disagree.
    pub fn strictness(&self) -> u8 {
        match self {
            OnDelete::Cascade => 0,
            OnDelete::SetNull => 1,
            OnDelete::NoAction => 2,
            OnDelete::Restrict | OnDelete::Protect => 3,
        }
    }

    /// The SQL referential action. PROTECT has no SQL spelling of its own
    /// and maps to RESTRICT.
    pub fn sql(&self) -> &'static str {
        match self {
            OnDelete::Cascade => "CASCADE",
            OnDelete::Restrict | OnDelete::Protect => "RESTRICT",
            OnDelete::SetNull => "SET NULL",
            OnDelete::NoAction => "NO ACTION",
        }
    }
}

impl Display for OnDelete {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            OnDelete::Cascade => "CASCADE",
            OnDelete::Restrict => "RESTRICT",
            OnDelete::SetNull => "SET_NULL",
            OnDelete::Protect => "PROTECT",
            OnDelete::NoAction => "NO_ACTION",
        };
        f.write_str(text)
    }
}

/// Many-to-many descriptor for a `many_to_many` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManyToMany {
    /// The far side of the relation.
    pub table: String,

    /// Explicit junction-table name; `{near}_{far}` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub junction: Option<String>,
}

/// One index definition: an ordered field list and a uniqueness flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,

    pub fields: Vec<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,
}

impl Index {
    /// Compares the index definition, ignoring the name.
    pub fn definition_eq(&self, other: &Index) -> bool {
        self.fields == other.fields && self.unique == other.unique
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Accepts any YAML scalar in a `default` position and stores it as text.
fn de_scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(serde::de::Error::custom(format!("default value must be a scalar, got {:?}", other))),
    }
}
