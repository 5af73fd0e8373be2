//! Schema document loading and transitive include resolution.
//!
//! A document is identified by an `(origin, path)` pair: the origin names a
//! dependency module (empty for the local project) and the path is relative
//! to it. How origins map to actual directories is the business of the
//! [`DocumentSource`] implementation; the loader itself only parses YAML and
//! walks `include` lists.
//!
//! ## Resolution Rules
//!
//! - Includes resolve depth-first in declaration order, root document first.
//! - A document visited twice is silently elided; including the same schema
//!   through two paths is well-formed and idempotent.
//! - A cycle through the current resolution stack is reported as a warning
//!   and the closing edge is elided; loading always terminates.
//! - Unknown top-level keys produce a warning and are ignored, so documents
//!   written for a newer tool still load.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mkmig::schema::loader::{FsDocumentSource, SchemaLoader};
//!
//! let source = FsDocumentSource::new(".");
//! let mut loader = SchemaLoader::new(&source);
//! let schemas = loader.load("", "schema.yaml")?;
//! # anyhow::Ok(())
//! ```

use crate::schema::error::{Error, Result};
use crate::schema::model::Schema;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::PathBuf;

/// The top-level keys a schema document may carry.
const KNOWN_KEYS: &[&str] = &["database", "defaults", "include", "tables"];

/// Provides document content for `(origin, path)` pairs.
///
/// The discovery of modules is outside the pipeline; implementations adapt
/// whatever mechanism locates dependency schemas. Unresolvable targets must
/// return [`Error::Include`].
pub trait DocumentSource {
    fn fetch(&self, origin: &str, path: &str) -> Result<String>;
}

/// Filesystem-backed document source.
///
/// Local-project documents (empty origin) resolve against the project root;
/// module origins resolve against directories registered up front.
pub struct FsDocumentSource {
    root: PathBuf,
    origins: BTreeMap<String, PathBuf>,
}

impl FsDocumentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsDocumentSource {
            root: root.into(),
            origins: BTreeMap::new(),
        }
    }

    /// Registers a directory for a module origin.
    pub fn with_origin(mut self, origin: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.origins.insert(origin.into(), dir.into());
        self
    }
}

impl DocumentSource for FsDocumentSource {
    fn fetch(&self, origin: &str, path: &str) -> Result<String> {
        let base = if origin.is_empty() {
            Some(&self.root)
        } else {
            self.origins.get(origin)
        };
        let full = match base {
            Some(dir) => dir.join(path),
            None => {
                return Err(Error::Include {
                    location: location(origin, path),
                    referenced_from: "unregistered origin".to_string(),
                })
            }
        };
        fs::read_to_string(&full).map_err(|_| Error::Include {
            location: full.display().to_string(),
            referenced_from: location(origin, path),
        })
    }
}

/// In-memory document source, used by tests and embedding callers.
#[derive(Default)]
pub struct MemoryDocumentSource {
    documents: BTreeMap<(String, String), String>,
}

impl MemoryDocumentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, origin: impl Into<String>, path: impl Into<String>, content: impl Into<String>) {
        self.documents.insert((origin.into(), path.into()), content.into());
    }
}

impl DocumentSource for MemoryDocumentSource {
    fn fetch(&self, origin: &str, path: &str) -> Result<String> {
        self.documents
            .get(&(origin.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| Error::Include {
                location: location(origin, path),
                referenced_from: "document source".to_string(),
            })
    }
}

/// Recursive schema loader with include tracking.
///
/// One loader instance handles one root document and everything it pulls
/// in. The visited set persists across the whole walk; the stack tracks the
/// current resolution chain for cycle detection.
pub struct SchemaLoader<'a> {
    source: &'a dyn DocumentSource,
    visited: HashSet<(String, String)>,
    stack: Vec<(String, String)>,
    warnings: Vec<String>,
}

impl<'a> SchemaLoader<'a> {
    pub fn new(source: &'a dyn DocumentSource) -> Self {
        SchemaLoader {
            source,
            visited: HashSet::new(),
            stack: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Loads a document and everything it includes, transitively.
    ///
    /// Returns the loaded schemas in deterministic order: the requested
    /// document first, then its includes depth-first in declaration order.
    /// Each distinct `(origin, path)` appears at most once.
    pub fn load(&mut self, origin: &str, path: &str) -> Result<Vec<Schema>> {
        let mut schemas = Vec::new();
        self.load_into(origin, path, "project root", &mut schemas)?;
        Ok(schemas)
    }

    /// Warnings accumulated while loading, in emission order.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    fn load_into(&mut self, origin: &str, path: &str, referenced_from: &str, schemas: &mut Vec<Schema>) -> Result<()> {
        let key = (origin.to_string(), path.to_string());

        // A cycle through the current stack: warn and elide the closing edge.
        if self.stack.contains(&key) {
            let mut chain: Vec<String> = self.stack.iter().map(|(o, p)| location(o, p)).collect();
            chain.push(location(origin, path));
            self.warnings.push(format!("Include cycle elided: {}", chain.join(" -> ")));
            return Ok(());
        }

        // Already loaded through another path: idempotent include.
        if !self.visited.insert(key.clone()) {
            return Ok(());
        }

        let content = match self.source.fetch(origin, path) {
            Ok(content) => content,
            Err(Error::Include { location, .. }) => {
                return Err(Error::Include {
                    location,
                    referenced_from: referenced_from.to_string(),
                })
            }
            Err(e) => return Err(e),
        };

        let mut schema = self.parse(origin, path, &content)?;
        schema.origin = location(origin, path);
        let includes = schema.include.clone();
        schemas.push(schema);

        self.stack.push(key);
        for include in &includes {
            self.load_into(&include.origin, &include.path, &location(origin, path), schemas)?;
        }
        self.stack.pop();

        Ok(())
    }

    /// Parses one document, warning on unknown top-level keys.
    fn parse(&mut self, origin: &str, path: &str, content: &str) -> Result<Schema> {
        let doc_location = location(origin, path);
        let value: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| Error::Parse {
            location: doc_location.clone(),
            message: e.to_string(),
        })?;

        if let serde_yaml::Value::Mapping(mapping) = &value {
            for key in mapping.keys() {
                if let serde_yaml::Value::String(name) = key {
                    if !KNOWN_KEYS.contains(&name.as_str()) {
                        self.warnings.push(format!("{}: unknown top-level key '{}' ignored", doc_location, name));
                    }
                }
            }
        }

        serde_yaml::from_value(value).map_err(|e| Error::Parse {
            location: doc_location,
            message: e.to_string(),
        })
    }
}

/// Human-readable `(origin, path)` identity.
fn location(origin: &str, path: &str) -> String {
    if origin.is_empty() {
        path.to_string()
    } else {
        format!("{}:{}", origin, path)
    }
}
