//! Persistence of the last-generated schema snapshot.
//!
//! The snapshot is the canonical serialization of the schema for which a
//! migration was last emitted; the next run diffs against it. It lives in
//! the migrations directory under a dot-prefixed filename so the migration
//! runner never picks it up.
//!
//! Two guarantees matter here:
//!
//! - **Canonical bytes.** Equivalent schemas serialize to byte-identical
//!   documents (sorted tables and maps, fixed field order), so the file
//!   only changes when the schema does.
//! - **Atomic replacement.** The snapshot is written to a sibling temp file
//!   and renamed over the old one. A crash between migration emission and
//!   snapshot update leaves the previous snapshot intact; the operator
//!   keeps or deletes the orphaned migration and reruns.

use crate::schema::error::{Error, Result};
use crate::schema::model::Schema;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Loads and persists the schema snapshot in a migrations directory.
pub struct SnapshotStore {
    dir: PathBuf,
    filename: String,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        SnapshotStore {
            dir: dir.into(),
            filename: filename.into(),
        }
    }

    /// Full path of the snapshot file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.filename)
    }

    /// Loads the last snapshot; `None` means this is the first run.
    ///
    /// A snapshot stamped by a newer tool version than the running binary
    /// is refused so the diff never runs against a document written under
    /// rules this binary does not know.
    pub fn load(&self) -> Result<Option<Schema>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let schema: Schema = serde_yaml::from_str(&content).map_err(|e| Error::Parse {
            location: path.display().to_string(),
            message: e.to_string(),
        })?;

        let written_by = &schema.database.tool_version;
        if !written_by.is_empty() && version_triple(written_by) > version_triple(current_version()) {
            return Err(Error::SnapshotStale {
                snapshot: written_by.clone(),
                current: current_version().to_string(),
            });
        }

        Ok(Some(schema))
    }

    /// Persists the canonical form of `schema`, stamped with the running
    /// tool version. Write-to-temp-then-rename; the rename is atomic on
    /// POSIX filesystems.
    pub fn save(&self, schema: &Schema) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let content = Self::serialize(schema)?;
        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(content.as_bytes())?;
        temp.persist(self.path()).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    /// Canonical snapshot text for a schema.
    ///
    /// The clone is canonicalized and stamped before serialization; the
    /// input is left untouched.
    pub fn serialize(schema: &Schema) -> Result<String> {
        let mut canonical = schema.clone();
        canonical.canonicalize();
        canonical.include.clear();
        canonical.database.tool_version = current_version().to_string();

        serde_yaml::to_string(&canonical).map_err(|e| Error::Parse {
            location: "snapshot".to_string(),
            message: e.to_string(),
        })
    }
}

fn current_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Lenient `major.minor.patch` parse; missing or non-numeric parts are zero.
fn version_triple(version: &str) -> (u64, u64, u64) {
    let mut parts = version.split('.').map(|p| p.trim().parse::<u64>().unwrap_or(0));
    (
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
    )
}
