//! Migration file numbering.
//!
//! Two disciplines are supported, selected by configuration:
//!
//! - **sequential** — zero-padded integers, `max(existing) + 1`
//! - **timestamp** — lexicographically sortable UTC timestamps of the form
//!   `YYYYMMDDhhmmss`
//!
//! The next number is always derived by scanning the migrations directory,
//! never from state kept elsewhere, so numbers are never reused even after
//! files are pruned and regenerated. A directory that mixes both forms is
//! ambiguous and refused outright rather than guessed at.

use crate::schema::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::Path;

/// Timestamp numbers are exactly `YYYYMMDDhhmmss`.
const TIMESTAMP_WIDTH: usize = 14;

/// Minimum zero-pad width for sequential numbers.
const SEQUENTIAL_WIDTH: usize = 4;

/// The numbering discipline for migration filenames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberingScheme {
    #[default]
    Sequential,
    Timestamp,
}

impl Display for NumberingScheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NumberingScheme::Sequential => f.write_str("sequential"),
            NumberingScheme::Timestamp => f.write_str("timestamp"),
        }
    }
}

/// Extracts the number prefix from a migration filename.
///
/// Recognizes `{number}_{slug}.sql`; anything else (snapshots, editor
/// droppings, documentation) returns `None` and is ignored.
pub fn migration_number(filename: &str) -> Option<&str> {
    let stem = filename.strip_suffix(".sql")?;
    let number = stem.split('_').next()?;
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(number)
}

/// Collects the numbers of every migration file in the directory, sorted.
///
/// A directory that does not exist yet reads as empty: the first run.
pub fn scan_numbers(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut numbers = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if let Some(number) = name.to_str().and_then(migration_number) {
            numbers.push(number.to_string());
        }
    }
    numbers.sort();
    Ok(numbers)
}

/// Computes the next free migration number.
///
/// Errors when the directory mixes sequential and timestamp forms. Under
/// the timestamp scheme the number is `now` rendered through `pattern`;
/// a same-second collision advances the clock by one second until the
/// number is free.
pub fn next_number(dir: &Path, scheme: NumberingScheme, pattern: &str, now: DateTime<Utc>) -> Result<String> {
    let numbers = scan_numbers(dir)?;

    let timestamps = numbers.iter().filter(|n| n.len() >= TIMESTAMP_WIDTH).count();
    if timestamps > 0 && timestamps < numbers.len() {
        return Err(Error::MixedNumbering);
    }
    match scheme {
        NumberingScheme::Sequential if timestamps > 0 => return Err(Error::MixedNumbering),
        NumberingScheme::Timestamp if timestamps < numbers.len() => return Err(Error::MixedNumbering),
        _ => {}
    }

    match scheme {
        NumberingScheme::Sequential => {
            let highest = numbers.iter().filter_map(|n| n.parse::<u64>().ok()).max().unwrap_or(0);
            let width = numbers.iter().map(|n| n.len()).max().unwrap_or(0).max(SEQUENTIAL_WIDTH);
            Ok(format!("{:0width$}", highest + 1, width = width))
        }
        NumberingScheme::Timestamp => {
            let mut at = now;
            loop {
                let candidate = at.format(pattern).to_string();
                if !numbers.contains(&candidate) {
                    return Ok(candidate);
                }
                at += Duration::seconds(1);
            }
        }
    }
}
