//! Locating CSV exports on disk.
//!
//! Conversion looks for exact file names in one input directory. The
//! discovery-only `locate` mode scans several candidate directories for any
//! `*_rows.csv` file and classifies it by the table keyword in its name.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::debug;

use crate::schema::Table;

const EXPORT_SUFFIX: &str = "_rows.csv";

/// Opens a directory with ambient authority.
///
/// # Errors
///
/// Returns the underlying I/O error when the directory cannot be opened.
pub fn open_dir(path: &Utf8Path) -> std::io::Result<Dir> {
    Dir::open_ambient_dir(path, ambient_authority())
}

/// Returns whether `file_name` exists as a regular file in `dir`.
#[must_use]
pub fn has_file(dir: &Dir, file_name: &Utf8Path) -> bool {
    dir.is_file(file_name)
}

/// Picks the table a loosely named export belongs to.
///
/// Only names ending in `_rows.csv` qualify. Keywords are checked in table
/// order, so `migration_objects_rows.csv` counts as a migration export.
///
/// # Example
///
/// ```
/// use csv_inserts::discovery::classify;
/// use csv_inserts::schema::Table;
///
/// assert_eq!(classify("Storage_Buckets_rows.csv"), Some(Table::Buckets));
/// assert_eq!(classify("buckets.csv"), None);
/// ```
#[must_use]
pub fn classify(file_name: &str) -> Option<Table> {
    let lowered = file_name.to_lowercase();
    if !lowered.ends_with(EXPORT_SUFFIX) {
        return None;
    }
    Table::ALL
        .into_iter()
        .find(|table| lowered.contains(table.keyword()))
}

/// An export found by [`locate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedFile {
    /// Table the file was classified as.
    pub table: Table,
    /// Full path to the file.
    pub path: Utf8PathBuf,
}

/// Scans candidate directories for exports, one file per table.
///
/// Candidates are searched in order and the first file classified for a
/// table wins. Directories that do not exist or cannot be listed are
/// skipped. Within one directory, names are visited in sorted order.
#[must_use]
pub fn locate(candidates: &[Utf8PathBuf]) -> Vec<LocatedFile> {
    let mut found: BTreeMap<Table, Utf8PathBuf> = BTreeMap::new();
    for candidate in candidates {
        for name in export_names(candidate) {
            let Some(table) = classify(&name) else {
                continue;
            };
            found.entry(table).or_insert_with(|| candidate.join(&name));
        }
    }
    found
        .into_iter()
        .map(|(table, path)| LocatedFile { table, path })
        .collect()
}

fn export_names(candidate: &Utf8Path) -> Vec<String> {
    let entries = match open_dir(candidate).and_then(|dir| dir.entries()) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(directory = %candidate, error = %err, "skipping candidate directory");
            return Vec::new();
        }
    };
    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();
    names
}
