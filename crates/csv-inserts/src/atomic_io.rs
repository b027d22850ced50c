//! Atomic script writes.
//!
//! Generated scripts are written to a hidden temporary file in the output
//! directory and renamed into place, so an interrupted run never leaves a
//! truncated `*_inserts.sql` behind for the operator to execute.

use std::io::Write;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use camino::{Utf8Component, Utf8Path};
use cap_std::fs::{Dir, OpenOptions};

use crate::error::WriteError;

static SCRIPT_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replaces `script_name` inside `dir` with `contents`.
///
/// The text is written and synced under a hidden sibling name first, then
/// renamed over the target.
///
/// # Errors
///
/// Returns [`WriteError::InvalidPath`] when `script_name` is not a bare file
/// name and [`WriteError::Io`] when writing or renaming fails. A failed write
/// removes its hidden file.
pub(crate) fn write_atomic(
    dir: &Dir,
    script_name: &Utf8Path,
    contents: &str,
) -> Result<(), WriteError> {
    let mut components = script_name.components();
    let (Some(Utf8Component::Normal(file_name)), None) = (components.next(), components.next())
    else {
        return Err(WriteError::InvalidPath {
            path: script_name.to_path_buf(),
        });
    };
    let staged = format!(
        ".{file_name}.{}-{}.partial",
        process::id(),
        SCRIPT_COUNTER.fetch_add(1, Ordering::Relaxed)
    );
    let io_error = |err: std::io::Error| WriteError::Io {
        path: script_name.to_path_buf(),
        message: err.to_string(),
    };

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let staged_written = dir.open_with(&staged, &options).and_then(|mut file| {
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    });
    if let Err(err) = staged_written.and_then(|()| dir.rename(&staged, dir, file_name)) {
        drop(dir.remove_file(&staged));
        return Err(io_error(err));
    }

    // Persisting the rename is best effort.
    drop(dir.open(".").and_then(|handle| handle.sync_all()));
    Ok(())
}
