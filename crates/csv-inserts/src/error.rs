//! Error types for the csv-inserts crate.
//!
//! Each stage of the pipeline owns a semantic error enum built with
//! `thiserror`. Variants carry the offending path and a rendered message so
//! errors stay cheap to clone and compare in tests.
//!
//! Malformed field values never surface here: the field formatter resolves
//! them to default literals instead.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while reading a CSV export.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// The CSV file could not be opened or read.
    #[error("failed to read CSV file at '{path}': {message}")]
    Io {
        /// Path to the CSV file.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The header line could not be parsed.
    #[error("invalid CSV header in '{path}': {message}")]
    Headers {
        /// Path to the CSV file.
        path: Utf8PathBuf,
        /// Parser error message.
        message: String,
    },

    /// A data record could not be parsed.
    #[error("invalid CSV record {row} in '{path}': {message}")]
    Csv {
        /// Path to the CSV file.
        path: Utf8PathBuf,
        /// 1-based index of the data row (the header is row 0).
        row: usize,
        /// Parser error message.
        message: String,
    },
}

/// Errors raised while writing a generated SQL script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    /// The script could not be written.
    #[error("failed to write SQL script at '{path}': {message}")]
    Io {
        /// Path of the file being written.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The output path does not name a single file.
    #[error("output path '{path}' must be a plain file name")]
    InvalidPath {
        /// The rejected path.
        path: Utf8PathBuf,
    },
}

/// Errors raised while converting one table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The CSV input could not be read.
    #[error(transparent)]
    Read(#[from] ReadError),

    /// The SQL output could not be written.
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Errors that stop a driver run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// None of the expected CSV files exist in the searched directories.
    #[error("no CSV files found (searched: {})", display_paths(.searched))]
    NoInputFiles {
        /// Directories that were searched.
        searched: Vec<Utf8PathBuf>,
    },

    /// A configured directory could not be opened.
    #[error("failed to open directory '{path}': {message}")]
    OpenDirectory {
        /// Directory path.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// One or more present tables failed to convert.
    #[error("{count} table(s) failed to convert")]
    TableFailed {
        /// Number of failed tables.
        count: usize,
    },
}

/// Errors raised while layering configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Settings could not be loaded from the environment or config files.
    #[error("failed to load settings: {message}")]
    Load {
        /// Loader error message.
        message: String,
    },

    /// A configured path is not valid UTF-8.
    #[error("configured path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the path.
        path: String,
    },
}

fn display_paths(paths: &[Utf8PathBuf]) -> String {
    paths
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
