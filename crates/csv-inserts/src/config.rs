//! Run configuration.
//!
//! [`ImportSettings`] is layered by OrthoConfig from `CSV_INSERTS_*`
//! environment variables and config files. The binary merges it with its
//! command-line flags into a plain [`DriverConfig`], which is the only thing
//! the driver sees.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::schema::Table;

const DOWNLOADS_DIR: &str = "Downloads";
const CURRENT_DIR: &str = ".";

/// Environment- and file-backed settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CSV_INSERTS")]
pub struct ImportSettings {
    /// Directory holding the `*_rows.csv` exports.
    #[ortho_config(default = PathBuf::from(CURRENT_DIR))]
    pub input_dir: PathBuf,
    /// Directory receiving the `*_inserts.sql` scripts.
    #[ortho_config(default = PathBuf::from(CURRENT_DIR))]
    pub output_dir: PathBuf,
    /// Candidate directories for `locate`, as an OS path list.
    pub search_dirs: Option<String>,
}

impl ImportSettings {
    /// Loads settings without reading any command-line arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when a config source is malformed.
    pub fn load_without_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from("csv-inserts")]).map_err(|err| ConfigError::Load {
            message: err.to_string(),
        })
    }

    /// Splits [`Self::search_dirs`] using the platform path-list separator.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonUtf8Path`] for entries that are not UTF-8.
    pub fn search_dir_list(&self) -> Result<Vec<Utf8PathBuf>, ConfigError> {
        self.search_dirs.as_deref().map_or_else(
            || Ok(Vec::new()),
            |list| {
                env::split_paths(list)
                    .filter(|path| !path.as_os_str().is_empty())
                    .map(utf8_path)
                    .collect()
            },
        )
    }
}

/// Input and output file names for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFiles {
    /// Table converted from the export.
    pub table: Table,
    /// CSV export name inside the input directory.
    pub input: Utf8PathBuf,
    /// Script name inside the output directory.
    pub output: Utf8PathBuf,
}

impl TableFiles {
    /// Conventional names: `<table>_rows.csv` in, `<table>_inserts.sql` out.
    #[must_use]
    pub fn standard(table: Table) -> Self {
        Self {
            table,
            input: Utf8PathBuf::from(table.input_file_name()),
            output: Utf8PathBuf::from(table.output_file_name()),
        }
    }
}

/// Everything a driver run needs, resolved up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Directory holding the exports.
    pub input_dir: Utf8PathBuf,
    /// Directory receiving the scripts.
    pub output_dir: Utf8PathBuf,
    /// Candidate directories searched by `locate`, in priority order.
    pub search_dirs: Vec<Utf8PathBuf>,
    /// Tables to convert, in order.
    pub tables: Vec<TableFiles>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            input_dir: Utf8PathBuf::from(CURRENT_DIR),
            output_dir: Utf8PathBuf::from(CURRENT_DIR),
            search_dirs: default_search_dirs(),
            tables: Table::ALL.into_iter().map(TableFiles::standard).collect(),
        }
    }
}

impl DriverConfig {
    /// Applies settings over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonUtf8Path`] when a configured path is not
    /// UTF-8.
    pub fn from_settings(settings: &ImportSettings) -> Result<Self, ConfigError> {
        let search_dirs = settings.search_dir_list()?;
        Ok(Self {
            input_dir: utf8_path(settings.input_dir.clone())?,
            output_dir: utf8_path(settings.output_dir.clone())?,
            search_dirs: if search_dirs.is_empty() {
                default_search_dirs()
            } else {
                search_dirs
            },
            ..Self::default()
        })
    }
}

/// The current directory, then `$HOME/Downloads` when `HOME` is set.
#[must_use]
pub fn default_search_dirs() -> Vec<Utf8PathBuf> {
    let mut dirs = vec![Utf8PathBuf::from(CURRENT_DIR)];
    if let Some(home) = env::var_os("HOME").and_then(|home| utf8_path(PathBuf::from(home)).ok()) {
        dirs.push(home.join(DOWNLOADS_DIR));
    }
    dirs
}

fn utf8_path(path: PathBuf) -> Result<Utf8PathBuf, ConfigError> {
    Utf8PathBuf::from_path_buf(path).map_err(|raw| ConfigError::NonUtf8Path {
        path: raw.to_string_lossy().into_owned(),
    })
}
