//! Per-table conversion: read, assemble, build, write.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs::Dir;
use tracing::{debug, info};

use crate::assemble::assemble_row;
use crate::atomic_io::write_atomic;
use crate::error::ConvertError;
use crate::reader::CsvSource;
use crate::schema::TableSpec;
use crate::statement::build_script;

/// Outcome of converting one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    /// Number of rows written to the script.
    pub rows: usize,
    /// Name of the generated script inside the output directory.
    pub output: Utf8PathBuf,
}

/// Renders the script for a CSV export already in memory.
///
/// # Errors
///
/// Returns [`ConvertError::Read`] when the CSV text cannot be parsed.
///
/// # Example
///
/// ```
/// use camino::Utf8Path;
/// use csv_inserts::{CsvSource, render_table, schema::BUCKETS};
///
/// let source = CsvSource::from_string(
///     Utf8Path::new("buckets_rows.csv"),
///     "id,name,public\navatars,avatars,TRUE\n".to_owned(),
/// );
/// let (script, rows) = render_table(&BUCKETS, &source).expect("render");
///
/// assert_eq!(rows, 1);
/// assert!(script.contains("    true,"));
/// ```
pub fn render_table(spec: &TableSpec, source: &CsvSource) -> Result<(String, usize), ConvertError> {
    let tuples = source
        .rows()?
        .map(|row| row.map(|fields| assemble_row(spec, &fields)))
        .collect::<Result<Vec<_>, _>>()?;
    let source_name = source
        .path()
        .file_name()
        .unwrap_or_else(|| source.path().as_str());
    Ok((build_script(spec, source_name, &tuples), tuples.len()))
}

/// Converts `input` in `input_dir` into `output` in `output_dir`.
///
/// # Errors
///
/// Returns [`ConvertError`] when the export cannot be read or the script
/// cannot be written.
pub fn convert_table(
    spec: &TableSpec,
    input_dir: &Dir,
    input: &Utf8Path,
    output_dir: &Dir,
    output: &Utf8Path,
) -> Result<TableReport, ConvertError> {
    debug!(table = %spec.table, input = %input, "converting export");
    let source = CsvSource::open(input_dir, input)?;
    let (script, rows) = render_table(spec, &source)?;
    write_atomic(output_dir, output, &script)?;
    info!(table = %spec.table, rows, output = %output, "wrote insert script");
    Ok(TableReport {
        rows,
        output: output.to_path_buf(),
    })
}
