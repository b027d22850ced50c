//! Statement building: tuple literals in, one SQL script out.

use crate::assemble::RowLiteral;
use crate::schema::TableSpec;

const RULE: &str =
    "-- ============================================================================";

/// Renders the comment banner that opens every generated script.
#[must_use]
pub fn banner(spec: &TableSpec, source_name: &str) -> String {
    format!(
        "{RULE}\n-- INSERTS FOR {}\n-- Generated automatically from {source_name}\n{RULE}\n\n",
        spec.qualified_name
    )
}

/// Builds the complete script for one table.
///
/// All tuples go into a single `INSERT` whose `ON CONFLICT ... DO NOTHING`
/// clause makes re-running the script a no-op. Without rows the script holds
/// only the banner and a comment, since an empty `VALUES` list is not valid
/// SQL.
///
/// # Example
///
/// ```
/// use csv_inserts::{CsvRow, assemble_row, build_script, schema::PREFIXES};
///
/// let row = CsvRow::from_pairs([("id", "p1"), ("bucket_id", "b"), ("prefix", "x")]);
/// let script = build_script(&PREFIXES, "prefixes_rows.csv", &[assemble_row(&PREFIXES, &row)]);
///
/// assert!(script.starts_with("-- ===="));
/// assert!(script.contains("INSERT INTO storage.prefixes (\n    id,"));
/// assert!(script.ends_with("ON CONFLICT (id) DO NOTHING;\n"));
/// ```
#[must_use]
pub fn build_script(spec: &TableSpec, source_name: &str, rows: &[RowLiteral]) -> String {
    let mut script = banner(spec, source_name);
    if rows.is_empty() {
        script.push_str(&format!(
            "-- no rows found in {source_name}; nothing to insert\n"
        ));
        return script;
    }

    let columns = spec
        .column_names()
        .map(|name| format!("    {name}"))
        .collect::<Vec<_>>()
        .join(",\n");
    let tuples = rows
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",\n");
    script.push_str(&format!(
        "INSERT INTO {} (\n{columns}\n) VALUES\n{tuples}\nON CONFLICT ({}) DO NOTHING;\n",
        spec.qualified_name, spec.conflict_column
    ));
    script
}
