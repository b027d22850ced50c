//! Run orchestration for the `convert` and `locate` modes.
//!
//! The driver returns structured reports; turning them into console text is
//! left to the `render_*` helpers so the binary stays a thin shell and the
//! output can be asserted on without spawning a process.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::{debug, error};

use crate::config::{DriverConfig, TableFiles};
use crate::convert::{TableReport, convert_table};
use crate::discovery::{LocatedFile, has_file, locate, open_dir};
use crate::error::{ConvertError, DriverError};

const RULE_WIDTH: usize = 70;

/// What happened to one table during `convert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOutcome {
    /// The export was not present; the table was skipped.
    Missing,
    /// The script was written.
    Converted(TableReport),
    /// The export was present but conversion failed.
    Failed(ConvertError),
}

/// Per-table entry in a [`ConvertSummary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStatus {
    /// Files involved.
    pub files: TableFiles,
    /// Result for this table.
    pub outcome: TableOutcome,
}

/// Result of a `convert` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertSummary {
    /// Directory the exports were read from.
    pub input_dir: Utf8PathBuf,
    /// Directory the scripts were written to.
    pub output_dir: Utf8PathBuf,
    /// One entry per configured table, in order.
    pub tables: Vec<TableStatus>,
}

impl ConvertSummary {
    /// Total rows written across all scripts.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.tables
            .iter()
            .filter_map(|status| match &status.outcome {
                TableOutcome::Converted(report) => Some(report.rows),
                TableOutcome::Missing | TableOutcome::Failed(_) => None,
            })
            .sum()
    }

    /// Number of tables whose export was present but failed to convert.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.tables
            .iter()
            .filter(|status| matches!(status.outcome, TableOutcome::Failed(_)))
            .count()
    }

    /// Returns an error when any present table failed.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::TableFailed`] with the failure count.
    pub fn ensure_complete(&self) -> Result<(), DriverError> {
        let failures = self.failures();
        if failures == 0 {
            Ok(())
        } else {
            Err(DriverError::TableFailed { count: failures })
        }
    }
}

/// Converts every configured table whose export is present.
///
/// Missing exports are skipped. A present export that fails to convert is
/// recorded in the summary and the remaining tables still run.
///
/// # Errors
///
/// Returns [`DriverError::NoInputFiles`] when none of the configured exports
/// exist, and [`DriverError::OpenDirectory`] when the output directory cannot
/// be created or opened.
pub fn convert(config: &DriverConfig) -> Result<ConvertSummary, DriverError> {
    let Ok(input_dir) = open_dir(&config.input_dir) else {
        return Err(DriverError::NoInputFiles {
            searched: vec![config.input_dir.clone()],
        });
    };
    let present: Vec<bool> = config
        .tables
        .iter()
        .map(|files| has_file(&input_dir, &files.input))
        .collect();
    if !present.contains(&true) {
        return Err(DriverError::NoInputFiles {
            searched: vec![config.input_dir.clone()],
        });
    }

    let output_dir = open_output_dir(config)?;
    let tables = config
        .tables
        .iter()
        .zip(present)
        .map(|(files, is_present)| TableStatus {
            files: files.clone(),
            outcome: if is_present {
                convert_one(&input_dir, &output_dir, files)
            } else {
                debug!(table = %files.table, input = %files.input, "export not found");
                TableOutcome::Missing
            },
        })
        .collect();

    Ok(ConvertSummary {
        input_dir: config.input_dir.clone(),
        output_dir: config.output_dir.clone(),
        tables,
    })
}

fn convert_one(input_dir: &Dir, output_dir: &Dir, files: &TableFiles) -> TableOutcome {
    match convert_table(
        files.table.spec(),
        input_dir,
        &files.input,
        output_dir,
        &files.output,
    ) {
        Ok(report) => TableOutcome::Converted(report),
        Err(err) => {
            error!(table = %files.table, error = %err, "table conversion failed");
            TableOutcome::Failed(err)
        }
    }
}

fn open_output_dir(config: &DriverConfig) -> Result<Dir, DriverError> {
    Dir::create_ambient_dir_all(&config.output_dir, ambient_authority())
        .and_then(|()| open_dir(&config.output_dir))
        .map_err(|err| DriverError::OpenDirectory {
            path: config.output_dir.clone(),
            message: err.to_string(),
        })
}

/// Result of a `locate` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocateReport {
    /// Directories searched, in priority order.
    pub searched: Vec<Utf8PathBuf>,
    /// Exports found, at most one per table.
    pub found: Vec<LocatedFile>,
}

/// Searches the configured candidate directories without converting.
///
/// # Errors
///
/// Returns [`DriverError::NoInputFiles`] when nothing is found.
pub fn locate_exports(config: &DriverConfig) -> Result<LocateReport, DriverError> {
    let found = locate(&config.search_dirs);
    if found.is_empty() {
        return Err(DriverError::NoInputFiles {
            searched: config.search_dirs.clone(),
        });
    }
    Ok(LocateReport {
        searched: config.search_dirs.clone(),
        found,
    })
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Header printed before either mode runs.
#[must_use]
pub fn render_banner(title: &str) -> String {
    format!("{rule}\n{title}\n{rule}\n", rule = rule())
}

/// Console text for a finished `convert` run.
#[must_use]
pub fn render_convert_summary(summary: &ConvertSummary) -> String {
    let mut lines = Vec::new();
    for status in &summary.tables {
        let input = summary.input_dir.join(&status.files.input);
        lines.push(match status.outcome {
            TableOutcome::Missing => format!("✗ Not found: {input}"),
            TableOutcome::Converted(_) | TableOutcome::Failed(_) => format!("✓ Found: {input}"),
        });
    }
    lines.push(String::new());
    for status in &summary.tables {
        match &status.outcome {
            TableOutcome::Missing => {}
            TableOutcome::Converted(report) => lines.push(format!(
                "✅ Generated {} INSERTs for {} in {}",
                report.rows,
                status.files.table,
                summary.output_dir.join(&report.output)
            )),
            TableOutcome::Failed(err) => {
                lines.push(format!("❌ Failed to convert {}: {err}", status.files.table));
            }
        }
    }
    lines.push(String::new());
    lines.push(rule());
    lines.push(format!(
        "✅ Done! {} INSERTs generated in total",
        summary.total_rows()
    ));
    lines.push(rule());
    lines.push(String::new());
    lines.push("Next steps:".to_owned());
    lines.push("1. Review the generated SQL files (*_inserts.sql)".to_owned());
    lines.push("2. Run the scripts in your database's SQL editor".to_owned());
    lines.push("3. Check that the data was imported correctly".to_owned());
    lines.join("\n") + "\n"
}

/// Console text for a `locate` run that found exports.
#[must_use]
pub fn render_locate_report(report: &LocateReport, input_dir: &Utf8Path) -> String {
    let mut lines: Vec<String> = report
        .found
        .iter()
        .map(|file| format!("✓ Found ({}): {}", file.table, file.path))
        .collect();
    lines.push(String::new());
    lines.push(format!("✅ Found {} file(s)", report.found.len()));
    lines.push(String::new());
    lines.push("To convert them:".to_owned());
    lines.push(format!("1. Copy the CSV files into: {input_dir}"));
    lines.push("2. Run: csv-inserts convert".to_owned());
    lines.join("\n") + "\n"
}

/// Remediation text for a run that found no exports at all.
#[must_use]
pub fn render_no_inputs(searched: &[Utf8PathBuf], tables: &[TableFiles]) -> String {
    let mut lines = vec!["❌ No CSV files found!".to_owned(), String::new()];
    lines.push("Searched:".to_owned());
    lines.extend(searched.iter().map(|dir| format!("  - {dir}")));
    lines.push(String::new());
    lines.push("Place these files in one of the directories above:".to_owned());
    lines.extend(tables.iter().map(|files| format!("  - {}", files.input)));
    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableFiles;
    use crate::schema::Table;

    fn utf8_temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
        let tmp = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 temp path");
        (tmp, path)
    }

    fn config_for(dir: &Utf8Path) -> DriverConfig {
        DriverConfig {
            input_dir: dir.to_path_buf(),
            output_dir: dir.join("out"),
            search_dirs: vec![dir.to_path_buf()],
            tables: Table::ALL.into_iter().map(TableFiles::standard).collect(),
        }
    }

    #[test]
    fn no_exports_is_fatal() {
        let (_tmp, dir) = utf8_temp_dir();

        let err = convert(&config_for(&dir)).expect_err("nothing to convert");

        assert_eq!(
            err,
            DriverError::NoInputFiles {
                searched: vec![dir.clone()]
            }
        );
        assert!(!dir.join("out").exists());
    }

    #[test]
    fn missing_input_directory_is_reported_as_no_exports() {
        let (_tmp, dir) = utf8_temp_dir();
        let mut config = config_for(&dir);
        config.input_dir = dir.join("absent");

        let err = convert(&config).expect_err("nothing to convert");

        assert!(matches!(err, DriverError::NoInputFiles { .. }));
    }

    #[test]
    fn converts_present_tables_and_skips_missing_ones() {
        let (_tmp, dir) = utf8_temp_dir();
        std::fs::write(
            dir.join("buckets_rows.csv"),
            "id,name,public\navatars,avatars,yes\ndocs,docs,no\n",
        )
        .expect("write buckets");
        std::fs::write(dir.join("prefixes_rows.csv"), "id,bucket_id,prefix\n,avatars,u\n")
            .expect("write prefixes");

        let summary = convert(&config_for(&dir)).expect("convert");

        let outcomes: Vec<_> = summary
            .tables
            .iter()
            .map(|status| match &status.outcome {
                TableOutcome::Missing => None,
                TableOutcome::Converted(report) => Some(report.rows),
                TableOutcome::Failed(err) => panic!("unexpected failure: {err}"),
            })
            .collect();
        assert_eq!(outcomes, [None, None, Some(2), Some(1)]);
        assert_eq!(summary.total_rows(), 3);
        assert_eq!(summary.failures(), 0);
        assert!(dir.join("out").join("buckets_inserts.sql").is_file());
        assert!(dir.join("out").join("prefixes_inserts.sql").is_file());
        assert!(!dir.join("out").join("objects_inserts.sql").exists());
    }

    #[test]
    fn summary_text_lists_found_missing_and_totals() {
        let (_tmp, dir) = utf8_temp_dir();
        std::fs::write(dir.join("objects_rows.csv"), "id,bucket_id,name\n,b,n\n")
            .expect("write objects");

        let summary = convert(&config_for(&dir)).expect("convert");
        let text = render_convert_summary(&summary);

        assert!(text.contains(&format!("✗ Not found: {}", dir.join("migrations_rows.csv"))));
        assert!(text.contains(&format!("✓ Found: {}", dir.join("objects_rows.csv"))));
        assert!(text.contains(&format!(
            "✅ Generated 1 INSERTs for objects in {}",
            dir.join("out").join("objects_inserts.sql")
        )));
        assert!(text.contains("✅ Done! 1 INSERTs generated in total"));
    }

    #[test]
    fn failed_tables_do_not_stop_the_others() {
        let (_tmp, dir) = utf8_temp_dir();
        std::fs::write(dir.join("buckets_rows.csv"), "id,name\nb,b\n")
            .expect("write buckets");
        std::fs::write(dir.join("prefixes_rows.csv"), "id,bucket_id,prefix\n,b,p\n")
            .expect("write prefixes");
        std::fs::write(dir.join("objects_rows.csv"), [0xff_u8, 0xfe, 0x00])
            .expect("write objects");

        let summary = convert(&config_for(&dir)).expect("convert");

        assert_eq!(summary.failures(), 1);
        assert_eq!(summary.total_rows(), 2);
        assert_eq!(
            summary.ensure_complete(),
            Err(DriverError::TableFailed { count: 1 })
        );
        assert!(dir.join("out").join("prefixes_inserts.sql").is_file());
        assert!(!dir.join("out").join("objects_inserts.sql").exists());
    }

    #[test]
    fn locate_without_exports_is_fatal() {
        let (_tmp, dir) = utf8_temp_dir();

        let err = locate_exports(&config_for(&dir)).expect_err("nothing to locate");

        assert_eq!(err, DriverError::NoInputFiles { searched: vec![dir] });
    }

    #[test]
    fn locate_reports_without_writing_scripts() {
        let (_tmp, dir) = utf8_temp_dir();
        std::fs::write(dir.join("storage_objects_rows.csv"), "id\n").expect("write");

        let report = locate_exports(&config_for(&dir)).expect("locate");
        let text = render_locate_report(&report, &dir);

        assert_eq!(report.found.len(), 1);
        assert!(text.contains("✅ Found 1 file(s)"));
        assert!(!dir.join("out").exists());
    }

    #[test]
    fn no_inputs_text_lists_expected_files() {
        let tables: Vec<_> = Table::ALL.into_iter().map(TableFiles::standard).collect();

        let text = render_no_inputs(&[Utf8PathBuf::from(".")], &tables);

        for name in [
            "migrations_rows.csv",
            "objects_rows.csv",
            "buckets_rows.csv",
            "prefixes_rows.csv",
        ] {
            assert!(text.contains(&format!("  - {name}")), "missing {name}");
        }
    }
}
