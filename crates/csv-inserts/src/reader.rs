//! CSV export reading.
//!
//! Exports are small, so a file is read into memory in one go and then
//! parsed lazily, one header-keyed row at a time, in file order.

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs::Dir;
use csv::{ReaderBuilder, StringRecordsIntoIter};

use crate::error::ReadError;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// One data row keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    fields: HashMap<String, String>,
}

impl CsvRow {
    /// Builds a row from `(header, value)` pairs.
    ///
    /// # Example
    ///
    /// ```
    /// use csv_inserts::CsvRow;
    ///
    /// let row = CsvRow::from_pairs([("id", " avatars "), ("public", "true")]);
    /// assert_eq!(row.field("id"), "avatars");
    /// assert_eq!(row.field("owner"), "");
    /// ```
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Returns the trimmed value of a column.
    ///
    /// Columns absent from the export read as blank.
    #[must_use]
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map_or("", |value| value.trim())
    }
}

/// A CSV export held in memory.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: Utf8PathBuf,
    contents: String,
}

impl CsvSource {
    /// Reads an export from a directory handle.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::Io`] when the file is missing, unreadable, or not
    /// valid UTF-8.
    pub fn open(dir: &Dir, file_name: &Utf8Path) -> Result<Self, ReadError> {
        let contents = dir
            .read_to_string(file_name)
            .map_err(|err| ReadError::Io {
                path: file_name.to_path_buf(),
                message: err.to_string(),
            })?;
        Ok(Self::from_string(file_name, contents))
    }

    /// Wraps already-loaded CSV text.
    #[must_use]
    pub fn from_string(path: &Utf8Path, contents: String) -> Self {
        Self {
            path: path.to_path_buf(),
            contents,
        }
    }

    /// Path the export was read from.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Parses the header line and returns a lazy iterator over data rows.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::Headers`] when the header line cannot be parsed.
    /// Individual rows surface [`ReadError::Csv`] through the iterator.
    ///
    /// # Example
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use csv_inserts::CsvSource;
    ///
    /// let source = CsvSource::from_string(
    ///     Utf8Path::new("prefixes_rows.csv"),
    ///     "id,bucket_id,prefix\n,avatars,users/\n".to_owned(),
    /// );
    /// let rows = source
    ///     .rows()
    ///     .expect("headers parse")
    ///     .collect::<Result<Vec<_>, _>>()
    ///     .expect("rows parse");
    ///
    /// assert_eq!(rows.len(), 1);
    /// assert_eq!(rows.first().map(|row| row.field("prefix")), Some("users/"));
    /// ```
    pub fn rows(&self) -> Result<CsvRows<'_>, ReadError> {
        let text = self
            .contents
            .strip_prefix(BYTE_ORDER_MARK)
            .unwrap_or(&self.contents);
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());
        let headers = reader
            .headers()
            .map_err(|err| ReadError::Headers {
                path: self.path.clone(),
                message: err.to_string(),
            })?
            .iter()
            .map(|header| header.trim().to_owned())
            .collect();
        Ok(CsvRows {
            path: &self.path,
            headers,
            records: reader.into_records(),
            row: 0,
        })
    }
}

/// Lazy iterator over the data rows of a [`CsvSource`].
pub struct CsvRows<'a> {
    path: &'a Utf8Path,
    headers: Vec<String>,
    records: StringRecordsIntoIter<&'a [u8]>,
    row: usize,
}

impl Iterator for CsvRows<'_> {
    type Item = Result<CsvRow, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        self.row += 1;
        Some(
            record
                .map(|fields| {
                    // Short records leave trailing columns absent, which
                    // reads as blank.
                    CsvRow::from_pairs(
                        self.headers
                            .iter()
                            .zip(fields.iter())
                            .map(|(header, value)| (header.as_str(), value)),
                    )
                })
                .map_err(|err| ReadError::Csv {
                    path: self.path.to_path_buf(),
                    row: self.row,
                    message: err.to_string(),
                }),
        )
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn source(contents: &str) -> CsvSource {
        CsvSource::from_string(Utf8Path::new("test_rows.csv"), contents.to_owned())
    }

    fn read_all(contents: &str) -> Vec<CsvRow> {
        source(contents)
            .rows()
            .expect("headers parse")
            .collect::<Result<Vec<_>, _>>()
            .expect("rows parse")
    }

    #[test]
    fn rows_are_keyed_by_header_in_file_order() {
        let rows = read_all("id,name\n1,first\n2,second\n3,third\n");

        let names: Vec<_> = rows.iter().map(|row| row.field("name")).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn quoted_fields_keep_commas_quotes_and_newlines() {
        let rows = read_all(
            "version,statements\n\
             20240101,\"[\"\"create table a (x int, y int)\"\",\"\"select 'a'\"\"]\"\n\
             20240102,\"line one\nline two\"\n",
        );

        assert_eq!(rows.len(), 2);
        let first = rows.first().expect("first row");
        assert_eq!(
            first.field("statements"),
            r#"["create table a (x int, y int)","select 'a'"]"#
        );
        let second = rows.get(1).expect("second row");
        assert_eq!(second.field("statements"), "line one\nline two");
    }

    #[rstest]
    #[case("id,owner,public\n1,,\n")]
    #[case("id,owner,public\n1\n")]
    fn blank_and_missing_trailing_fields_read_as_empty(#[case] contents: &str) {
        let rows = read_all(contents);
        let row = rows.first().expect("one row");

        assert_eq!(row.field("id"), "1");
        assert_eq!(row.field("owner"), "");
        assert_eq!(row.field("public"), "");
    }

    #[test]
    fn values_are_trimmed_on_lookup() {
        let rows = read_all("id, name \n  7 , spaced  \n");
        let row = rows.first().expect("one row");

        assert_eq!(row.field("id"), "7");
        assert_eq!(row.field("name"), "spaced");
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let rows = read_all("\u{feff}id,name\n1,bom\n");
        let row = rows.first().expect("one row");

        assert_eq!(row.field("id"), "1");
    }

    #[test]
    fn header_only_file_has_no_rows() {
        assert!(read_all("id,name\n").is_empty());
    }

    #[test]
    fn non_utf8_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("buckets_rows.csv"), b"id,name\n1,\xff\n")
            .expect("write fixture");
        let handle = Dir::open_ambient_dir(dir.path(), cap_std::ambient_authority())
            .expect("open temp dir");

        let err = CsvSource::open(&handle, Utf8Path::new("buckets_rows.csv"))
            .expect_err("file is not UTF-8");

        assert!(matches!(err, ReadError::Io { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let handle = Dir::open_ambient_dir(dir.path(), cap_std::ambient_authority())
            .expect("open temp dir");

        let err = CsvSource::open(&handle, Utf8Path::new("objects_rows.csv"))
            .expect_err("file should be missing");

        assert!(matches!(err, ReadError::Io { ref path, .. } if path.as_str() == "objects_rows.csv"));
    }
}
