//! Row assembly: one CSV row in, one SQL tuple literal out.

use std::fmt;

use crate::reader::CsvRow;
use crate::schema::TableSpec;

const INDENT: &str = "    ";

/// Formatted literals for one row, in the table's declared column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLiteral {
    values: Vec<String>,
}

impl RowLiteral {
    /// Returns the formatted literals.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl fmt::Display for RowLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "(")?;
        let mut values = self.values.iter().peekable();
        while let Some(value) = values.next() {
            let separator = if values.peek().is_some() { "," } else { "" };
            writeln!(f, "{INDENT}{value}{separator}")?;
        }
        write!(f, ")")
    }
}

/// Formats every declared column of `spec` from `row`.
///
/// Columns missing from the row are formatted as blank input, so the tuple
/// always has exactly `spec.columns.len()` values.
///
/// # Example
///
/// ```
/// use csv_inserts::{CsvRow, assemble_row, schema::PREFIXES};
///
/// let row = CsvRow::from_pairs([("bucket_id", "avatars"), ("prefix", "users")]);
/// let tuple = assemble_row(&PREFIXES, &row);
///
/// assert_eq!(
///     tuple.values(),
///     ["gen_random_uuid()", "'avatars'", "'users'", "NOW()", "NOW()"]
/// );
/// ```
#[must_use]
pub fn assemble_row(spec: &TableSpec, row: &CsvRow) -> RowLiteral {
    RowLiteral {
        values: spec
            .columns
            .iter()
            .map(|column| column.kind.format(row.field(column.name)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::schema::{BUCKETS, MIGRATIONS, OBJECTS, PREFIXES, Table};

    /// Splits a rendered tuple into its top-level elements, ignoring commas
    /// inside quotes, brackets, and parentheses.
    fn top_level_elements(tuple: &str) -> Vec<String> {
        let inner = tuple
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .expect("tuple should be parenthesised");
        let mut elements = Vec::new();
        let mut current = String::new();
        let mut depth = 0_i32;
        let mut in_quotes = false;
        for ch in inner.chars() {
            match ch {
                '\'' => in_quotes = !in_quotes,
                '(' | '[' if !in_quotes => depth += 1,
                ')' | ']' if !in_quotes => depth -= 1,
                ',' if !in_quotes && depth == 0 => {
                    elements.push(current.trim().to_owned());
                    current.clear();
                    continue;
                }
                _ => {}
            }
            current.push(ch);
        }
        elements.push(current.trim().to_owned());
        elements
    }

    fn hostile_row() -> CsvRow {
        CsvRow::from_pairs([
            ("id", "x,y"),
            ("name", "it's, (tricky)"),
            ("statements", r#"["a, b", "c)"]"#),
            ("metadata", r#"{"k": "v, w"}"#),
            ("path_tokens", r#"["a,b", "c"]"#),
            ("allowed_mime_types", r#"["image/png","image/jpeg"]"#),
            ("prefix", "folder, one/"),
        ])
    }

    #[rstest]
    #[case(Table::Migrations)]
    #[case(Table::Objects)]
    #[case(Table::Buckets)]
    #[case(Table::Prefixes)]
    fn tuple_has_declared_column_count(#[case] table: Table) {
        let spec = table.spec();
        for row in [CsvRow::default(), hostile_row()] {
            let tuple = assemble_row(spec, &row);

            assert_eq!(tuple.values().len(), spec.columns.len());
            assert_eq!(
                top_level_elements(&tuple.to_string()).len(),
                spec.columns.len()
            );
        }
    }

    #[test]
    fn tuple_renders_one_value_per_line() {
        let row = CsvRow::from_pairs([
            ("id", "p-1"),
            ("bucket_id", "avatars"),
            ("prefix", "users"),
            ("created_at", "2024-01-15 10:30:00+00"),
            ("updated_at", ""),
        ]);

        assert_eq!(
            assemble_row(&PREFIXES, &row).to_string(),
            "(\n    'p-1',\n    'avatars',\n    'users',\n    \
             '2024-01-15T10:30:00+00:00'::timestamptz,\n    NOW()\n)"
        );
    }

    #[test]
    fn bucket_row_formats_booleans_and_mime_types() {
        let row = CsvRow::from_pairs([
            ("id", "avatars"),
            ("name", "avatars"),
            ("public", "TRUE"),
            ("avif_autodetection", "f"),
            ("file_size_limit", "52428800"),
            ("allowed_mime_types", r#"["image/png","image/jpeg"]"#),
        ]);

        let tuple = assemble_row(&BUCKETS, &row);

        assert_eq!(
            tuple.values(),
            [
                "'avatars'",
                "'avatars'",
                "NULL",
                "NOW()",
                "NOW()",
                "true",
                "false",
                "52428800",
                "ARRAY['image/png', 'image/jpeg']",
            ]
        );
    }

    #[test]
    fn migration_with_plain_statement_becomes_single_element_array() {
        let row = CsvRow::from_pairs([
            ("version", "20240101000000"),
            ("name", "init"),
            ("statements", "this is not json"),
            ("inserted_at", ""),
        ]);

        let tuple = assemble_row(&MIGRATIONS, &row);

        assert_eq!(
            tuple.values(),
            [
                "'20240101000000'",
                "'init'",
                "ARRAY['this is not json']",
                "NOW()"
            ]
        );
    }

    #[test]
    fn object_with_blank_id_uses_generated_uuid() {
        let row = CsvRow::from_pairs([
            ("id", ""),
            ("bucket_id", "avatars"),
            ("name", "users/alice.png"),
            ("metadata", ""),
            ("path_tokens", r#"["users","alice.png"]"#),
        ]);

        let tuple = assemble_row(&OBJECTS, &row);

        assert_eq!(tuple.values().first().map(String::as_str), Some("gen_random_uuid()"));
        assert_eq!(
            tuple.values(),
            [
                "gen_random_uuid()",
                "'avatars'",
                "'users/alice.png'",
                "NULL",
                "NOW()",
                "NOW()",
                "NULL",
                "'{}'::jsonb",
                "ARRAY['users', 'alice.png']",
                "NULL",
                "NULL",
            ]
        );
    }
}
