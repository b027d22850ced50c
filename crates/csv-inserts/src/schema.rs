//! Column declarations for the four exported tables.
//!
//! Each table is described once as a [`TableSpec`]: the qualified target
//! name, the conflict column, the input and output file names, and the
//! ordered column list with the formatting rule for each column. The
//! conversion pipeline is driven entirely by these declarations.

use std::fmt;

use crate::format::{self, ArrayFallback};

/// Formatting rule applied to one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Quoted text; blank input yields `''`.
    Text,
    /// Quoted text; blank input yields `NULL`.
    OptionalText,
    /// Bare integer; blank or non-numeric input yields `NULL`.
    OptionalInteger,
    /// Quoted identifier; blank input asks the server for a UUID.
    GeneratedUuid,
    /// `timestamptz` literal; blank input yields `NOW()`.
    TimestampOrNow,
    /// `timestamptz` literal; blank input yields `NULL`.
    TimestampOrNull,
    /// Loose boolean, default `false`.
    Boolean,
    /// `jsonb` literal, default `{}`.
    Jsonb,
    /// `text[]` constructor with the given fallback for non-JSON input.
    TextArray(ArrayFallback),
}

impl ColumnKind {
    /// Formats a trimmed raw field according to this rule.
    #[must_use]
    pub fn format(self, raw: &str) -> String {
        match self {
            Self::Text => format::quote_text(raw),
            Self::OptionalText => format::optional_text(raw),
            Self::OptionalInteger => format::optional_integer(raw),
            Self::GeneratedUuid => format::uuid_or_generated(raw),
            Self::TimestampOrNow => format::timestamp_or(raw, format::NOW),
            Self::TimestampOrNull => format::timestamp_or(raw, format::NULL),
            Self::Boolean => format::boolean(raw).to_owned(),
            Self::Jsonb => format::jsonb(raw),
            Self::TextArray(fallback) => format::text_array(raw, fallback),
        }
    }
}

/// A named column and its formatting rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name, shared by the CSV header and the target table.
    pub name: &'static str,
    /// Formatting rule.
    pub kind: ColumnKind,
}

const fn column(name: &'static str, kind: ColumnKind) -> Column {
    Column { name, kind }
}

/// Declaration of one target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    /// Which exported table this is.
    pub table: Table,
    /// Schema-qualified target table name.
    pub qualified_name: &'static str,
    /// Column named in the `ON CONFLICT` clause.
    pub conflict_column: &'static str,
    /// Ordered column list; tuples always carry exactly these columns.
    pub columns: &'static [Column],
}

impl TableSpec {
    /// Returns the column names in declared order.
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|column| column.name)
    }
}

/// `supabase_migrations.schema_migrations` rows.
pub const MIGRATIONS: TableSpec = TableSpec {
    table: Table::Migrations,
    qualified_name: "supabase_migrations.schema_migrations",
    conflict_column: "version",
    columns: &[
        column("version", ColumnKind::Text),
        column("name", ColumnKind::Text),
        column(
            "statements",
            ColumnKind::TextArray(ArrayFallback::SingleValue),
        ),
        column("inserted_at", ColumnKind::TimestampOrNow),
    ],
};

/// `storage.objects` rows.
pub const OBJECTS: TableSpec = TableSpec {
    table: Table::Objects,
    qualified_name: "storage.objects",
    conflict_column: "id",
    columns: &[
        column("id", ColumnKind::GeneratedUuid),
        column("bucket_id", ColumnKind::Text),
        column("name", ColumnKind::Text),
        column("owner", ColumnKind::OptionalText),
        column("created_at", ColumnKind::TimestampOrNow),
        column("updated_at", ColumnKind::TimestampOrNow),
        column("last_accessed_at", ColumnKind::TimestampOrNull),
        column("metadata", ColumnKind::Jsonb),
        column("path_tokens", ColumnKind::TextArray(ArrayFallback::Empty)),
        column("version", ColumnKind::OptionalText),
        column("owner_id", ColumnKind::OptionalText),
    ],
};

/// `storage.buckets` rows.
pub const BUCKETS: TableSpec = TableSpec {
    table: Table::Buckets,
    qualified_name: "storage.buckets",
    conflict_column: "id",
    columns: &[
        column("id", ColumnKind::Text),
        column("name", ColumnKind::Text),
        column("owner", ColumnKind::OptionalText),
        column("created_at", ColumnKind::TimestampOrNow),
        column("updated_at", ColumnKind::TimestampOrNow),
        column("public", ColumnKind::Boolean),
        column("avif_autodetection", ColumnKind::Boolean),
        column("file_size_limit", ColumnKind::OptionalInteger),
        column(
            "allowed_mime_types",
            ColumnKind::TextArray(ArrayFallback::Empty),
        ),
    ],
};

/// `storage.prefixes` rows.
pub const PREFIXES: TableSpec = TableSpec {
    table: Table::Prefixes,
    qualified_name: "storage.prefixes",
    conflict_column: "id",
    columns: &[
        column("id", ColumnKind::GeneratedUuid),
        column("bucket_id", ColumnKind::Text),
        column("prefix", ColumnKind::Text),
        column("created_at", ColumnKind::TimestampOrNow),
        column("updated_at", ColumnKind::TimestampOrNow),
    ],
};

/// The exported tables, in conversion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    /// Schema migration history.
    Migrations,
    /// Storage objects.
    Objects,
    /// Storage buckets.
    Buckets,
    /// Storage prefixes.
    Prefixes,
}

impl Table {
    /// All tables in conversion order.
    pub const ALL: [Self; 4] = [Self::Migrations, Self::Objects, Self::Buckets, Self::Prefixes];

    /// Short name used in file names and console output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Migrations => "migrations",
            Self::Objects => "objects",
            Self::Buckets => "buckets",
            Self::Prefixes => "prefixes",
        }
    }

    /// Keyword that identifies this table in a loosely named export file.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Migrations => "migration",
            Self::Objects => "object",
            Self::Buckets => "bucket",
            Self::Prefixes => "prefix",
        }
    }

    /// Column declaration for this table.
    #[must_use]
    pub const fn spec(self) -> &'static TableSpec {
        match self {
            Self::Migrations => &MIGRATIONS,
            Self::Objects => &OBJECTS,
            Self::Buckets => &BUCKETS,
            Self::Prefixes => &PREFIXES,
        }
    }

    /// Expected CSV export name, e.g. `objects_rows.csv`.
    #[must_use]
    pub fn input_file_name(self) -> String {
        format!("{}_rows.csv", self.name())
    }

    /// Generated script name, e.g. `objects_inserts.sql`.
    #[must_use]
    pub fn output_file_name(self) -> String {
        format!("{}_inserts.sql", self.name())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
