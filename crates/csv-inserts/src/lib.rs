//! Convert storage and migration CSV exports into idempotent SQL scripts.
//!
//! The crate reads header-keyed CSV snapshots of four tables
//! (`supabase_migrations.schema_migrations`, `storage.objects`,
//! `storage.buckets` and `storage.prefixes`) and writes one
//! `INSERT ... ON CONFLICT ... DO NOTHING` script per table. Every field is
//! rendered as a PostgreSQL literal by a column-type formatter, so malformed
//! values degrade to safe defaults instead of aborting a run.
//!
//! # Overview
//!
//! - [`schema`] describes each table once: column order, column kinds and
//!   the conflict key.
//! - [`format`] turns one raw field into one SQL literal.
//! - [`CsvSource`] and [`CsvRow`] read an export in file order.
//! - [`assemble_row`] and [`build_script`] produce the script text.
//! - [`driver`] runs the conversion for all tables, or locates exports
//!   without converting them.
//!
//! # Example
//!
//! ```
//! use camino::Utf8Path;
//! use csv_inserts::{CsvSource, render_table, schema::MIGRATIONS};
//!
//! let source = CsvSource::from_string(
//!     Utf8Path::new("migrations_rows.csv"),
//!     "version,name,statements,inserted_at\n20240101,init,create table t(),\n".to_owned(),
//! );
//! let (script, rows) = render_table(&MIGRATIONS, &source).expect("render");
//!
//! assert_eq!(rows, 1);
//! assert!(script.contains("ARRAY['create table t()']"));
//! assert!(script.contains("NOW()"));
//! ```

mod assemble;
mod atomic_io;
pub mod config;
mod convert;
pub mod discovery;
pub mod driver;
mod error;
pub mod format;
mod reader;
pub mod schema;
mod statement;

pub use assemble::{RowLiteral, assemble_row};
pub use convert::{TableReport, convert_table, render_table};
pub use error::{ConfigError, ConvertError, DriverError, ReadError, WriteError};
pub use reader::{CsvRow, CsvRows, CsvSource};
pub use statement::{banner, build_script};
