//! SQL literal formatting for raw CSV fields.
//!
//! Every function here is total: malformed input resolves to a default
//! literal (`NULL`, `false`, an empty array, an empty object, or the raw
//! timestamp text) rather than an error, so a single bad cell never stops a
//! conversion.

use chrono::{DateTime, NaiveDateTime, SecondsFormat};
use serde_json::Value;
use tracing::{debug, warn};

/// SQL `NULL` literal.
pub const NULL: &str = "NULL";

/// Server-side current timestamp.
pub const NOW: &str = "NOW()";

/// Server-side UUID generator used for blank primary keys.
pub const GENERATED_UUID: &str = "gen_random_uuid()";

/// Tokens accepted as boolean `true`, compared case-insensitively.
const TRUTHY: [&str; 4] = ["true", "t", "1", "yes"];

/// Offset-aware formats, tried before the naive ones.
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M:%S%#z",
];

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// How a text array column treats input that is not a JSON array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayFallback {
    /// Non-JSON input becomes a one-element array holding the raw text.
    SingleValue,
    /// Non-JSON input becomes an empty array.
    Empty,
}

/// Doubles single quotes so the text can sit inside a SQL string literal.
///
/// # Example
///
/// ```
/// use csv_inserts::format::escape;
///
/// assert_eq!(escape("O'Brien"), "O''Brien");
/// ```
#[must_use]
pub fn escape(raw: &str) -> String {
    raw.replace('\'', "''")
}

/// Wraps text in single quotes, escaping embedded quotes.
///
/// Blank input still yields `''`; nullable columns use [`optional_text`].
///
/// # Example
///
/// ```
/// use csv_inserts::format::quote_text;
///
/// assert_eq!(quote_text("it's"), "'it''s'");
/// assert_eq!(quote_text(""), "''");
/// ```
#[must_use]
pub fn quote_text(raw: &str) -> String {
    format!("'{}'", escape(raw))
}

/// Quotes present text and maps blank input to `NULL`.
#[must_use]
pub fn optional_text(raw: &str) -> String {
    if raw.is_empty() {
        NULL.to_owned()
    } else {
        quote_text(raw)
    }
}

/// Emits a bare integer literal, or `NULL` for blank or non-numeric input.
///
/// # Example
///
/// ```
/// use csv_inserts::format::optional_integer;
///
/// assert_eq!(optional_integer("52428800"), "52428800");
/// assert_eq!(optional_integer(""), "NULL");
/// assert_eq!(optional_integer("50MB"), "NULL");
/// ```
#[must_use]
pub fn optional_integer(raw: &str) -> String {
    if raw.is_empty() {
        return NULL.to_owned();
    }
    raw.parse::<i64>().map_or_else(
        |err| {
            warn!(value = raw, error = %err, "non-numeric integer field replaced with NULL");
            NULL.to_owned()
        },
        |value| value.to_string(),
    )
}

/// Quotes a present identifier, or asks the server to generate a UUID.
///
/// # Example
///
/// ```
/// use csv_inserts::format::uuid_or_generated;
///
/// assert_eq!(uuid_or_generated(""), "gen_random_uuid()");
/// assert_eq!(
///     uuid_or_generated("3fa85f64-5717-4562-b3fc-2c963f66afa6"),
///     "'3fa85f64-5717-4562-b3fc-2c963f66afa6'"
/// );
/// ```
#[must_use]
pub fn uuid_or_generated(raw: &str) -> String {
    if raw.is_empty() {
        GENERATED_UUID.to_owned()
    } else {
        quote_text(raw)
    }
}

/// Maps loose truthy tokens to `true`; everything else is `false`.
///
/// # Example
///
/// ```
/// use csv_inserts::format::boolean;
///
/// assert_eq!(boolean("TRUE"), "true");
/// assert_eq!(boolean("yes"), "true");
/// assert_eq!(boolean("0"), "false");
/// assert_eq!(boolean(""), "false");
/// ```
#[must_use]
pub fn boolean(raw: &str) -> &'static str {
    let token = raw.trim();
    if TRUTHY
        .iter()
        .any(|truthy| token.eq_ignore_ascii_case(truthy))
    {
        "true"
    } else {
        "false"
    }
}

/// Formats a timestamp as a `timestamptz` literal.
///
/// Blank input and `null` give `NULL`, `now()` passes through as `NOW()`.
/// Recognised formats are normalised to ISO-8601; anything else is emitted
/// verbatim and left for the database to interpret.
///
/// # Example
///
/// ```
/// use csv_inserts::format::timestamp;
///
/// assert_eq!(
///     timestamp("2024-01-15 10:30:00+00"),
///     "'2024-01-15T10:30:00+00:00'::timestamptz"
/// );
/// assert_eq!(timestamp("now()"), "NOW()");
/// assert_eq!(timestamp(""), "NULL");
/// ```
#[must_use]
pub fn timestamp(raw: &str) -> String {
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return NULL.to_owned();
    }
    if raw.eq_ignore_ascii_case("now()") {
        return NOW.to_owned();
    }
    let iso = normalise_timestamp(raw).unwrap_or_else(|| {
        debug!(value = raw, "unrecognised timestamp passed through verbatim");
        raw.to_owned()
    });
    format!("{}::timestamptz", quote_text(&iso))
}

/// Formats a timestamp, substituting `blank` for empty input.
#[must_use]
pub fn timestamp_or(raw: &str, blank: &str) -> String {
    if raw.is_empty() {
        blank.to_owned()
    } else {
        timestamp(raw)
    }
}

/// Parses a supported timestamp and renders it as ISO-8601.
///
/// Returns `None` when no supported format matches.
#[must_use]
pub fn normalise_timestamp(raw: &str) -> Option<String> {
    let zulu = raw
        .strip_suffix('Z')
        .or_else(|| raw.strip_suffix('z'))
        .map(|head| format!("{head}+00:00"));
    let candidate = zulu.as_deref().unwrap_or(raw);

    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(candidate, fmt).ok())
        .map(|parsed| parsed.to_rfc3339_opts(SecondsFormat::AutoSi, false))
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(candidate, fmt).ok())
                .map(|parsed| parsed.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
        })
}

/// Formats a text array column as an `ARRAY[...]` constructor.
///
/// Input starting with `[` is read as a JSON array. Other non-blank input,
/// and JSON that fails to parse, is handled according to `fallback`.
///
/// # Example
///
/// ```
/// use csv_inserts::format::{ArrayFallback, text_array};
///
/// assert_eq!(
///     text_array(r#"["image/png","image/jpeg"]"#, ArrayFallback::Empty),
///     "ARRAY['image/png', 'image/jpeg']"
/// );
/// assert_eq!(
///     text_array("create table t ()", ArrayFallback::SingleValue),
///     "ARRAY['create table t ()']"
/// );
/// assert_eq!(text_array("", ArrayFallback::SingleValue), "ARRAY[]::text[]");
/// ```
#[must_use]
pub fn text_array(raw: &str, fallback: ArrayFallback) -> String {
    render_array(&array_elements(raw, fallback))
}

fn array_elements(raw: &str, fallback: ArrayFallback) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    if raw.starts_with('[') {
        match serde_json::from_str::<Vec<Value>>(raw) {
            Ok(values) => return values.iter().map(element_text).collect(),
            Err(err) => debug!(value = raw, error = %err, "array field is not valid JSON"),
        }
    }
    match fallback {
        ArrayFallback::SingleValue => vec![raw.to_owned()],
        ArrayFallback::Empty => Vec::new(),
    }
}

fn element_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn render_array(elements: &[String]) -> String {
    if elements.is_empty() {
        return "ARRAY[]::text[]".to_owned();
    }
    let quoted = elements
        .iter()
        .map(|element| quote_text(element))
        .collect::<Vec<_>>()
        .join(", ");
    format!("ARRAY[{quoted}]")
}

/// Formats a JSON column as a compact `jsonb` literal.
///
/// Blank or unparsable input becomes the empty object.
///
/// # Example
///
/// ```
/// use csv_inserts::format::jsonb;
///
/// assert_eq!(
///     jsonb(r#"{ "mimetype": "image/png", "size": 1024 }"#),
///     r#"'{"mimetype":"image/png","size":1024}'::jsonb"#
/// );
/// assert_eq!(jsonb("{broken"), "'{}'::jsonb");
/// ```
#[must_use]
pub fn jsonb(raw: &str) -> String {
    let value = if raw.is_empty() {
        empty_object()
    } else {
        serde_json::from_str::<Value>(raw).unwrap_or_else(|err| {
            warn!(error = %err, "invalid JSON field replaced with an empty object");
            empty_object()
        })
    };
    format!("{}::jsonb", quote_text(&value.to_string()))
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}
