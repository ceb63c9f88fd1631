//! Columnar layout of the analytical tables.
//!
//! Each output table is a [`ColumnarTable`]: it knows its directory name,
//! its partition columns, and how to turn a slice of rows into an Arrow
//! [`RecordBatch`] of the remaining (non-partition) columns. Partition
//! values live only in the Hive-style directory path, never in the files.

mod tables;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use crate::error::{Error, Result};

/// Directory value used for a partition column that is null or empty.
pub const HIVE_DEFAULT_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

/// A row type that can be persisted as a partitioned columnar table.
pub trait ColumnarTable: Sized {
    /// Table name, also the subdirectory under the output root.
    const NAME: &'static str;

    /// Partition columns, outermost directory first.
    const PARTITION_COLUMNS: &'static [&'static str];

    /// Schema of the data files, which excludes the partition columns.
    fn file_schema() -> SchemaRef;

    /// This row's partition values, in [`Self::PARTITION_COLUMNS`] order.
    fn partition_values(&self) -> Vec<Option<String>>;

    /// Builds one batch holding the file columns of `rows`.
    fn to_record_batch(rows: &[&Self]) -> Result<RecordBatch>;
}

/// Builds the relative partition directory, e.g. `year=2000/artist_id=A1`.
///
/// Returns an empty string for unpartitioned tables.
pub fn partition_path(columns: &[&str], values: &[Option<String>]) -> Result<String> {
    if columns.len() != values.len() {
        return Err(Error::InvalidData(format!(
            "{} partition values given for {} partition columns",
            values.len(),
            columns.len()
        )));
    }

    let segments: Vec<String> = columns
        .iter()
        .zip(values)
        .map(|(column, value)| {
            let value = match value.as_deref() {
                None | Some("") => HIVE_DEFAULT_PARTITION.to_string(),
                Some(v) => escape_path_name(v),
            };
            format!("{}={}", escape_path_name(column), value)
        })
        .collect();

    Ok(segments.join("/"))
}

/// Percent-escapes the characters that are unsafe inside a partition
/// directory name (`/`, `=`, `:`, `%`, control characters and friends).
pub fn escape_path_name(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if needs_escaping(c) {
            let code = u32::from(c);
            escaped.push('%');
            escaped.push(hex_digit(code >> 4));
            escaped.push(hex_digit(code & 0xF));
        } else {
            escaped.push(c);
        }
    }
    escaped
}

fn hex_digit(n: u32) -> char {
    char::from_digit(n, 16).map_or('0', |d| d.to_ascii_uppercase())
}

fn needs_escaping(c: char) -> bool {
    matches!(
        c,
        '\u{01}'..='\u{1F}'
            | '"'
            | '#'
            | '%'
            | '\''
            | '*'
            | '/'
            | ':'
            | '='
            | '?'
            | '\\'
            | '\u{7F}'
            | '{'
            | '['
            | ']'
            | '^'
    )
}
