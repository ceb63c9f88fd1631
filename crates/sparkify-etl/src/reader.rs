//! Reads the raw record families from the input tree.

use serde::de::DeserializeOwned;
use sparkify_core::model::{CatalogRecord, EventRecord};

use crate::error::{EtlError, EtlResult};
use crate::storage::ObjectBackend;

/// Catalog records live exactly four levels below this prefix.
pub const CATALOG_PREFIX: &str = "song_data";
const CATALOG_DEPTH: usize = 4;

/// Event records live exactly three levels below this prefix.
pub const EVENTS_PREFIX: &str = "log_data";
const EVENTS_DEPTH: usize = 3;

const RECORD_EXTENSION: &str = ".json";

/// Loads newline-delimited JSON records from an input backend.
///
/// Files are visited in lexicographic key order and lines in file order,
/// which fixes the encounter order used when deduplicating.
#[derive(Debug, Clone, Copy)]
pub struct RecordReader<'a> {
    backend: &'a dyn ObjectBackend,
}

impl<'a> RecordReader<'a> {
    pub fn new(backend: &'a dyn ObjectBackend) -> Self {
        Self { backend }
    }

    /// Reads every record matching `song_data/*/*/*/*.json`.
    pub async fn read_catalog(&self) -> EtlResult<Vec<CatalogRecord>> {
        self.read_family(CATALOG_PREFIX, CATALOG_DEPTH).await
    }

    /// Reads every record matching `log_data/*/*/*.json`.
    pub async fn read_events(&self) -> EtlResult<Vec<EventRecord>> {
        self.read_family(EVENTS_PREFIX, EVENTS_DEPTH).await
    }

    async fn read_family<T: DeserializeOwned>(
        &self,
        prefix: &str,
        depth: usize,
    ) -> EtlResult<Vec<T>> {
        let keys: Vec<String> = self
            .backend
            .list(prefix, depth)
            .await?
            .into_iter()
            .filter(|key| key.ends_with(RECORD_EXTENSION))
            .collect();

        if keys.is_empty() {
            return Err(EtlError::NoInputFiles {
                pattern: pattern(self.backend.url(), prefix, depth),
            });
        }

        let mut records = Vec::new();
        for key in &keys {
            let bytes = self.backend.get(key).await?;
            let parsed: Vec<T> = parse_records(key, &bytes)?;
            log::debug!("Read {} records from {}", parsed.len(), key);
            records.extend(parsed);
        }

        log::info!(
            "Loaded {} records from {} files under {}",
            records.len(),
            keys.len(),
            prefix
        );
        Ok(records)
    }
}

/// Parses one file of newline-delimited JSON objects.
///
/// Blank lines are skipped; line numbers in errors are 1-based. Every
/// other line must hold a JSON object: arrays and scalars are rejected even
/// though serde would map a sequence onto the record's fields.
pub fn parse_records<T: DeserializeOwned>(path: &str, bytes: &[u8]) -> EtlResult<Vec<T>> {
    let text = std::str::from_utf8(bytes).map_err(|_| EtlError::InvalidUtf8 {
        path: path.to_string(),
    })?;

    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let parse_error = |source| EtlError::Parse {
            path: path.to_string(),
            line: index + 1,
            source,
        };

        let value: serde_json::Value = serde_json::from_str(line).map_err(parse_error)?;
        if !value.is_object() {
            return Err(EtlError::NotAnObject {
                path: path.to_string(),
                line: index + 1,
            });
        }
        records.push(serde_json::from_value(value).map_err(parse_error)?);
    }
    Ok(records)
}

fn pattern(root: &str, prefix: &str, depth: usize) -> String {
    let mut pattern = format!("{}/{}", root.trim_end_matches('/'), prefix);
    for _ in 1..depth {
        pattern.push_str("/*");
    }
    pattern.push_str("/*");
    pattern.push_str(RECORD_EXTENSION);
    pattern
}
