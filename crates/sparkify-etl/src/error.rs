//! Error types for the ETL pipeline.

use thiserror::Error;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum EtlError {
    /// No file matched a record family's path pattern.
    #[error("no input files match {pattern}")]
    NoInputFiles { pattern: String },

    /// A line of an input file is not a well-formed record.
    #[error("malformed record at {path}:{line}: {source}")]
    Parse {
        path: String,
        line: usize,
        source: serde_json::Error,
    },

    /// A line of an input file is valid JSON but not an object.
    #[error("malformed record at {path}:{line}: expected a JSON object")]
    NotAnObject { path: String, line: usize },

    /// An input file is not UTF-8 text.
    #[error("{path} is not valid UTF-8")]
    InvalidUtf8 { path: String },

    /// A location string names no supported backend.
    #[error("unsupported storage location: {location}")]
    InvalidLocation { location: String },

    /// A key cannot be used as an object store path.
    #[error("invalid object key {key}: {source}")]
    InvalidKey {
        key: String,
        source: object_store::path::Error,
    },

    /// A remote location was configured without usable credentials.
    #[error("missing storage credentials for {location}: {missing} not set")]
    MissingCredentials {
        location: String,
        missing: &'static str,
    },

    /// An error propagated from the object store.
    #[error("storage error: {0}")]
    Storage(#[from] object_store::Error),

    /// A local filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parquet encoding failed.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Building a table batch failed.
    #[error("table error: {0}")]
    Table(#[from] sparkify_core::Error),
}

impl EtlError {
    /// Returns `true` when the run failed because its input could not be
    /// located or parsed.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::NoInputFiles { .. }
                | Self::Parse { .. }
                | Self::NotAnObject { .. }
                | Self::InvalidUtf8 { .. }
        )
    }

    /// Returns `true` when the run failed at bootstrap for lack of
    /// credentials.
    pub fn is_credential_error(&self) -> bool {
        matches!(self, Self::MissingCredentials { .. })
    }
}

/// Convenience alias for pipeline results.
pub type EtlResult<T> = std::result::Result<T, EtlError>;
