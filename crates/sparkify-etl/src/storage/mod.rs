//! Storage backends for the input tree and the output root.
//!
//! A run talks to storage only through [`ObjectBackend`]: keys are
//! `/`-separated and relative to the backend root. Local paths are served
//! by [`LocalBackend`], `s3://` and `s3a://` URLs by [`S3Backend`].

mod local;
mod s3;

pub use local::LocalBackend;
pub use s3::S3Backend;

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use bytes::Bytes;
use regex::Regex;

use crate::config::StorageConfig;
use crate::error::{EtlError, EtlResult};

static S3_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[sS]3[aA]?://(?P<bucket>[a-z0-9\-\.]+)/?(?P<key>.*)$")
        .expect("S3 URL pattern is valid")
});

static FILE_URI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^file://(?P<path>.+)$").expect("file URI pattern is valid"));

static ANY_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*://").expect("scheme pattern is valid")
});

/// A flat key/value object store rooted at one location.
#[async_trait]
pub trait ObjectBackend: Send + Sync + fmt::Debug {
    /// Display form of the backend root, used in logs and errors.
    fn url(&self) -> &str;

    /// Lists the keys exactly `depth` components below `prefix`, sorted.
    ///
    /// A prefix that does not exist lists as empty.
    async fn list(&self, prefix: &str, depth: usize) -> EtlResult<Vec<String>>;

    /// Reads a whole object.
    async fn get(&self, key: &str) -> EtlResult<Bytes>;

    /// Writes a whole object, replacing any previous content.
    async fn put(&self, key: &str, bytes: Bytes) -> EtlResult<()>;

    /// Deletes every object under `prefix` and returns how many were removed.
    async fn delete_prefix(&self, prefix: &str) -> EtlResult<usize>;
}

/// Where a backend is rooted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Local(PathBuf),
    S3 { bucket: String, prefix: String },
}

impl Location {
    /// Parses a local path, `file://` URI, or `s3://`/`s3a://` URL.
    pub fn parse(location: &str) -> EtlResult<Self> {
        if let Some(caps) = S3_URL.captures(location) {
            return Ok(Self::S3 {
                bucket: caps["bucket"].to_string(),
                prefix: caps["key"].trim_end_matches('/').to_string(),
            });
        }

        if let Some(caps) = FILE_URI.captures(location) {
            return Ok(Self::Local(PathBuf::from(&caps["path"])));
        }

        if location.is_empty() || ANY_SCHEME.is_match(location) {
            return Err(EtlError::InvalidLocation {
                location: location.to_string(),
            });
        }

        Ok(Self::Local(PathBuf::from(location)))
    }

    /// Whether reaching this location needs storage credentials.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::S3 { .. })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::S3 { bucket, prefix } if prefix.is_empty() => write!(f, "s3://{bucket}"),
            Self::S3 { bucket, prefix } => write!(f, "s3://{bucket}/{prefix}"),
        }
    }
}

/// Opens a backend for `location`.
///
/// Local roots are created when `create` is set. Remote roots require an
/// access key id and secret in `storage`.
pub async fn open_backend(
    location: &Location,
    storage: &StorageConfig,
    create: bool,
) -> EtlResult<Arc<dyn ObjectBackend>> {
    match location {
        Location::Local(path) => {
            if create {
                tokio::fs::create_dir_all(path).await?;
            }
            Ok(Arc::new(LocalBackend::new(path.clone())))
        }
        Location::S3 { bucket, prefix } => {
            let backend = S3Backend::connect(bucket, prefix, storage)?;
            Ok(Arc::new(backend))
        }
    }
}

/// Joins key segments with `/`, skipping empty ones.
pub(crate) fn join_key(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
