use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};

use crate::config::StorageConfig;
use crate::error::{EtlError, EtlResult};

use super::{join_key, ObjectBackend};

/// Backend rooted at a bucket prefix in S3 (or an S3-compatible endpoint).
#[derive(Debug)]
pub struct S3Backend {
    store: Arc<dyn ObjectStore>,
    prefix: String,
    url: String,
}

impl S3Backend {
    /// Builds a client from explicit credentials.
    ///
    /// Nothing is read from the process environment; the access key id and
    /// secret must both be present in `storage`.
    pub fn connect(bucket: &str, prefix: &str, storage: &StorageConfig) -> EtlResult<Self> {
        let url = if prefix.is_empty() {
            format!("s3://{bucket}")
        } else {
            format!("s3://{bucket}/{prefix}")
        };

        let access_key_id =
            storage
                .access_key_id
                .as_deref()
                .ok_or_else(|| EtlError::MissingCredentials {
                    location: url.clone(),
                    missing: "storage.access_key_id",
                })?;
        let secret_access_key =
            storage
                .secret_access_key
                .as_deref()
                .ok_or_else(|| EtlError::MissingCredentials {
                    location: url.clone(),
                    missing: "storage.secret_access_key",
                })?;

        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_access_key_id(access_key_id)
            .with_secret_access_key(secret_access_key);

        if let Some(token) = &storage.session_token {
            builder = builder.with_token(token);
        }
        if let Some(region) = &storage.region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = &storage.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_virtual_hosted_style_request(false)
                .with_allow_http(true);
        }

        let store: Arc<dyn ObjectStore> = Arc::new(builder.build()?);
        log::debug!("Connected S3 backend at {url}");

        Ok(Self::with_store(store, prefix, url))
    }

    pub(crate) fn with_store(store: Arc<dyn ObjectStore>, prefix: &str, url: String) -> Self {
        Self {
            store,
            prefix: join_key(&[prefix]),
            url,
        }
    }

    /// Maps a backend key onto an object path.
    ///
    /// Keys already carry partition escaping, so they are parsed as-is
    /// rather than encoded a second time.
    fn qualify(&self, key: &str) -> EtlResult<Path> {
        let full = join_key(&[&self.prefix, key]);
        match Path::parse(&full) {
            Ok(path) => Ok(path),
            Err(source) => Err(EtlError::InvalidKey { key: full, source }),
        }
    }

    fn root_depth(&self) -> usize {
        segments(&self.prefix).count()
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

#[async_trait]
impl ObjectBackend for S3Backend {
    fn url(&self) -> &str {
        &self.url
    }

    async fn list(&self, prefix: &str, depth: usize) -> EtlResult<Vec<String>> {
        let listing_root = self.qualify(prefix)?;
        let wanted = segments(listing_root.as_ref()).count() + depth;
        let root_depth = self.root_depth();

        let objects: Vec<_> = self.store.list(Some(&listing_root)).try_collect().await?;

        let mut keys: Vec<String> = objects
            .iter()
            .map(|meta| -> &str { meta.location.as_ref() })
            .filter(|location| segments(location).count() == wanted)
            .map(|location| {
                segments(location)
                    .skip(root_depth)
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn get(&self, key: &str) -> EtlResult<Bytes> {
        let bytes = self.store.get(&self.qualify(key)?).await?.bytes().await?;
        Ok(bytes)
    }

    async fn put(&self, key: &str, bytes: Bytes) -> EtlResult<()> {
        self.store
            .put(&self.qualify(key)?, PutPayload::from(bytes))
            .await?;
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> EtlResult<usize> {
        if join_key(&[prefix]).is_empty() {
            return Ok(0);
        }

        let objects: Vec<_> = self
            .store
            .list(Some(&self.qualify(prefix)?))
            .try_collect()
            .await?;

        for meta in &objects {
            self.store.delete(&meta.location).await?;
        }
        Ok(objects.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    fn in_memory(prefix: &str) -> S3Backend {
        S3Backend::with_store(
            Arc::new(InMemory::new()),
            prefix,
            format!("s3://lake-bucket/{prefix}"),
        )
    }

    async fn put_all(backend: &S3Backend, keys: &[&str]) {
        for key in keys {
            backend
                .put(key, Bytes::from(key.to_string()))
                .await
                .unwrap();
        }
    }

    fn credentials() -> StorageConfig {
        StorageConfig {
            access_key_id: Some("AKIDEXAMPLE".to_string()),
            secret_access_key: Some("secret".to_string()),
            region: Some("us-west-2".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_connect_with_explicit_credentials() {
        let backend = S3Backend::connect("lake-bucket", "sparkify", &credentials()).unwrap();
        assert_eq!(backend.url(), "s3://lake-bucket/sparkify");
        assert_eq!(backend.root_depth(), 1);
        assert_eq!(
            backend.qualify("songs/_SUCCESS").unwrap().as_ref(),
            "sparkify/songs/_SUCCESS"
        );
    }

    #[test]
    fn test_connect_without_secret_fails() {
        let storage = StorageConfig {
            secret_access_key: None,
            ..credentials()
        };
        let err = S3Backend::connect("lake-bucket", "", &storage).unwrap_err();
        assert!(err.is_credential_error());
        assert!(err.to_string().contains("storage.secret_access_key"));
    }

    #[test]
    fn test_connect_without_key_id_fails() {
        let err = S3Backend::connect("lake-bucket", "", &StorageConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            EtlError::MissingCredentials {
                missing: "storage.access_key_id",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_list_is_depth_exact_under_prefix() {
        let backend = in_memory("lake/raw");
        put_all(
            &backend,
            &[
                "song_data/A/B/C/TRB.json",
                "song_data/A/B/C/TRA.json",
                "song_data/A/B/shallow.json",
                "song_data/A/B/C/D/deep.json",
                "log_data/2018/11/events.json",
            ],
        )
        .await;

        let keys = backend.list("song_data", 4).await.unwrap();
        assert_eq!(
            keys,
            vec![
                "song_data/A/B/C/TRA.json".to_string(),
                "song_data/A/B/C/TRB.json".to_string(),
            ]
        );
        assert!(backend.list("missing", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let backend = in_memory("lake");
        backend
            .put("songs/_SUCCESS", Bytes::from_static(b"done"))
            .await
            .unwrap();

        let bytes = backend.get("songs/_SUCCESS").await.unwrap();
        assert_eq!(&bytes[..], b"done");
        assert!(backend.get("songs/missing").await.is_err());
    }

    #[tokio::test]
    async fn test_escaped_partition_keys_are_stored_verbatim() {
        let backend = in_memory("lake");
        let key = "songs/year=2000/artist_id=AC%2FDC/part-00000.snappy.parquet";
        put_all(&backend, &[key]).await;

        assert_eq!(
            backend.qualify(key).unwrap().as_ref(),
            "lake/songs/year=2000/artist_id=AC%2FDC/part-00000.snappy.parquet"
        );

        let keys = backend.list("songs", 3).await.unwrap();
        assert_eq!(keys, vec![key.to_string()]);
        let bytes = backend.get(&keys[0]).await.unwrap();
        assert_eq!(&bytes[..], key.as_bytes());
    }

    #[tokio::test]
    async fn test_delete_prefix_leaves_other_tables() {
        let backend = in_memory("lake");
        put_all(
            &backend,
            &[
                "songs/year=2000/artist_id=A1/a.parquet",
                "songs/_SUCCESS",
                "songs_archive/a.parquet",
                "artists/b.parquet",
            ],
        )
        .await;

        assert_eq!(backend.delete_prefix("songs").await.unwrap(), 2);
        assert!(backend.list("songs", 3).await.unwrap().is_empty());
        assert_eq!(backend.list("songs_archive", 1).await.unwrap().len(), 1);
        assert_eq!(backend.list("artists", 1).await.unwrap().len(), 1);
        assert_eq!(backend.delete_prefix("").await.unwrap(), 0);
    }
}
