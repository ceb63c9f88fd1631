use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use walkdir::WalkDir;

use crate::error::EtlResult;

use super::ObjectBackend;

/// Backend rooted at a directory on the local filesystem.
#[derive(Debug)]
pub struct LocalBackend {
    root: PathBuf,
    url: String,
}

impl LocalBackend {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        let url = root.display().to_string();
        Self { root, url }
    }

    fn resolve(&self, key: &str) -> PathBuf {
        key.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part))
    }

    fn to_key(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }

    fn walk_files(&self, dir: &Path, depth: Option<usize>) -> EtlResult<Vec<PathBuf>> {
        let mut walker = WalkDir::new(dir).follow_links(true);
        if let Some(depth) = depth {
            walker = walker.min_depth(depth).max_depth(depth);
        }

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.io_error().map(|io| io.kind()) == Some(ErrorKind::NotFound) => {
                    continue;
                }
                Err(e) => return Err(std::io::Error::from(e).into()),
            };
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

#[async_trait]
impl ObjectBackend for LocalBackend {
    fn url(&self) -> &str {
        &self.url
    }

    async fn list(&self, prefix: &str, depth: usize) -> EtlResult<Vec<String>> {
        let dir = self.resolve(prefix);
        let mut keys: Vec<String> = self
            .walk_files(&dir, Some(depth))?
            .iter()
            .filter_map(|path| self.to_key(path))
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn get(&self, key: &str) -> EtlResult<Bytes> {
        let bytes = tokio::fs::read(self.resolve(key)).await?;
        Ok(Bytes::from(bytes))
    }

    async fn put(&self, key: &str, bytes: Bytes) -> EtlResult<()> {
        let path = self.resolve(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> EtlResult<usize> {
        let dir = self.resolve(prefix);
        if dir == self.root {
            // Never wipe the whole root through an empty prefix.
            return Ok(0);
        }

        let removed = self.walk_files(&dir, None)?.len();
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(removed),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}
