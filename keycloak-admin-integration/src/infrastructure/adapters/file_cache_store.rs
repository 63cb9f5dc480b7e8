use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::ports::CacheStore;
use crate::domain::errors::CacheError;

/// Cache store persisted as a single JSON document.
///
/// Survives process restarts, which lets a CLI reuse tokens obtained by a
/// previous run. Each write goes through a uniquely named temporary file in
/// the same directory and is renamed over the target, so readers never see a
/// partial document.
///
/// Read-modify-write is serialised only within one process. Two processes
/// writing the same file concurrently can lose each other's updates.
#[derive(Debug)]
pub struct FileCacheStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>, CacheError> {
        let document = match tokio::fs::read_to_string(&self.path).await {
            Ok(document) => document,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if document.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&document).map_err(|e| CacheError::Serialization {
            message: format!("{}: {e}", self.path.display()),
        })
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), CacheError> {
        let document =
            serde_json::to_string_pretty(entries).map_err(|e| CacheError::Serialization {
                message: e.to_string(),
            })?;

        let directory = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&directory)
            .await
            .map_err(|e| self.io_error(e))?;

        let target = self.path.clone();
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut staging = tempfile::NamedTempFile::new_in(&directory)?;
            staging.write_all(document.as_bytes())?;
            staging.as_file().sync_all()?;
            staging.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| CacheError::Unavailable {
            message: format!("cache writer task failed: {e}"),
        })?
        .map_err(|e| self.io_error(e))
    }

    fn io_error(&self, err: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.display().to_string(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl CacheStore for FileCacheStore {
    async fn put(&self, key: &str, value: String) -> Result<(), CacheError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value);
        debug!("cache put {} ({})", key, self.path.display());
        self.write_entries(&entries).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_entries().await?.remove(key))
    }

    async fn has(&self, key: &str) -> Result<bool, CacheError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_entries().await?.contains_key(key))
    }

    async fn forget(&self, key: &str) -> Result<bool, CacheError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        if entries.remove(key).is_none() {
            return Ok(false);
        }
        self.write_entries(&entries).await?;
        Ok(true)
    }
}
