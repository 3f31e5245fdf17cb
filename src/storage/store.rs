//! Object store trait
//!
//! The narrow storage surface the request orchestrator depends on. Whole
//! directory transfers are provided on top of the single-object calls.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use super::location::ObjectLocation;
use super::types::ObjectMetadata;
use crate::error::StorageError;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Download one object to a local file, creating parent directories
    async fn fetch(&self, location: &ObjectLocation, dest: &Path) -> Result<(), StorageError>;

    /// Upload one local file
    async fn store(&self, src: &Path, location: &ObjectLocation) -> Result<(), StorageError>;

    /// List every object under `prefix` (all pages)
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectMetadata>, StorageError>;

    /// Upload every file below `dir`, keyed by its path relative to `dir`
    ///
    /// Returns the number of files uploaded. Stops at the first failure.
    async fn store_dir(&self, dir: &Path, bucket: &str, prefix: &str) -> Result<usize, StorageError> {
        let files = local_files(dir).await?;
        for file in &files {
            let relative = file.strip_prefix(dir).map_err(|e| {
                StorageError::SdkError(format!("{} is outside {}: {}", file.display(), dir.display(), e))
            })?;
            let location = ObjectLocation::new(bucket, join_key(prefix, relative));
            self.store(file, &location).await?;
        }
        tracing::info!("Uploaded {} files from {} to s3://{}/{}", files.len(), dir.display(), bucket, prefix);
        Ok(files.len())
    }

    /// Download every object under `prefix` into `dest`, mirroring key paths
    ///
    /// Directory markers are skipped. Returns the number of files written.
    async fn fetch_dir(&self, bucket: &str, prefix: &str, dest: &Path) -> Result<usize, StorageError> {
        let objects = self.list(bucket, prefix).await?;
        let mut count = 0;
        for object in objects {
            let Some(relative) = object.key.strip_prefix(prefix) else {
                continue;
            };
            let relative = relative.trim_start_matches('/');
            if relative.is_empty() || relative.ends_with('/') {
                continue;
            }
            let local = local_path(dest, relative).ok_or_else(|| {
                StorageError::SdkError(format!("Refusing to write {} outside {}", object.key, dest.display()))
            })?;
            self.fetch(&ObjectLocation::new(bucket, object.key.as_str()), &local).await?;
            count += 1;
        }
        tracing::info!("Downloaded {} files from s3://{}/{} to {}", count, bucket, prefix, dest.display());
        Ok(count)
    }
}

/// All regular files below `dir`, in sorted order
async fn local_files(dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&current).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                files.push(entry.path());
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Object key for a relative local path, always `/`-separated
fn join_key(prefix: &str, relative: &Path) -> String {
    let relative: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let relative = relative.join("/");
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        relative
    } else {
        format!("{}/{}", prefix, relative)
    }
}

/// Local destination for a relative key, rejecting `..` and absolute parts
fn local_path(dest: &Path, relative_key: &str) -> Option<PathBuf> {
    let relative = Path::new(relative_key);
    if relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        Some(dest.join(relative))
    } else {
        None
    }
}
