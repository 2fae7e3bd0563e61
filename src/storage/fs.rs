use crate::storage::{StorageError, StorageResult};
use crate::url::MirrorTarget;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique suffix source for temporary files
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Filesystem storage for the mirror
///
/// File existence is the resume signal: a target that exists is complete.
/// Writes go through a temporary sibling file and a rename so an interrupted
/// write never leaves a partial file under the final name.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Creates storage rooted at the output directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The output directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a mirror target
    pub fn path_for(&self, target: &MirrorTarget) -> PathBuf {
        target.path_under(&self.root)
    }

    /// Creates the output directory if it does not exist yet
    pub async fn ensure_root(&self) -> StorageResult<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StorageError::CreateDir {
                path: self.root.clone(),
                source,
            })
    }

    /// Checks whether a target has already been written
    pub async fn exists(&self, target: &MirrorTarget) -> bool {
        let path = self.path_for(target);
        match tokio::fs::metadata(&path).await {
            Ok(meta) => meta.is_file(),
            Err(_) => false,
        }
    }

    /// Reads a previously written target
    pub async fn read(&self, target: &MirrorTarget) -> StorageResult<Vec<u8>> {
        let path = self.path_for(target);
        tokio::fs::read(&path)
            .await
            .map_err(|source| StorageError::Read { path, source })
    }

    /// Writes a target, creating parent directories first
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Location the file was written to
    /// * `Err(StorageError)` - Directory creation, write or rename failed
    pub async fn write(&self, target: &MirrorTarget, contents: &[u8]) -> StorageResult<PathBuf> {
        let path = self.path_for(target);
        let parent = path.parent().unwrap_or(&self.root).to_path_buf();

        tokio::fs::create_dir_all(&parent)
            .await
            .map_err(|source| StorageError::CreateDir {
                path: parent.clone(),
                source,
            })?;

        let temp = parent.join(format!(
            ".{}.{}.{}.part",
            target.filename,
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        if let Err(source) = tokio::fs::write(&temp, contents).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(StorageError::Write { path, source });
        }

        if let Err(source) = tokio::fs::rename(&temp, &path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(StorageError::Write { path, source });
        }

        tracing::trace!("Wrote {} bytes to {}", contents.len(), path.display());
        Ok(path)
    }
}
