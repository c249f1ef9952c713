//! # snapcode FileSystem Store
//!
//! A local filesystem [`AssetStore`] for snapcode. One instance manages one
//! flat directory, so a server uses two: the asset store and the code store.
//!
//! ## Features
//!
//! * **Atomic Writes**: Data goes to a hidden temporary file that is renamed into place,
//!   so listings and downloads never see a partial file.
//! * **Contained Paths**: Names that could escape the directory are treated as missing,
//!   and refused outright when writing.
//!
//! ## Usage
//!
//! ```no_run
//! use snapcode_fs::FileSystemStore;
//!
//! let assets = FileSystemStore::new("./uploads");
//! ```

use bytes::Bytes;
use snapcode_core::prelude::*;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

async fn atomic_write(path: &Path, data: Bytes) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(StorageError::Io)?;
    }

    let tmp_path = temp_path(path);

    fs::write(&tmp_path, data).await.map_err(StorageError::Io)?;
    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(StorageError::Io(e));
    }

    Ok(())
}

/// `<dir>/.<name>.tmp`, hidden so that listings skip it.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

#[derive(Clone, Debug)]
pub struct FileSystemStore {
    root: PathBuf,
}

impl FileSystemStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { root: path.into() }
    }

    /// Creates the backing directory if it is missing.
    pub async fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(StorageError::Io)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn get_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        if is_safe_name(name) {
            Ok(self.root.join(name))
        } else {
            Err(StorageError::NotFound(name.to_string()))
        }
    }
}

impl AssetStore for FileSystemStore {
    async fn write(&self, name: &str, data: Bytes) -> Result<(), StorageError> {
        if !is_safe_name(name) {
            return Err(StorageError::Generic(format!(
                "Refusing to write '{name}' outside {}",
                self.root.display()
            )));
        }
        let path = self.root.join(name);
        atomic_write(&path, data).await?;
        debug!(path = %path.display(), "Stored file");
        Ok(())
    }

    async fn read(&self, name: &str) -> Result<Bytes, StorageError> {
        let path = self.get_path(name)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        match self.get_path(name) {
            Ok(path) => Ok(fs::try_exists(path).await?),
            Err(_) => Ok(false),
        }
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.get_path(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with('.') {
                names.push(name);
            }
        }
        Ok(names)
    }
}
