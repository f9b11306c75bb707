use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Prefix every stored `file_url` starts with; the static route serves it.
pub const PUBLIC_PREFIX: &str = "uploads";
/// Stem used when the request carries no usable `name` field.
pub const DEFAULT_STEM: &str = "file";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to create upload directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("refusing to resolve file url {0}")]
    InvalidUrl(String),
}

/// A file that has been written under the upload root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub file_url: String,
    pub path: PathBuf,
}

/// Local-disk placement for uploaded files: `<root>/<folder>/<stem>_<millis><ext>`.
#[derive(Debug, Clone)]
pub struct UploadStorage {
    root: PathBuf,
}

impl UploadStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<stem>_<millis><ext>`. The stem is the product name with all whitespace
    /// removed; path separators never survive into it.
    pub fn file_name(product_name: Option<&str>, original_name: &str, epoch_millis: i64) -> String {
        let stem: String = product_name
            .unwrap_or_default()
            .split_whitespace()
            .collect::<String>()
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        let stem = if stem.is_empty() { DEFAULT_STEM.to_string() } else { stem };

        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        format!("{}_{}{}", stem, epoch_millis, ext)
    }

    /// Writes `data` to `<root>/<folder>/<file_name>`, creating the folder if needed.
    /// An existing file with the same name is overwritten.
    pub async fn put_object(
        &self,
        folder: &str,
        file_name: &str,
        data: &[u8],
    ) -> Result<StoredFile, StorageError> {
        let dir = self.root.join(folder);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StorageError::CreateDir {
                path: dir.clone(),
                source,
            })?;

        let path = dir.join(file_name);
        tokio::fs::write(&path, data)
            .await
            .map_err(|source| StorageError::Write {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), bytes = data.len(), "Stored upload");
        Ok(StoredFile {
            file_url: format!("{}/{}/{}", PUBLIC_PREFIX, folder, file_name),
            path,
        })
    }

    /// Maps a stored `file_url` back to its path under the root.
    pub fn resolve(&self, file_url: &str) -> Result<PathBuf, StorageError> {
        let relative = file_url
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| StorageError::InvalidUrl(file_url.to_string()))?;

        let relative = Path::new(relative);
        let safe = relative.components().count() > 0
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !safe {
            return Err(StorageError::InvalidUrl(file_url.to_string()));
        }

        Ok(self.root.join(relative))
    }

    /// Removes the file behind `file_url`. A file that is already gone is not an error.
    pub async fn delete_object(&self, file_url: &str) -> Result<(), StorageError> {
        let path = self.resolve(file_url)?;
        remove_path(path).await
    }

    /// Best-effort removal used when rolling back staged files.
    pub async fn discard(&self, files: &[StoredFile]) {
        for file in files {
            if let Err(e) = remove_path(file.path.clone()).await {
                tracing::warn!("Failed to discard staged upload: {}", e);
            }
        }
    }
}

async fn remove_path(path: PathBuf) -> Result<(), StorageError> {
    match tokio::fs::remove_file(&path).await {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Removed upload");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StorageError::Remove { path, source }),
    }
}
