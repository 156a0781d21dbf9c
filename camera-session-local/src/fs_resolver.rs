use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use camera_session_core::models::captured_file::FileEntry;
use camera_session_core::models::error::PersistenceError;
use camera_session_core::traits::path_resolver::PathResolver;

/// Path resolver over a root directory on the local filesystem.
///
/// Logical directory names map to direct children of the root.
pub struct FsPathResolver {
    root: PathBuf,
}

impl FsPathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn directory(&self, name: &str) -> Result<PathBuf, PersistenceError> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(PersistenceError::UnderlyingIoFailure(format!(
                "invalid directory name {:?}",
                name
            )));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl PathResolver for FsPathResolver {
    async fn resolve_directory_path(&self, name: &str) -> Result<PathBuf, PersistenceError> {
        let dir = self.directory(name)?;
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    async fn resolve_unique_path(&self, directory: &str, file_name: &str) -> Result<PathBuf, PersistenceError> {
        let dir = self.resolve_directory_path(directory).await?;
        let candidate = Path::new(file_name);
        let stem = candidate
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PersistenceError::UnderlyingIoFailure(format!("invalid file name {:?}", file_name)))?;
        let extension = candidate.extension().and_then(|e| e.to_str());

        let mut path = dir.join(file_name);
        let mut suffix = 1;
        while tokio::fs::try_exists(&path).await? {
            let name = match extension {
                Some(ext) => format!("{}-{}.{}", stem, suffix, ext),
                None => format!("{}-{}", stem, suffix),
            };
            path = dir.join(name);
            suffix += 1;
        }
        Ok(path)
    }

    async fn list_directory(&self, directory: &str) -> Result<Vec<FileEntry>, PersistenceError> {
        let dir = self.directory(directory)?;
        let mut reader = match tokio::fs::read_dir(&dir).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            entries.push(FileEntry {
                path: entry.path(),
                modified_at: DateTime::<Utc>::from(metadata.modified()?),
            });
        }
        Ok(entries)
    }
}
