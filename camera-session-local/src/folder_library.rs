//! Media library backed by plain folders.
//!
//! Each album is a directory under the library root. Every asset is stored
//! under a fresh UUID file name, with a JSON sidecar carrying its kind,
//! creation time and SHA-256 checksum.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use camera_session_core::models::captured_file::{Asset, MediaKind};
use camera_session_core::models::error::PersistenceError;
use camera_session_core::traits::library::MediaLibrary;

use crate::metadata::{self, AssetMetadata};

pub struct FolderLibrary {
    root: PathBuf,
}

impl FolderLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn album_dir(&self, album: &str) -> Result<PathBuf, PersistenceError> {
        if album.is_empty() || album.contains(['/', '\\']) || album == ".." {
            return Err(PersistenceError::UnderlyingIoFailure(format!("invalid album name {:?}", album)));
        }
        let dir = self.root.join(album);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    async fn record(
        &self,
        asset_path: &Path,
        id: String,
        kind: MediaKind,
        size_bytes: u64,
        checksum: String,
        source_name: Option<String>,
    ) -> Result<(), PersistenceError> {
        let file_name = asset_path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_default();
        let record = AssetMetadata {
            id,
            kind,
            created_at: Utc::now(),
            file_name,
            size_bytes,
            checksum,
            source_name,
        };
        if let Err(e) = metadata::write_metadata(&record, asset_path).await {
            // An asset without a sidecar is invisible to fetch_recent.
            let _ = tokio::fs::remove_file(asset_path).await;
            return Err(e);
        }
        log::info!("Stored {:?} asset {} ({} bytes)", kind, record.id, size_bytes);
        Ok(())
    }
}

fn default_extension(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Photo => "jpg",
        MediaKind::Video => "mp4",
    }
}

#[async_trait]
impl MediaLibrary for FolderLibrary {
    async fn add_bytes(&self, album: &str, bytes: &[u8], kind: MediaKind) -> Result<(), PersistenceError> {
        let dir = self.album_dir(album).await?;
        let id = Uuid::new_v4().to_string();
        let path = dir.join(format!("{}.{}", id, default_extension(kind)));

        tokio::fs::write(&path, bytes).await?;
        self.record(&path, id, kind, bytes.len() as u64, metadata::sha256_bytes(bytes), None)
            .await
    }

    async fn add_file(&self, album: &str, path: &Path, kind: MediaKind) -> Result<(), PersistenceError> {
        let dir = self.album_dir(album).await?;
        let id = Uuid::new_v4().to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_else(|| default_extension(kind));
        let target = dir.join(format!("{}.{}", id, extension));

        let size_bytes = tokio::fs::copy(path, &target).await?;
        let checksum = metadata::sha256_file(&target).await?;
        let source_name = path.file_name().and_then(|n| n.to_str()).map(str::to_string);
        self.record(&target, id, kind, size_bytes, checksum, source_name).await
    }

    async fn fetch_recent(
        &self,
        album: &str,
        kind: MediaKind,
        limit: usize,
    ) -> Result<Vec<Asset>, PersistenceError> {
        let dir = self.album_dir(album).await?;
        let mut reader = tokio::fs::read_dir(&dir).await?;

        let mut assets = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let path = entry.path();
            if !metadata::is_sidecar(&path) {
                continue;
            }
            let record = match metadata::read_metadata(&path).await {
                Ok(record) => record,
                Err(e) => {
                    log::warn!("Skipping unreadable sidecar {}: {}", path.display(), e);
                    continue;
                }
            };
            if record.kind != kind {
                continue;
            }
            assets.push(Asset {
                location: dir.join(&record.file_name),
                id: record.id,
                kind: record.kind,
                created_at: record.created_at,
            });
        }

        assets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if limit > 0 {
            assets.truncate(limit);
        }
        Ok(assets)
    }
}
