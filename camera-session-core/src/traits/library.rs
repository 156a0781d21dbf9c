use std::path::Path;

use async_trait::async_trait;

use crate::models::captured_file::{Asset, MediaKind};
use crate::models::error::PersistenceError;

/// Durable media store that captured photos and videos are handed to.
///
/// Implemented by:
/// - `FolderLibrary` (camera-session-local)
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    async fn add_bytes(&self, album: &str, bytes: &[u8], kind: MediaKind) -> Result<(), PersistenceError>;

    async fn add_file(&self, album: &str, path: &Path, kind: MediaKind) -> Result<(), PersistenceError>;

    /// Up to `limit` assets of `kind`, newest first. `0` returns all of them.
    async fn fetch_recent(
        &self,
        album: &str,
        kind: MediaKind,
        limit: usize,
    ) -> Result<Vec<Asset>, PersistenceError>;
}
