use std::path::PathBuf;

use async_trait::async_trait;

use crate::models::captured_file::FileEntry;
use crate::models::error::PersistenceError;

/// Maps logical directory and file names onto real paths.
///
/// Implemented by:
/// - `FsPathResolver` (camera-session-local)
#[async_trait]
pub trait PathResolver: Send + Sync {
    /// Path of the directory called `name`, created if absent.
    async fn resolve_directory_path(&self, name: &str) -> Result<PathBuf, PersistenceError>;

    /// A path for `file_name` inside `directory` that no existing file occupies.
    async fn resolve_unique_path(&self, directory: &str, file_name: &str) -> Result<PathBuf, PersistenceError>;

    /// Regular files inside `directory`, in no particular order.
    async fn list_directory(&self, directory: &str) -> Result<Vec<FileEntry>, PersistenceError>;
}
