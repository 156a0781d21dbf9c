use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::channel::ResultChannel;
use crate::models::captured_file::{CapturedFile, MediaKind};
use crate::models::error::PersistenceError;
use crate::traits::library::MediaLibrary;
use crate::traits::path_resolver::PathResolver;

enum Source {
    Directory {
        resolver: Arc<dyn PathResolver>,
        directory: String,
        extension: Option<String>,
    },
    Library {
        library: Arc<dyn MediaLibrary>,
        album: String,
    },
}

/// Lists previously produced files, newest first.
///
/// Lookups are advisory: any I/O failure is logged and yields an empty list.
pub struct FileAssetCatalog {
    kind: MediaKind,
    source: Source,
}

impl FileAssetCatalog {
    /// Catalog over a logical directory, optionally filtered by extension.
    pub fn directory(
        resolver: Arc<dyn PathResolver>,
        directory: impl Into<String>,
        extension: Option<String>,
        kind: MediaKind,
    ) -> Self {
        Self {
            kind,
            source: Source::Directory {
                resolver,
                directory: directory.into(),
                extension,
            },
        }
    }

    /// Catalog over a library album.
    pub fn library(library: Arc<dyn MediaLibrary>, album: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            kind,
            source: Source::Library {
                library,
                album: album.into(),
            },
        }
    }

    /// Up to `limit` files, newest first. `0` lists everything.
    pub async fn list(&self, limit: usize) -> Vec<CapturedFile> {
        match self.fetch(limit).await {
            Ok(files) => files,
            Err(e) => {
                log::warn!("Listing {:?} files failed: {}", self.kind, e);
                Vec::new()
            }
        }
    }

    /// Seed `channel` with the most recent file, unless something newer was
    /// pushed first or the returned task is cancelled. Gives up after
    /// `timeout`. Outside a Tokio runtime nothing is seeded.
    pub fn seed(self: &Arc<Self>, channel: Arc<ResultChannel<CapturedFile>>, timeout: Duration) -> SeedTask {
        let cancelled = Arc::new(AtomicBool::new(false));
        let Ok(runtime) = Handle::try_current() else {
            log::warn!("No Tokio runtime, {:?} channel not seeded", self.kind);
            return SeedTask { cancelled, handle: None };
        };

        let catalog = Arc::clone(self);
        let flag = Arc::clone(&cancelled);
        let handle = runtime.spawn(async move {
            let files = match tokio::time::timeout(timeout, catalog.list(1)).await {
                Ok(files) => files,
                Err(_) => {
                    log::warn!("Seeding {:?} channel timed out after {:?}", catalog.kind, timeout);
                    return;
                }
            };
            // Checked after listing: a cancel issued before a file was
            // created is always seen here.
            if flag.load(Ordering::SeqCst) {
                log::debug!("Seeding {:?} channel cancelled", catalog.kind);
                return;
            }
            if let Some(file) = files.into_iter().next() {
                if channel.seed_if_empty(Ok(file)) {
                    log::debug!("Seeded {:?} channel from catalog", catalog.kind);
                }
            }
        });
        SeedTask {
            cancelled,
            handle: Some(handle),
        }
    }

    async fn fetch(&self, limit: usize) -> Result<Vec<CapturedFile>, PersistenceError> {
        match &self.source {
            Source::Directory {
                resolver,
                directory,
                extension,
            } => {
                let mut entries = resolver.list_directory(directory).await?;
                if let Some(ext) = extension {
                    entries.retain(|e| {
                        e.path
                            .extension()
                            .map(|found| found.eq_ignore_ascii_case(ext.as_str()))
                            .unwrap_or(false)
                    });
                }
                entries.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
                if limit > 0 {
                    entries.truncate(limit);
                }
                Ok(entries
                    .into_iter()
                    .map(|e| CapturedFile::on_disk(e.path, e.modified_at, self.kind))
                    .collect())
            }
            Source::Library { library, album } => {
                let assets = library.fetch_recent(album, self.kind, limit).await?;
                Ok(assets.into_iter().map(CapturedFile::from).collect())
            }
        }
    }
}

/// Background lookup started by `FileAssetCatalog::seed`.
pub struct SeedTask {
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SeedTask {
    /// Stop the seed from publishing. Has no effect once it already has.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Wait for the lookup to finish. Returns at once when it never started.
    pub async fn finished(self) {
        if let Some(handle) = self.handle {
            let _ = handle.await;
        }
    }
}
