use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;

use crate::channel::{ResultChannel, Subscription};
use crate::models::captured_file::{CapturedFile, MediaKind};
use crate::models::config::{FlashMode, PhotoSettings, QualityPrioritization, SessionConfiguration};
use crate::models::error::{Result, SessionError};
use crate::session::core::SessionCore;
use crate::storage::catalog::{FileAssetCatalog, SeedTask};
use crate::traits::library::MediaLibrary;

/// One-shot still capture against the session's photo output.
///
/// Unlike recordings, photos are persisted before success is reported: a
/// library failure fails the capture, and the channel receives that failure.
pub struct CaptureController {
    core: Arc<SessionCore>,
    library: Arc<dyn MediaLibrary>,
    config: SessionConfiguration,
    settings: Mutex<PhotoSettings>,
    channel: Arc<ResultChannel<CapturedFile>>,
    catalog: Arc<FileAssetCatalog>,
    seed: SeedTask,
}

impl CaptureController {
    /// The channel is seeded from the library on a background task until the
    /// first capture. Outside a Tokio runtime the seed is skipped.
    pub fn new(core: Arc<SessionCore>, library: Arc<dyn MediaLibrary>, config: SessionConfiguration) -> Self {
        let channel = Arc::new(ResultChannel::new("photo"));
        let catalog = Arc::new(FileAssetCatalog::library(
            Arc::clone(&library),
            config.album_name.clone(),
            MediaKind::Photo,
        ));
        let seed = catalog.seed(Arc::clone(&channel), config.seed_timeout);

        Self {
            core,
            library,
            config,
            settings: Mutex::new(PhotoSettings::default()),
            channel,
            catalog,
            seed,
        }
    }

    pub fn settings(&self) -> PhotoSettings {
        self.settings.lock().clone()
    }

    pub fn set_flash(&self, flash: FlashMode) {
        self.settings.lock().flash = flash;
    }

    pub fn set_red_eye_reduction(&self, enabled: bool) {
        self.settings.lock().red_eye_reduction = enabled;
    }

    pub fn set_prioritization(&self, prioritization: QualityPrioritization) {
        self.settings.lock().prioritization = prioritization;
    }

    /// Capture a single frame.
    ///
    /// The outcome, success or failure, is also pushed to the channel. A
    /// session that is not running is rejected up front and not pushed.
    pub async fn capture_photo(&self) -> Result<CapturedFile> {
        if !self.core.is_running() {
            return Err(SessionError::NotRunning.into());
        }
        self.seed.cancel();
        let outcome = self.capture().await;
        self.channel.push(outcome.clone());
        outcome
    }

    pub fn subscribe(&self) -> Subscription<CapturedFile> {
        self.channel.subscribe()
    }

    pub fn channel(&self) -> &Arc<ResultChannel<CapturedFile>> {
        &self.channel
    }

    /// Photos already in the library album, newest first. `0` lists everything.
    pub async fn files(&self, limit: usize) -> Vec<CapturedFile> {
        self.catalog.list(limit).await
    }

    async fn capture(&self) -> Result<CapturedFile> {
        let settings = self.settings();
        let output = self.core.photo_output();

        let frame = output.capture_single_frame(&settings).await?;
        let bytes = frame.flatten()?;

        if self.config.persist_photos {
            self.library
                .add_bytes(&self.config.album_name, &bytes, MediaKind::Photo)
                .await?;
        }

        log::debug!("Captured photo ({} bytes)", bytes.len());
        Ok(CapturedFile::photo(bytes, Utc::now()))
    }
}
