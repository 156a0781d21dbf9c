use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::channel::{ResultChannel, Subscription};
use crate::models::captured_file::{CapturedFile, MediaKind};
use crate::models::config::SessionConfiguration;
use crate::models::error::{CaptureError, RecordingError, Result, SessionError};
use crate::models::state::RecordingState;
use crate::session::core::SessionCore;
use crate::session::tuner::Tuner;
use crate::storage::catalog::{FileAssetCatalog, SeedTask};
use crate::storage::persistence::PersistencePool;
use crate::traits::capture_delegate::RecordingDelegate;
use crate::traits::library::MediaLibrary;
use crate::traits::path_resolver::PathResolver;

/// Signal from the movie output that a recording is on disk.
type FinishedFile = oneshot::Receiver<Option<CapturedFile>>;

/// Drives the `Idle ⇄ Recording` state machine against the session's movie output.
///
/// `stop_recording` only requests finalization. The finished file reaches
/// the result channel when the movie output reports it, and is handed to
/// the library afterwards on the persistence pool.
pub struct RecordingController {
    core: Arc<SessionCore>,
    resolver: Arc<dyn PathResolver>,
    library: Arc<dyn MediaLibrary>,
    pool: PersistencePool,
    config: SessionConfiguration,
    channel: Arc<ResultChannel<CapturedFile>>,
    catalog: Arc<FileAssetCatalog>,
    seed: SeedTask,
    state: Mutex<RecordingState>,
    // Serializes start/stop and holds the finish signal of the active recording.
    transition: tokio::sync::Mutex<Option<FinishedFile>>,
}

impl RecordingController {
    /// The channel is seeded from the catalog on a background task, which
    /// the first `start_recording` cancels. Outside a Tokio runtime the seed
    /// is skipped.
    pub fn new(
        core: Arc<SessionCore>,
        resolver: Arc<dyn PathResolver>,
        library: Arc<dyn MediaLibrary>,
        pool: PersistencePool,
        config: SessionConfiguration,
    ) -> Self {
        let channel = Arc::new(ResultChannel::new("video"));
        let catalog = Arc::new(FileAssetCatalog::directory(
            Arc::clone(&resolver),
            config.video_directory.clone(),
            Some(config.video_extension.clone()),
            MediaKind::Video,
        ));
        let seed = catalog.seed(Arc::clone(&channel), config.seed_timeout);

        Self {
            core,
            resolver,
            library,
            pool,
            config,
            channel,
            catalog,
            seed,
            state: Mutex::new(RecordingState::Idle),
            transition: tokio::sync::Mutex::new(None),
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state.lock().clone()
    }

    pub fn is_recording(&self) -> bool {
        self.state.lock().is_recording()
    }

    /// Start recording into a freshly resolved file. Returns its path.
    ///
    /// On any failure the controller stays idle and the error is returned as is.
    pub async fn start_recording(&self) -> Result<PathBuf> {
        let mut finished = self.transition.lock().await;
        if self.state.lock().is_recording() {
            return Err(RecordingError::AlreadyRecording.into());
        }
        if !self.core.is_running() {
            return Err(SessionError::NotRunning.into());
        }
        // The output file may appear in the catalog before it is finished.
        self.seed.cancel();

        let file_name = self.config.video_file_name(Utc::now());
        let path = self
            .resolver
            .resolve_unique_path(&self.config.video_directory, &file_name)
            .await
            .map_err(|e| RecordingError::PathResolutionFailed(e.to_string()))?;

        if self.config.auto_orientation {
            if let Some(orientation) = self.core.device_orientation() {
                self.core.run(Tuner::Orientation(orientation))?;
            }
        }

        let (tx, rx) = oneshot::channel();
        let delegate = Arc::new(RecordingFinisher {
            channel: Arc::clone(&self.channel),
            done: Mutex::new(Some(tx)),
        });
        self.core.movie_output().start_recording(&path, delegate)?;

        *self.state.lock() = RecordingState::Recording {
            output_path: path.clone(),
            started_at: Utc::now(),
        };
        *finished = Some(rx);
        log::info!("Recording started: {}", path.display());
        Ok(path)
    }

    /// Request finalization of the active recording and return to idle.
    ///
    /// Returns the path being finalized. Observe `subscribe()` for the file itself.
    pub async fn stop_recording(&self) -> Result<PathBuf> {
        let mut finished = self.transition.lock().await;
        let output_path = match self.state.lock().output_path() {
            Some(path) => path.to_path_buf(),
            None => return Err(RecordingError::NotRecording.into()),
        };

        self.core.movie_output().stop_recording();
        *self.state.lock() = RecordingState::Idle;
        log::info!("Recording stop requested: {}", output_path.display());

        if let Some(finished) = finished.take() {
            if self.config.persist_videos {
                self.persist_when_finished(finished);
            }
        }
        Ok(output_path)
    }

    pub fn subscribe(&self) -> Subscription<CapturedFile> {
        self.channel.subscribe()
    }

    pub fn channel(&self) -> &Arc<ResultChannel<CapturedFile>> {
        &self.channel
    }

    /// Previously recorded videos, newest first. `0` lists everything.
    pub async fn files(&self, limit: usize) -> Vec<CapturedFile> {
        self.catalog.list(limit).await
    }

    fn persist_when_finished(&self, finished: FinishedFile) {
        let library = Arc::clone(&self.library);
        let album = self.config.album_name.clone();
        self.pool.spawn_detached("video persistence", async move {
            // Nothing to persist if the recording failed or was abandoned.
            let Ok(Some(file)) = finished.await else {
                return Ok(());
            };
            match file.path() {
                Some(path) => library.add_file(&album, path, MediaKind::Video).await,
                None => Ok(()),
            }
        });
    }
}

/// Turns the movie output's completion callback into a channel push.
struct RecordingFinisher {
    channel: Arc<ResultChannel<CapturedFile>>,
    done: Mutex<Option<oneshot::Sender<Option<CapturedFile>>>>,
}

impl RecordingDelegate for RecordingFinisher {
    fn on_recording_finished(&self, path: &Path, outcome: Result<(), CaptureError>) {
        let Some(done) = self.done.lock().take() else {
            log::warn!("Duplicate completion for {}", path.display());
            return;
        };

        let file = match outcome {
            Ok(()) => {
                let file = CapturedFile::video(path.to_path_buf(), Utc::now());
                self.channel.push(Ok(file.clone()));
                Some(file)
            }
            Err(e) => {
                self.channel.push(Err(e.into()));
                None
            }
        };
        let _ = done.send(file);
    }
}
