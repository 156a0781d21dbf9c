use std::path::PathBuf;
use std::sync::Arc;

use crate::channel::Subscription;
use crate::models::captured_file::CapturedFile;
use crate::models::config::SessionConfiguration;
use crate::models::device::{DevicePosition, DeviceState, QualityPreset, StabilizationMode, VideoOrientation};
use crate::models::error::{Error, Result, SessionError};
use crate::models::state::RecordingState;
use crate::session::core::SessionCore;
use crate::session::photo::CaptureController;
use crate::session::recording::RecordingController;
use crate::session::tuner::Tuner;
use crate::storage::persistence::PersistencePool;
use crate::traits::capture_backend::CaptureBackend;
use crate::traits::library::MediaLibrary;
use crate::traits::path_resolver::PathResolver;
use crate::traits::permission::{ensure_authorized, PermissionChecker};

/// External services a session depends on.
#[derive(Clone)]
pub struct Collaborators {
    pub library: Arc<dyn MediaLibrary>,
    pub resolver: Arc<dyn PathResolver>,
    pub permissions: Arc<dyn PermissionChecker>,
}

/// Entry point: one capture session plus its recording and photo controllers.
///
/// Configuration methods chain, but each call is applied on its own under
/// the session lock before the next one starts; nothing is batched.
///
/// ```ignore
/// session.position(DevicePosition::Front)?.zoom(2.0)?.mute(true)?;
/// ```
pub struct CameraSession {
    core: Arc<SessionCore>,
    recorder: RecordingController,
    camera: CaptureController,
}

impl CameraSession {
    /// Check authorization, start the backend and attach the default inputs.
    ///
    /// Missing default devices are logged and skipped: the session still
    /// launches, and a later `position`/`mute` call attaches inputs.
    pub async fn launch(
        backend: Box<dyn CaptureBackend>,
        collaborators: Collaborators,
        config: SessionConfiguration,
    ) -> Result<Self> {
        config.validate().map_err(Error::InvalidConfiguration)?;
        ensure_authorized(collaborators.permissions.as_ref()).await?;

        let core = Arc::new(SessionCore::new(backend));
        core.run(Tuner::Launch)?;

        if let Some(position) = config.default_position {
            attach_default(&core, Tuner::Position(position));
        }
        attach_default(&core, Tuner::Mute(config.start_muted));

        let pool = PersistencePool::new(config.persistence_workers);
        let recorder = RecordingController::new(
            Arc::clone(&core),
            Arc::clone(&collaborators.resolver),
            Arc::clone(&collaborators.library),
            pool,
            config.clone(),
        );
        let camera = CaptureController::new(Arc::clone(&core), Arc::clone(&collaborators.library), config);

        log::info!("Camera session launched");
        Ok(Self { core, recorder, camera })
    }

    pub fn core(&self) -> &Arc<SessionCore> {
        &self.core
    }

    pub fn recorder(&self) -> &RecordingController {
        &self.recorder
    }

    pub fn camera(&self) -> &CaptureController {
        &self.camera
    }

    pub fn state(&self) -> DeviceState {
        self.core.device_state()
    }

    pub fn run(&self, tuner: Tuner) -> Result<&Self> {
        self.core.run(tuner)?;
        Ok(self)
    }

    pub fn zoom(&self, factor: f64) -> Result<&Self> {
        self.run(Tuner::Zoom(factor))
    }

    pub fn mute(&self, muted: bool) -> Result<&Self> {
        self.run(Tuner::Mute(muted))
    }

    pub fn quality(&self, preset: QualityPreset) -> Result<&Self> {
        self.run(Tuner::Quality(preset))
    }

    pub fn position(&self, position: DevicePosition) -> Result<&Self> {
        self.run(Tuner::Position(position))
    }

    pub fn orientation(&self, orientation: VideoOrientation) -> Result<&Self> {
        self.run(Tuner::Orientation(orientation))
    }

    pub fn stabilization(&self, mode: StabilizationMode) -> Result<&Self> {
        self.run(Tuner::Stabilization(mode))
    }

    pub async fn start_recording(&self) -> Result<PathBuf> {
        self.recorder.start_recording().await
    }

    pub async fn stop_recording(&self) -> Result<PathBuf> {
        self.recorder.stop_recording().await
    }

    pub fn recording_state(&self) -> RecordingState {
        self.recorder.state()
    }

    pub async fn capture_photo(&self) -> Result<CapturedFile> {
        self.camera.capture_photo().await
    }

    pub fn videos(&self) -> Subscription<CapturedFile> {
        self.recorder.subscribe()
    }

    pub fn photos(&self) -> Subscription<CapturedFile> {
        self.camera.subscribe()
    }

    /// Stop the backend. Stops an active recording first.
    pub async fn shutdown(&self) {
        if self.recorder.is_recording() {
            if let Err(e) = self.recorder.stop_recording().await {
                log::warn!("Stopping recording on shutdown failed: {}", e);
            }
        }
        self.core.shutdown();
    }
}

fn attach_default(core: &SessionCore, tuner: Tuner) {
    match core.run(tuner) {
        Ok(()) => {}
        Err(SessionError::NoDevice) => log::warn!("No device for default {} tuner {:?}", tuner.name(), tuner),
        Err(e) => log::warn!("Default {} tuner {:?} failed: {}", tuner.name(), tuner, e),
    }
}
