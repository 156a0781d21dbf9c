use std::sync::Arc;

use parking_lot::RwLock;

use crate::models::device::{DeviceHandle, DeviceState, VideoOrientation};
use crate::models::error::SessionError;
use crate::session::tuner::Tuner;
use crate::traits::capture_backend::CaptureBackend;
use crate::traits::outputs::{MovieOutput, PhotoOutput};

/// Owner of the shared capture session.
///
/// The backend sits behind a single `RwLock`: every tuner takes the write
/// half for its whole validate → begin → apply → commit sequence, so at most
/// one configuration change is in flight and readers never observe a
/// half-applied one. Queries take the read half and may run concurrently.
pub struct SessionCore {
    backend: RwLock<Box<dyn CaptureBackend>>,
}

impl SessionCore {
    pub fn new(backend: Box<dyn CaptureBackend>) -> Self {
        Self {
            backend: RwLock::new(backend),
        }
    }

    /// Apply one tuner under the configuration lock.
    ///
    /// The lock is released before returning, so sequential calls from one
    /// caller observe each other's effects in call order.
    pub fn run(&self, tuner: Tuner) -> Result<(), SessionError> {
        let mut backend = self.backend.write();

        if let Err(e) = tuner.validate(backend.as_ref()) {
            log::warn!("Rejected {} tuner {:?}: {}", tuner.name(), tuner, e);
            return Err(e);
        }

        if !tuner.is_configuration() {
            return tuner.apply(backend.as_mut());
        }

        backend.begin_configuration();
        let outcome = tuner.apply(backend.as_mut());
        backend.commit_configuration();

        match &outcome {
            Ok(()) => log::debug!("Applied {} tuner {:?}", tuner.name(), tuner),
            Err(e) => log::error!("Backend refused {} tuner {:?}: {}", tuner.name(), tuner, e),
        }
        outcome
    }

    /// Consistent snapshot of the session configuration.
    pub fn device_state(&self) -> DeviceState {
        let backend = self.backend.read();
        let inputs = backend.attached_inputs();
        DeviceState {
            is_running: backend.is_running(),
            video_device: inputs.iter().find(|d| d.is_video()).cloned(),
            audio_attached: inputs.iter().any(|d| d.is_audio()),
            preset: backend.preset(),
            zoom_factor: backend.zoom_factor(),
            orientation: backend.orientation(),
            stabilization: backend.stabilization(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.backend.read().is_running()
    }

    pub fn current_device(&self) -> Option<DeviceHandle> {
        self.backend.read().current_device()
    }

    pub fn available_devices(&self) -> Vec<DeviceHandle> {
        self.backend.read().available_devices()
    }

    pub fn device_orientation(&self) -> Option<VideoOrientation> {
        self.backend.read().device_orientation()
    }

    pub fn movie_output(&self) -> Arc<dyn MovieOutput> {
        self.backend.read().movie_output()
    }

    pub fn photo_output(&self) -> Arc<dyn PhotoOutput> {
        self.backend.read().photo_output()
    }

    /// Stop the underlying session. The core is not reusable afterwards.
    pub fn shutdown(&self) {
        let mut backend = self.backend.write();
        if backend.is_running() {
            backend.stop_running();
            log::info!("Capture session stopped");
        }
    }
}
