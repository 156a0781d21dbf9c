use std::sync::Arc;

use crate::models::device::{DeviceHandle, QualityPreset, StabilizationMode, VideoOrientation};
use crate::models::error::SessionError;
use crate::traits::outputs::{MovieOutput, PhotoOutput};

/// Interface for the platform capture session primitive.
///
/// Exactly one backend exists per `SessionCore`, which holds it behind its
/// configuration lock. Mutating methods are only ever called between
/// `begin_configuration` and `commit_configuration`, except for
/// `start_running` / `stop_running`.
///
/// Implemented by:
/// - `VirtualBackend` (camera-session-local)
pub trait CaptureBackend: Send + Sync {
    fn is_running(&self) -> bool;

    fn start_running(&mut self) -> Result<(), SessionError>;

    fn stop_running(&mut self);

    fn begin_configuration(&mut self);

    fn commit_configuration(&mut self);

    /// Every device the platform could attach.
    fn available_devices(&self) -> Vec<DeviceHandle>;

    /// Inputs currently attached to the session.
    fn attached_inputs(&self) -> Vec<DeviceHandle>;

    fn attach_input(&mut self, device: &DeviceHandle) -> Result<(), SessionError>;

    fn detach_input(&mut self, device_id: &str) -> Result<(), SessionError>;

    /// Whether the video output has a live connection to a video input.
    fn has_video_connection(&self) -> bool;

    fn preset(&self) -> QualityPreset;

    fn supports_preset(&self, preset: QualityPreset) -> bool;

    fn set_preset(&mut self, preset: QualityPreset) -> Result<(), SessionError>;

    fn zoom_factor(&self) -> f64;

    fn set_zoom_factor(&mut self, factor: f64) -> Result<(), SessionError>;

    fn orientation(&self) -> Option<VideoOrientation>;

    fn set_orientation(&mut self, orientation: VideoOrientation) -> Result<(), SessionError>;

    fn stabilization(&self) -> Option<StabilizationMode>;

    fn set_stabilization(&mut self, mode: StabilizationMode) -> Result<(), SessionError>;

    /// Physical orientation reported by the device sensors, if known.
    fn device_orientation(&self) -> Option<VideoOrientation> {
        None
    }

    fn movie_output(&self) -> Arc<dyn MovieOutput>;

    fn photo_output(&self) -> Arc<dyn PhotoOutput>;

    /// The attached camera, if any.
    fn current_device(&self) -> Option<DeviceHandle> {
        self.attached_inputs().into_iter().find(DeviceHandle::is_video)
    }
}
