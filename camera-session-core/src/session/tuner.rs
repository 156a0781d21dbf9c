use crate::models::device::{DevicePosition, QualityPreset, StabilizationMode, VideoOrientation};
use crate::models::error::SessionError;
use crate::traits::capture_backend::CaptureBackend;

/// One configuration change to the capture session.
///
/// A tuner is checked against the backend before anything is touched;
/// `SessionCore::run` applies it under the configuration lock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tuner {
    /// Start the session if it is not running yet.
    Launch,
    /// Detach (`true`) or attach (`false`) the audio input.
    Mute(bool),
    Quality(QualityPreset),
    /// Swap the camera input for the device at this position.
    Position(DevicePosition),
    Orientation(VideoOrientation),
    Stabilization(StabilizationMode),
    Zoom(f64),
}

impl Tuner {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Launch => "launch",
            Self::Mute(_) => "mute",
            Self::Quality(_) => "quality",
            Self::Position(_) => "position",
            Self::Orientation(_) => "orientation",
            Self::Stabilization(_) => "stabilization",
            Self::Zoom(_) => "zoom",
        }
    }

    /// Whether applying this tuner reconfigures the session graph, and so
    /// must be bracketed by begin/commit configuration.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::Launch)
    }

    /// Check the tuner against the current backend state without mutating it.
    pub fn validate(&self, backend: &dyn CaptureBackend) -> Result<(), SessionError> {
        match *self {
            Self::Launch | Self::Mute(true) => Ok(()),
            Self::Mute(false) => {
                let has_audio = backend.attached_inputs().iter().any(|d| d.is_audio())
                    || backend.available_devices().iter().any(|d| d.is_audio());
                if has_audio {
                    Ok(())
                } else {
                    Err(SessionError::NoDevice)
                }
            }
            Self::Quality(preset) => {
                if backend.supports_preset(preset) {
                    Ok(())
                } else {
                    Err(SessionError::UnsupportedValue(format!("quality preset {:?}", preset)))
                }
            }
            Self::Position(position) => backend
                .available_devices()
                .iter()
                .any(|d| d.is_video() && d.position == position)
                .then_some(())
                .ok_or(SessionError::NoDevice),
            Self::Orientation(_) => {
                if backend.has_video_connection() {
                    Ok(())
                } else {
                    Err(SessionError::NoConnection)
                }
            }
            Self::Stabilization(mode) => {
                if !backend.has_video_connection() {
                    return Err(SessionError::NoConnection);
                }
                let device = backend.current_device().ok_or(SessionError::NoDevice)?;
                if device.supports_stabilization(mode) {
                    Ok(())
                } else {
                    Err(SessionError::UnsupportedValue(format!(
                        "stabilization {:?} on {}",
                        mode, device.name
                    )))
                }
            }
            Self::Zoom(factor) => {
                let device = backend.current_device().ok_or(SessionError::NoDevice)?;
                if device.zoom_range.contains(factor) {
                    Ok(())
                } else {
                    Err(SessionError::UnsupportedValue(format!(
                        "zoom factor {} outside [{}, {}]",
                        factor, device.zoom_range.min, device.zoom_range.max
                    )))
                }
            }
        }
    }

    /// Apply the change. Assumes `validate` passed under the same lock.
    pub fn apply(&self, backend: &mut dyn CaptureBackend) -> Result<(), SessionError> {
        match *self {
            Self::Launch => {
                if backend.is_running() {
                    return Ok(());
                }
                backend.start_running()
            }
            Self::Mute(true) => {
                for input in backend.attached_inputs().iter().filter(|d| d.is_audio()) {
                    backend.detach_input(&input.id)?;
                }
                Ok(())
            }
            Self::Mute(false) => {
                if backend.attached_inputs().iter().any(|d| d.is_audio()) {
                    return Ok(());
                }
                let microphone = backend
                    .available_devices()
                    .into_iter()
                    .find(|d| d.is_audio())
                    .ok_or(SessionError::NoDevice)?;
                backend.attach_input(&microphone)
            }
            Self::Quality(preset) => backend.set_preset(preset),
            Self::Position(position) => {
                let target = backend
                    .available_devices()
                    .into_iter()
                    .find(|d| d.is_video() && d.position == position)
                    .ok_or(SessionError::NoDevice)?;
                let current = backend.current_device();
                if current.as_ref().map(|d| d.id.as_str()) == Some(target.id.as_str()) {
                    return Ok(());
                }
                let Some(current) = current else {
                    return backend.attach_input(&target);
                };
                backend.detach_input(&current.id)?;
                if let Err(e) = backend.attach_input(&target) {
                    // Put the previous camera back rather than leave none attached.
                    if let Err(restore) = backend.attach_input(&current) {
                        log::warn!("Failed to restore {} after switch error: {}", current.id, restore);
                    }
                    return Err(e);
                }
                Ok(())
            }
            Self::Orientation(orientation) => backend.set_orientation(orientation),
            Self::Stabilization(mode) => backend.set_stabilization(mode),
            Self::Zoom(factor) => backend.set_zoom_factor(factor),
        }
    }
}
