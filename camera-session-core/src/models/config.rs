use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::device::DevicePosition;

/// Produces a file stem for a new recording from its start time.
pub type FileNaming = Arc<dyn Fn(DateTime<Utc>) -> String + Send + Sync>;

/// Configuration for a camera session.
#[derive(Clone)]
pub struct SessionConfiguration {
    /// Library album that receives persisted photos and videos (default: "Camera").
    pub album_name: String,

    /// Logical directory recordings are written into (default: "Videos").
    pub video_directory: String,

    /// Extension appended to recording file names (default: "mp4").
    pub video_extension: String,

    /// Naming function for recordings. Defaults to a millisecond timestamp.
    pub file_naming: FileNaming,

    /// Persist captured photos to the library before reporting success (default: true).
    pub persist_photos: bool,

    /// Hand finished recordings to the library in the background (default: true).
    pub persist_videos: bool,

    /// Match the recording orientation to the device orientation on start (default: true).
    pub auto_orientation: bool,

    /// Camera attached at launch, if one with this position exists (default: back).
    pub default_position: Option<DevicePosition>,

    /// Launch with the audio input detached (default: false).
    pub start_muted: bool,

    /// Concurrent background persistence tasks (default: 2).
    pub persistence_workers: usize,

    /// Upper bound on the startup catalog lookup (default: 5s).
    pub seed_timeout: Duration,
}

impl SessionConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("album name", &self.album_name),
            ("video directory", &self.video_directory),
            ("video extension", &self.video_extension),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{} must not be empty", field));
            }
            if value.contains(['/', '\\']) {
                return Err(format!("{} must not contain path separators: {}", field, value));
            }
        }
        if self.persistence_workers == 0 {
            return Err("persistence workers must be positive".into());
        }
        if self.seed_timeout.is_zero() {
            return Err("seed timeout must be positive".into());
        }
        Ok(())
    }

    /// Full file name for a recording started at `now`.
    pub fn video_file_name(&self, now: DateTime<Utc>) -> String {
        format!("{}.{}", (self.file_naming)(now), self.video_extension)
    }
}

impl Default for SessionConfiguration {
    fn default() -> Self {
        Self {
            album_name: "Camera".into(),
            video_directory: "Videos".into(),
            video_extension: "mp4".into(),
            file_naming: Arc::new(default_file_naming),
            persist_photos: true,
            persist_videos: true,
            auto_orientation: true,
            default_position: Some(DevicePosition::Back),
            start_muted: false,
            persistence_workers: 2,
            seed_timeout: Duration::from_secs(5),
        }
    }
}

fn default_file_naming(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d_%H%M%S%3f").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    Off,
    On,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPrioritization {
    Speed,
    Balanced,
    Quality,
}

/// Per-capture parameters handed to the photo output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSettings {
    pub flash: FlashMode,
    pub red_eye_reduction: bool,
    pub prioritization: QualityPrioritization,
}

impl Default for PhotoSettings {
    fn default() -> Self {
        Self {
            flash: FlashMode::Off,
            red_eye_reduction: true,
            prioritization: QualityPrioritization::Balanced,
        }
    }
}
