use serde::{Deserialize, Serialize};

/// Physical placement of a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePosition {
    Back,
    Front,
    Unspecified,
}

/// What a capture input produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Video,
    Audio,
}

/// Session quality preset. Passed through to the backend untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QualityPreset {
    Low,
    Medium,
    High,
    Photo,
    Hd1280x720,
    Hd1920x1080,
    Uhd3840x2160,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VideoOrientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StabilizationMode {
    Off,
    Standard,
    Cinematic,
    Auto,
}

/// Closed interval of zoom factors a device accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl ZoomRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, factor: f64) -> bool {
        factor.is_finite() && factor >= self.min && factor <= self.max
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self { min: 1.0, max: 1.0 }
    }
}

/// A capture device the session can attach as an input.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceHandle {
    pub id: String,
    pub name: String,
    pub kind: DeviceKind,
    pub position: DevicePosition,
    pub zoom_range: ZoomRange,
    pub stabilization_modes: Vec<StabilizationMode>,
}

impl DeviceHandle {
    pub fn camera(id: impl Into<String>, position: DevicePosition, zoom_range: ZoomRange) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind: DeviceKind::Video,
            position,
            zoom_range,
            stabilization_modes: vec![StabilizationMode::Off, StabilizationMode::Standard, StabilizationMode::Auto],
        }
    }

    pub fn microphone(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind: DeviceKind::Audio,
            position: DevicePosition::Unspecified,
            zoom_range: ZoomRange::default(),
            stabilization_modes: Vec::new(),
        }
    }

    pub fn is_video(&self) -> bool {
        self.kind == DeviceKind::Video
    }

    pub fn is_audio(&self) -> bool {
        self.kind == DeviceKind::Audio
    }

    pub fn supports_stabilization(&self, mode: StabilizationMode) -> bool {
        mode == StabilizationMode::Off || self.stabilization_modes.contains(&mode)
    }
}

/// Read-only snapshot of the session, taken under the configuration lock so
/// it never reflects a half-applied change.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    pub is_running: bool,
    pub video_device: Option<DeviceHandle>,
    pub audio_attached: bool,
    pub preset: QualityPreset,
    pub zoom_factor: f64,
    pub orientation: Option<VideoOrientation>,
    pub stabilization: Option<StabilizationMode>,
}

impl DeviceState {
    pub fn is_muted(&self) -> bool {
        !self.audio_attached
    }

    pub fn position(&self) -> Option<DevicePosition> {
        self.video_device.as_ref().map(|d| d.position)
    }

    pub fn zoom_range(&self) -> Option<ZoomRange> {
        self.video_device.as_ref().map(|d| d.zoom_range)
    }
}
