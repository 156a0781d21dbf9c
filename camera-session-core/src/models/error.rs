use thiserror::Error;

/// Failures of a configuration change against the capture session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("capture session is not running")]
    NotRunning,

    #[error("capture device not found")]
    NoDevice,

    #[error("capture connection not found")]
    NoConnection,

    #[error("unsupported value: {0}")]
    UnsupportedValue(String),
}

/// Failures of the recording state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordingError {
    #[error("already recording")]
    AlreadyRecording,

    #[error("not recording")]
    NotRecording,

    #[error("output path resolution failed: {0}")]
    PathResolutionFailed(String),
}

/// Failures produced by the capture outputs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("captured frame has no encoded representation")]
    FlattenFailed,

    #[error("capture device unavailable")]
    DeviceUnavailable,

    #[error("capture output failed: {0}")]
    OutputFailed(String),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PermissionError {
    #[error("capture permission denied")]
    Denied,
}

/// Failures of the library and path collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("storage I/O failure: {0}")]
    UnderlyingIoFailure(String),
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        Self::UnderlyingIoFailure(err.to_string())
    }
}

/// Crate-level error.
///
/// `Clone` so a failure can be replayed to late subscribers of a result channel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Recording(#[from] RecordingError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Permission(#[from] PermissionError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
