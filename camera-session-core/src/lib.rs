//! # camera-session-core
//!
//! Platform-agnostic camera session library.
//!
//! Provides a serialized configuration pipeline over a capture backend,
//! video recording with background library import, single-frame photo
//! capture, and replay-of-one result channels for observers. Platform
//! backends implement the `CaptureBackend` trait and its outputs; storage
//! plugs in through `MediaLibrary` and `PathResolver`.
//!
//! ## Architecture
//!
//! ```text
//! camera-session-core (this crate)
//! ├── traits/       ← CaptureBackend, MovieOutput, PhotoOutput, MediaLibrary, PathResolver, PermissionChecker
//! ├── models/       ← Error types, SessionConfiguration, DeviceState, CapturedFile, RecordingState
//! ├── session/      ← SessionCore + Tuner, RecordingController, CaptureController, CameraSession
//! ├── storage/      ← FileAssetCatalog, PersistencePool
//! └── channel       ← ResultChannel (latest value + fan-out)
//! ```

pub mod channel;
pub mod models;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience.
pub use channel::{Outcome, ResultChannel, Subscription};
pub use models::captured_file::{Asset, CapturedFile, FileContent, FileEntry, MediaKind, RawFrame};
pub use models::config::{FlashMode, PhotoSettings, QualityPrioritization, SessionConfiguration};
pub use models::device::{
    DeviceHandle, DeviceKind, DevicePosition, DeviceState, QualityPreset, StabilizationMode, VideoOrientation, ZoomRange,
};
pub use models::error::{CaptureError, Error, PermissionError, PersistenceError, RecordingError, Result, SessionError};
pub use models::state::RecordingState;
pub use session::camera::{CameraSession, Collaborators};
pub use session::core::SessionCore;
pub use session::photo::CaptureController;
pub use session::recording::RecordingController;
pub use session::tuner::Tuner;
pub use storage::catalog::FileAssetCatalog;
pub use storage::persistence::PersistencePool;
pub use traits::capture_backend::CaptureBackend;
pub use traits::capture_delegate::RecordingDelegate;
pub use traits::library::MediaLibrary;
pub use traits::outputs::{MovieOutput, PhotoOutput};
pub use traits::path_resolver::PathResolver;
pub use traits::permission::{ensure_authorized, AuthorizationStatus, PermissionChecker};
