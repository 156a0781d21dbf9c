//! # camera-session-local
//!
//! Local backend for camera-session-kit.
//!
//! Provides:
//! - `VirtualBackend`: software capture session with a back camera, a
//!   front camera and a microphone; recordings are written to disk
//! - `FsPathResolver`: logical directories mapped under a root folder
//! - `FolderLibrary`: album folders with JSON metadata sidecars
//! - `permissions`: fixed or environment-driven authorization
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use camera_session_core::{CameraSession, Collaborators, SessionConfiguration};
//! use camera_session_local::{FolderLibrary, FsPathResolver, StaticPermission, VirtualBackend};
//!
//! let collaborators = Collaborators {
//!     library: Arc::new(FolderLibrary::new("/tmp/library")),
//!     resolver: Arc::new(FsPathResolver::new("/tmp/capture")),
//!     permissions: Arc::new(StaticPermission::granted()),
//! };
//! let session = CameraSession::launch(Box::new(VirtualBackend::new()), collaborators, SessionConfiguration::default()).await?;
//! session.zoom(2.0)?;
//! ```

pub mod folder_library;
pub mod fs_resolver;
pub mod metadata;
pub mod permissions;
pub mod virtual_backend;

pub use folder_library::FolderLibrary;
pub use fs_resolver::FsPathResolver;
pub use metadata::AssetMetadata;
pub use permissions::StaticPermission;
pub use virtual_backend::{VirtualBackend, VirtualMovieOutput, VirtualPhotoOutput};
