use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::models::captured_file::RawFrame;
use crate::models::config::PhotoSettings;
use crate::models::error::CaptureError;
use crate::traits::capture_delegate::RecordingDelegate;

/// Recording sink attached to the capture session.
pub trait MovieOutput: Send + Sync {
    fn is_recording(&self) -> bool;

    /// Begin writing to `path`. `delegate` is told once the file is finished.
    fn start_recording(
        &self,
        path: &Path,
        delegate: Arc<dyn RecordingDelegate>,
    ) -> Result<(), CaptureError>;

    /// Request finalization. Completion arrives through the delegate.
    fn stop_recording(&self);
}

/// Single-frame still capture sink attached to the capture session.
#[async_trait]
pub trait PhotoOutput: Send + Sync {
    async fn capture_single_frame(&self, settings: &PhotoSettings) -> Result<RawFrame, CaptureError>;
}
