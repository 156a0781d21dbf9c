use std::path::Path;

use crate::models::error::CaptureError;

/// Completion callback for a movie output.
///
/// Called from the output's writer thread once the file at `path` has been
/// finalized (or has failed). Implementations must not block.
pub trait RecordingDelegate: Send + Sync {
    fn on_recording_finished(&self, path: &Path, outcome: Result<(), CaptureError>);
}
