use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// Recording state machine.
///
/// State transitions:
/// ```text
/// idle ──start_recording──→ recording ──stop_recording──→ idle
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording {
        output_path: PathBuf,
        started_at: DateTime<Utc>,
    },
}

impl RecordingState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording { .. })
    }

    pub fn output_path(&self) -> Option<&Path> {
        match self {
            Self::Recording { output_path, .. } => Some(output_path),
            Self::Idle => None,
        }
    }

    /// Elapsed recording time in seconds, if recording.
    pub fn duration(&self) -> Option<f64> {
        match self {
            Self::Recording { started_at, .. } => {
                let elapsed = Utc::now() - *started_at;
                Some(elapsed.num_milliseconds().max(0) as f64 / 1000.0)
            }
            Self::Idle => None,
        }
    }
}
