use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::CaptureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

/// Where the captured media lives: buffered in memory or on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Bytes(Arc<[u8]>),
    Path(PathBuf),
}

/// The artifact of a completed photo capture or finished recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFile {
    pub id: String,
    pub content: FileContent,
    pub produced_at: DateTime<Utc>,
    pub kind: MediaKind,
}

impl CapturedFile {
    pub fn photo(bytes: Vec<u8>, produced_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: FileContent::Bytes(bytes.into()),
            produced_at,
            kind: MediaKind::Photo,
        }
    }

    pub fn video(path: PathBuf, produced_at: DateTime<Utc>) -> Self {
        Self::on_disk(path, produced_at, MediaKind::Video)
    }

    pub fn on_disk(path: PathBuf, produced_at: DateTime<Utc>, kind: MediaKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: FileContent::Path(path),
            produced_at,
            kind,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.content {
            FileContent::Path(path) => Some(path),
            FileContent::Bytes(_) => None,
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.content {
            FileContent::Bytes(bytes) => Some(bytes),
            FileContent::Path(_) => None,
        }
    }
}

impl From<Asset> for CapturedFile {
    fn from(asset: Asset) -> Self {
        Self {
            id: asset.id,
            content: FileContent::Path(asset.location),
            produced_at: asset.created_at,
            kind: asset.kind,
        }
    }
}

/// An item held by the media library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: String,
    pub kind: MediaKind,
    pub created_at: DateTime<Utc>,
    pub location: PathBuf,
}

/// A file found by a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub modified_at: DateTime<Utc>,
}

/// Output of a single-frame capture before it is flattened to bytes.
#[derive(Debug, Clone, Default)]
pub struct RawFrame {
    pub encoded: Option<Vec<u8>>,
    pub width: u32,
    pub height: u32,
}

impl RawFrame {
    pub fn encoded(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            encoded: Some(data),
            width,
            height,
        }
    }

    /// Extract the encoded byte representation of the frame.
    pub fn flatten(self) -> Result<Vec<u8>, CaptureError> {
        match self.encoded {
            Some(data) if !data.is_empty() => Ok(data),
            _ => Err(CaptureError::FlattenFailed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_rejects_missing_or_empty_frames() {
        assert_eq!(RawFrame::default().flatten(), Err(CaptureError::FlattenFailed));
        assert_eq!(
            RawFrame::encoded(Vec::new(), 4, 4).flatten(),
            Err(CaptureError::FlattenFailed)
        );
        assert_eq!(RawFrame::encoded(vec![0xff, 0xd8], 4, 4).flatten(), Ok(vec![0xff, 0xd8]));
    }

    #[test]
    fn photo_is_buffered_and_video_is_on_disk() {
        let now = Utc::now();
        let photo = CapturedFile::photo(vec![1, 2, 3], now);
        let video = CapturedFile::video(PathBuf::from("/clips/a.mp4"), now);

        assert_eq!(photo.bytes(), Some(&[1u8, 2, 3][..]));
        assert!(photo.path().is_none());
        assert_eq!(video.path(), Some(Path::new("/clips/a.mp4")));
        assert_eq!(video.kind, MediaKind::Video);
        assert_ne!(photo.id, video.id);
    }

    #[test]
    fn assets_keep_their_identity() {
        let asset = Asset {
            id: "asset-1".into(),
            kind: MediaKind::Photo,
            created_at: Utc::now(),
            location: PathBuf::from("/album/a.jpg"),
        };
        let file = CapturedFile::from(asset.clone());

        assert_eq!(file.id, asset.id);
        assert_eq!(file.produced_at, asset.created_at);
        assert_eq!(file.path(), Some(asset.location.as_path()));
    }
}
