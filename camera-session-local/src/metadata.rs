use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use camera_session_core::models::captured_file::MediaKind;
use camera_session_core::models::error::PersistenceError;

pub const SIDECAR_SUFFIX: &str = "metadata.json";

/// Library record stored next to each asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub id: String,
    pub kind: MediaKind,
    pub created_at: DateTime<Utc>,
    /// File name of the asset inside its album folder.
    pub file_name: String,
    pub size_bytes: u64,
    /// SHA-256 hex digest of the asset contents.
    pub checksum: String,
    /// Original file name for imported files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
}

/// Sidecar path for an asset: `{asset}.metadata.json` with the media
/// extension replaced.
pub fn sidecar_path(asset_path: &Path) -> PathBuf {
    asset_path.with_extension(SIDECAR_SUFFIX)
}

pub fn is_sidecar(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.ends_with(&format!(".{}", SIDECAR_SUFFIX)))
        .unwrap_or(false)
}

/// Write asset metadata as a JSON sidecar file.
pub async fn write_metadata(metadata: &AssetMetadata, asset_path: &Path) -> Result<(), PersistenceError> {
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| PersistenceError::UnderlyingIoFailure(format!("failed to serialize metadata: {}", e)))?;
    tokio::fs::write(sidecar_path(asset_path), json).await?;
    Ok(())
}

/// Read a sidecar file written by `write_metadata`.
pub async fn read_metadata(sidecar: &Path) -> Result<AssetMetadata, PersistenceError> {
    let json = tokio::fs::read_to_string(sidecar).await?;
    serde_json::from_str(&json)
        .map_err(|e| PersistenceError::UnderlyingIoFailure(format!("failed to parse {}: {}", sidecar.display(), e)))
}

pub fn sha256_bytes(data: &[u8]) -> String {
    hex_encode(&Sha256::digest(data))
}

/// SHA-256 hex digest of a file, read in chunks on the blocking pool.
pub async fn sha256_file(path: &Path) -> Result<String, PersistenceError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<String, PersistenceError> {
        let mut file = std::fs::File::open(&path)?;
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; 64 * 1024];
        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(hex_encode(&hasher.finalize()))
    })
    .await
    .map_err(|e| PersistenceError::UnderlyingIoFailure(format!("checksum task failed: {}", e)))?
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_replaces_media_extension() {
        assert_eq!(
            sidecar_path(Path::new("/lib/Camera/abc.jpg")),
            PathBuf::from("/lib/Camera/abc.metadata.json")
        );
        assert!(is_sidecar(Path::new("/lib/Camera/abc.metadata.json")));
        assert!(!is_sidecar(Path::new("/lib/Camera/abc.jpg")));
    }

    #[test]
    fn checksum_of_empty_input() {
        assert_eq!(
            sha256_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[tokio::test]
    async fn file_checksum_matches_bytes_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 253) as u8).collect();
        std::fs::write(&path, &data).unwrap();

        assert_eq!(sha256_file(&path).await.unwrap(), sha256_bytes(&data));
    }

    #[tokio::test]
    async fn metadata_survives_a_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let asset = dir.path().join("abc.mp4");
        let metadata = AssetMetadata {
            id: "abc".into(),
            kind: MediaKind::Video,
            created_at: Utc::now(),
            file_name: "abc.mp4".into(),
            size_bytes: 12,
            checksum: sha256_bytes(b"hello world!"),
            source_name: Some("20240309_140507000.mp4".into()),
        };

        write_metadata(&metadata, &asset).await.unwrap();
        let read = read_metadata(&sidecar_path(&asset)).await.unwrap();

        assert_eq!(read, metadata);
    }

    #[tokio::test]
    async fn corrupt_sidecar_is_an_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let sidecar = dir.path().join("bad.metadata.json");
        std::fs::write(&sidecar, "{not json").unwrap();

        let err = read_metadata(&sidecar).await.unwrap_err();
        assert!(matches!(err, PersistenceError::UnderlyingIoFailure(_)));
    }
}
