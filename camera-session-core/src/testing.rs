//! In-memory collaborators for unit tests.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicIsize, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::models::captured_file::{Asset, FileEntry, MediaKind, RawFrame};
use crate::models::config::PhotoSettings;
use crate::models::device::{
    DeviceHandle, DevicePosition, QualityPreset, StabilizationMode, VideoOrientation, ZoomRange,
};
use crate::models::error::{CaptureError, PersistenceError, SessionError};
use crate::traits::capture_backend::CaptureBackend;
use crate::traits::capture_delegate::RecordingDelegate;
use crate::traits::library::MediaLibrary;
use crate::traits::outputs::{MovieOutput, PhotoOutput};
use crate::traits::path_resolver::PathResolver;

/// Counters shared between a `FakeBackend` and the test that owns it.
#[derive(Default)]
pub struct BackendStats {
    starts: AtomicUsize,
    commits: AtomicUsize,
    open: AtomicIsize,
    max_nested: AtomicIsize,
    refuse_next: AtomicBool,
}

impl BackendStats {
    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn open_configurations(&self) -> isize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn max_nested_configurations(&self) -> isize {
        self.max_nested.load(Ordering::SeqCst)
    }

    pub fn refuse_next_change(&self) {
        self.refuse_next.store(true, Ordering::SeqCst);
    }

    fn check_refusal(&self) -> Result<(), SessionError> {
        if self.refuse_next.swap(false, Ordering::SeqCst) {
            Err(SessionError::UnsupportedValue("refused by backend".into()))
        } else {
            Ok(())
        }
    }
}

pub struct FakeBackend {
    stats: Arc<BackendStats>,
    running: bool,
    devices: Vec<DeviceHandle>,
    attached: Vec<DeviceHandle>,
    preset: QualityPreset,
    zoom: f64,
    orientation: Option<VideoOrientation>,
    stabilization: Option<StabilizationMode>,
    physical_orientation: Option<VideoOrientation>,
    movie: Arc<FakeMovieOutput>,
    photo: Arc<FakePhotoOutput>,
}

impl FakeBackend {
    pub fn empty() -> Self {
        Self {
            stats: Arc::new(BackendStats::default()),
            running: false,
            devices: Vec::new(),
            attached: Vec::new(),
            preset: QualityPreset::High,
            zoom: 1.0,
            orientation: None,
            stabilization: None,
            physical_orientation: Some(VideoOrientation::LandscapeRight),
            movie: Arc::new(FakeMovieOutput::default()),
            photo: Arc::new(FakePhotoOutput::default()),
        }
    }

    pub fn with_back_and_front() -> Self {
        let mut backend = Self::empty();
        backend.devices = vec![
            DeviceHandle::camera("back", DevicePosition::Back, ZoomRange::new(1.0, 10.0)),
            DeviceHandle::camera("front", DevicePosition::Front, ZoomRange::new(1.0, 3.0)),
            DeviceHandle::microphone("mic"),
        ];
        backend
    }

    pub fn stats(&self) -> Arc<BackendStats> {
        Arc::clone(&self.stats)
    }

    pub fn movie(&self) -> Arc<FakeMovieOutput> {
        Arc::clone(&self.movie)
    }

    pub fn photo(&self) -> Arc<FakePhotoOutput> {
        Arc::clone(&self.photo)
    }

    pub fn remove_microphones(&mut self) {
        self.devices.retain(|d| !d.is_audio());
    }
}

impl CaptureBackend for FakeBackend {
    fn is_running(&self) -> bool {
        self.running
    }

    fn start_running(&mut self) -> Result<(), SessionError> {
        self.stats.starts.fetch_add(1, Ordering::SeqCst);
        self.running = true;
        Ok(())
    }

    fn stop_running(&mut self) {
        self.running = false;
    }

    fn begin_configuration(&mut self) {
        let open = self.stats.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.max_nested.fetch_max(open, Ordering::SeqCst);
    }

    fn commit_configuration(&mut self) {
        self.stats.open.fetch_sub(1, Ordering::SeqCst);
        self.stats.commits.fetch_add(1, Ordering::SeqCst);
    }

    fn available_devices(&self) -> Vec<DeviceHandle> {
        self.devices.clone()
    }

    fn attached_inputs(&self) -> Vec<DeviceHandle> {
        self.attached.clone()
    }

    fn attach_input(&mut self, device: &DeviceHandle) -> Result<(), SessionError> {
        self.stats.check_refusal()?;
        self.attached.push(device.clone());
        if device.is_video() {
            self.zoom = device.zoom_range.min;
            self.orientation.get_or_insert(VideoOrientation::Portrait);
            self.stabilization.get_or_insert(StabilizationMode::Off);
        }
        Ok(())
    }

    fn detach_input(&mut self, device_id: &str) -> Result<(), SessionError> {
        self.attached.retain(|d| d.id != device_id);
        Ok(())
    }

    fn has_video_connection(&self) -> bool {
        self.attached.iter().any(|d| d.is_video())
    }

    fn preset(&self) -> QualityPreset {
        self.preset
    }

    fn supports_preset(&self, preset: QualityPreset) -> bool {
        preset != QualityPreset::Uhd3840x2160
    }

    fn set_preset(&mut self, preset: QualityPreset) -> Result<(), SessionError> {
        self.stats.check_refusal()?;
        self.preset = preset;
        Ok(())
    }

    fn zoom_factor(&self) -> f64 {
        self.zoom
    }

    fn set_zoom_factor(&mut self, factor: f64) -> Result<(), SessionError> {
        self.stats.check_refusal()?;
        self.zoom = factor;
        Ok(())
    }

    fn orientation(&self) -> Option<VideoOrientation> {
        self.orientation
    }

    fn set_orientation(&mut self, orientation: VideoOrientation) -> Result<(), SessionError> {
        self.stats.check_refusal()?;
        self.orientation = Some(orientation);
        Ok(())
    }

    fn stabilization(&self) -> Option<StabilizationMode> {
        self.stabilization
    }

    fn set_stabilization(&mut self, mode: StabilizationMode) -> Result<(), SessionError> {
        self.stats.check_refusal()?;
        self.stabilization = Some(mode);
        Ok(())
    }

    fn device_orientation(&self) -> Option<VideoOrientation> {
        self.physical_orientation
    }

    fn movie_output(&self) -> Arc<dyn MovieOutput> {
        self.movie.clone()
    }

    fn photo_output(&self) -> Arc<dyn PhotoOutput> {
        self.photo.clone()
    }
}

type ActiveRecording = (PathBuf, Arc<dyn RecordingDelegate>);

/// Movie output that "finishes" on a separate thread when stopped.
#[derive(Default)]
pub struct FakeMovieOutput {
    active: Mutex<Option<ActiveRecording>>,
    fail_start: AtomicBool,
    fail_finish: AtomicBool,
}

impl FakeMovieOutput {
    pub fn fail_start(&self) {
        self.fail_start.store(true, Ordering::SeqCst);
    }

    pub fn fail_finish(&self) {
        self.fail_finish.store(true, Ordering::SeqCst);
    }
}

impl MovieOutput for FakeMovieOutput {
    fn is_recording(&self) -> bool {
        self.active.lock().is_some()
    }

    fn start_recording(&self, path: &Path, delegate: Arc<dyn RecordingDelegate>) -> Result<(), CaptureError> {
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(CaptureError::DeviceUnavailable);
        }
        *self.active.lock() = Some((path.to_path_buf(), delegate));
        Ok(())
    }

    fn stop_recording(&self) {
        let Some((path, delegate)) = self.active.lock().take() else {
            return;
        };
        let outcome = if self.fail_finish.load(Ordering::SeqCst) {
            Err(CaptureError::OutputFailed("disk full".into()))
        } else {
            Ok(())
        };
        thread::spawn(move || delegate.on_recording_finished(&path, outcome));
    }
}

pub struct FakePhotoOutput {
    frame: Mutex<Result<RawFrame, CaptureError>>,
    last_settings: Mutex<Option<PhotoSettings>>,
}

impl Default for FakePhotoOutput {
    fn default() -> Self {
        Self {
            frame: Mutex::new(Ok(RawFrame::encoded(vec![0xff, 0xd8, 0xff, 0xe0], 640, 480))),
            last_settings: Mutex::new(None),
        }
    }
}

impl FakePhotoOutput {
    pub fn produce(&self, frame: Result<RawFrame, CaptureError>) {
        *self.frame.lock() = frame;
    }

    pub fn last_settings(&self) -> Option<PhotoSettings> {
        self.last_settings.lock().clone()
    }
}

#[async_trait]
impl PhotoOutput for FakePhotoOutput {
    async fn capture_single_frame(&self, settings: &PhotoSettings) -> Result<RawFrame, CaptureError> {
        *self.last_settings.lock() = Some(settings.clone());
        tokio::task::yield_now().await;
        self.frame.lock().clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LibraryCall {
    Bytes { album: String, len: usize },
    File { album: String, path: PathBuf },
}

#[derive(Default)]
pub struct FakeLibrary {
    calls: Mutex<Vec<LibraryCall>>,
    assets: Mutex<Vec<Asset>>,
    failing: AtomicBool,
}

impl FakeLibrary {
    pub fn failing() -> Self {
        let library = Self::default();
        library.failing.store(true, Ordering::SeqCst);
        library
    }

    pub fn calls(&self) -> Vec<LibraryCall> {
        self.calls.lock().clone()
    }

    pub fn insert(&self, asset: Asset) {
        self.assets.lock().push(asset);
    }

    fn check(&self) -> Result<(), PersistenceError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(PersistenceError::UnderlyingIoFailure("library offline".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MediaLibrary for FakeLibrary {
    async fn add_bytes(&self, album: &str, bytes: &[u8], _kind: MediaKind) -> Result<(), PersistenceError> {
        self.check()?;
        self.calls.lock().push(LibraryCall::Bytes {
            album: album.to_string(),
            len: bytes.len(),
        });
        Ok(())
    }

    async fn add_file(&self, album: &str, path: &Path, _kind: MediaKind) -> Result<(), PersistenceError> {
        self.check()?;
        self.calls.lock().push(LibraryCall::File {
            album: album.to_string(),
            path: path.to_path_buf(),
        });
        Ok(())
    }

    async fn fetch_recent(
        &self,
        _album: &str,
        kind: MediaKind,
        limit: usize,
    ) -> Result<Vec<Asset>, PersistenceError> {
        self.check()?;
        let mut assets: Vec<Asset> = self.assets.lock().iter().filter(|a| a.kind == kind).cloned().collect();
        assets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if limit > 0 {
            assets.truncate(limit);
        }
        Ok(assets)
    }
}

/// Resolver rooted at a fixed virtual path. Never touches the disk.
pub struct FakeResolver {
    root: PathBuf,
    taken: Mutex<HashSet<PathBuf>>,
    entries: Mutex<Vec<FileEntry>>,
    listing_delay: Mutex<Duration>,
    failing: AtomicBool,
}

impl Default for FakeResolver {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/virtual"),
            taken: Mutex::new(HashSet::new()),
            entries: Mutex::new(Vec::new()),
            listing_delay: Mutex::new(Duration::ZERO),
            failing: AtomicBool::new(false),
        }
    }
}

impl FakeResolver {
    pub fn failing() -> Self {
        let resolver = Self::default();
        resolver.failing.store(true, Ordering::SeqCst);
        resolver
    }

    pub fn add_entry(&self, path: impl Into<PathBuf>, age_secs: i64) {
        self.entries.lock().push(FileEntry {
            path: path.into(),
            modified_at: Utc::now() - chrono::Duration::seconds(age_secs),
        });
    }

    /// Make `list_directory` take `delay`; entries are read after the wait.
    pub fn delay_listing(&self, delay: Duration) {
        *self.listing_delay.lock() = delay;
    }

    fn check(&self) -> Result<(), PersistenceError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(PersistenceError::UnderlyingIoFailure("volume unmounted".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PathResolver for FakeResolver {
    async fn resolve_directory_path(&self, name: &str) -> Result<PathBuf, PersistenceError> {
        self.check()?;
        Ok(self.root.join(name))
    }

    async fn resolve_unique_path(&self, directory: &str, file_name: &str) -> Result<PathBuf, PersistenceError> {
        let dir = self.resolve_directory_path(directory).await?;
        let mut taken = self.taken.lock();
        let mut candidate = dir.join(file_name);
        let mut counter = 1;
        while taken.contains(&candidate) {
            candidate = dir.join(format!("{}-{}", counter, file_name));
            counter += 1;
        }
        taken.insert(candidate.clone());
        Ok(candidate)
    }

    async fn list_directory(&self, _directory: &str) -> Result<Vec<FileEntry>, PersistenceError> {
        self.check()?;
        let delay = *self.listing_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(self.entries.lock().clone())
    }
}
