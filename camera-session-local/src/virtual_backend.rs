//! Software capture backend.
//!
//! Simulates a back camera, a front camera and a microphone. Recordings are
//! written frame by frame on a dedicated writer thread; photos are small
//! JPEG-framed buffers produced in memory.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use camera_session_core::models::captured_file::RawFrame;
use camera_session_core::models::config::{PhotoSettings, QualityPrioritization};
use camera_session_core::models::device::{
    DeviceHandle, DevicePosition, QualityPreset, StabilizationMode, VideoOrientation, ZoomRange,
};
use camera_session_core::models::error::{CaptureError, SessionError};
use camera_session_core::traits::capture_backend::CaptureBackend;
use camera_session_core::traits::capture_delegate::RecordingDelegate;
use camera_session_core::traits::outputs::{MovieOutput, PhotoOutput};

const MOVIE_MAGIC: &[u8; 4] = b"VMOV";
const FRAME_PAYLOAD: usize = 256;

/// In-process stand-in for a platform capture session.
pub struct VirtualBackend {
    running: bool,
    configuring: bool,
    devices: Vec<DeviceHandle>,
    attached: Vec<DeviceHandle>,
    preset: QualityPreset,
    zoom: f64,
    orientation: Option<VideoOrientation>,
    stabilization: Option<StabilizationMode>,
    sensor_orientation: Option<VideoOrientation>,
    movie: Arc<VirtualMovieOutput>,
    photo: Arc<VirtualPhotoOutput>,
}

impl VirtualBackend {
    /// Back camera (1x-8x), front camera (1x-2x) and one microphone.
    pub fn new() -> Self {
        Self::with_devices(vec![
            DeviceHandle::camera("virtual-back", DevicePosition::Back, ZoomRange::new(1.0, 8.0)),
            DeviceHandle::camera("virtual-front", DevicePosition::Front, ZoomRange::new(1.0, 2.0)),
            DeviceHandle::microphone("virtual-mic"),
        ])
    }

    pub fn with_devices(devices: Vec<DeviceHandle>) -> Self {
        Self {
            running: false,
            configuring: false,
            devices,
            attached: Vec::new(),
            preset: QualityPreset::High,
            zoom: 1.0,
            orientation: None,
            stabilization: None,
            sensor_orientation: None,
            movie: Arc::new(VirtualMovieOutput::new(Duration::from_millis(33))),
            photo: Arc::new(VirtualPhotoOutput::default()),
        }
    }

    /// Report `orientation` as the physical device orientation.
    pub fn with_sensor_orientation(mut self, orientation: VideoOrientation) -> Self {
        self.sensor_orientation = Some(orientation);
        self
    }

    /// Write a frame every `interval` while recording.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.movie = Arc::new(VirtualMovieOutput::new(interval));
        self
    }

    fn ensure_configuring(&self, what: &str) {
        if !self.configuring {
            log::warn!("{} changed outside a configuration block", what);
        }
    }
}

impl Default for VirtualBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for VirtualBackend {
    fn is_running(&self) -> bool {
        self.running
    }

    fn start_running(&mut self) -> Result<(), SessionError> {
        self.running = true;
        log::info!("Virtual capture session running ({} devices)", self.devices.len());
        Ok(())
    }

    fn stop_running(&mut self) {
        if self.movie.is_recording() {
            self.movie.stop_recording();
        }
        self.running = false;
        log::info!("Virtual capture session stopped");
    }

    fn begin_configuration(&mut self) {
        self.configuring = true;
    }

    fn commit_configuration(&mut self) {
        self.configuring = false;
    }

    fn available_devices(&self) -> Vec<DeviceHandle> {
        self.devices.clone()
    }

    fn attached_inputs(&self) -> Vec<DeviceHandle> {
        self.attached.clone()
    }

    fn attach_input(&mut self, device: &DeviceHandle) -> Result<(), SessionError> {
        self.ensure_configuring("input");
        if !self.devices.iter().any(|d| d.id == device.id) {
            return Err(SessionError::NoDevice);
        }
        if self.attached.iter().any(|d| d.id == device.id) {
            return Ok(());
        }
        if device.is_video() {
            self.zoom = device.zoom_range.min;
            self.orientation.get_or_insert(VideoOrientation::Portrait);
            if !self.stabilization.map(|m| device.supports_stabilization(m)).unwrap_or(false) {
                self.stabilization = Some(StabilizationMode::Off);
            }
        }
        self.attached.push(device.clone());
        log::debug!("Attached {:?} input {}", device.kind, device.id);
        Ok(())
    }

    fn detach_input(&mut self, device_id: &str) -> Result<(), SessionError> {
        self.ensure_configuring("input");
        self.attached.retain(|d| d.id != device_id);
        if !self.has_video_connection() {
            self.orientation = None;
            self.stabilization = None;
        }
        Ok(())
    }

    fn has_video_connection(&self) -> bool {
        self.attached.iter().any(DeviceHandle::is_video)
    }

    fn preset(&self) -> QualityPreset {
        self.preset
    }

    fn supports_preset(&self, preset: QualityPreset) -> bool {
        match self.current_device().map(|d| d.position) {
            Some(DevicePosition::Front) => preset != QualityPreset::Uhd3840x2160,
            _ => true,
        }
    }

    fn set_preset(&mut self, preset: QualityPreset) -> Result<(), SessionError> {
        self.ensure_configuring("preset");
        self.preset = preset;
        Ok(())
    }

    fn zoom_factor(&self) -> f64 {
        self.zoom
    }

    fn set_zoom_factor(&mut self, factor: f64) -> Result<(), SessionError> {
        self.ensure_configuring("zoom");
        let range = self.current_device().ok_or(SessionError::NoDevice)?.zoom_range;
        if !range.contains(factor) {
            return Err(SessionError::UnsupportedValue(format!("zoom {} outside {}-{}", factor, range.min, range.max)));
        }
        self.zoom = factor;
        Ok(())
    }

    fn orientation(&self) -> Option<VideoOrientation> {
        self.orientation
    }

    fn set_orientation(&mut self, orientation: VideoOrientation) -> Result<(), SessionError> {
        self.ensure_configuring("orientation");
        if !self.has_video_connection() {
            return Err(SessionError::NoConnection);
        }
        self.orientation = Some(orientation);
        Ok(())
    }

    fn stabilization(&self) -> Option<StabilizationMode> {
        self.stabilization
    }

    fn set_stabilization(&mut self, mode: StabilizationMode) -> Result<(), SessionError> {
        self.ensure_configuring("stabilization");
        if !self.has_video_connection() {
            return Err(SessionError::NoConnection);
        }
        self.stabilization = Some(mode);
        Ok(())
    }

    fn device_orientation(&self) -> Option<VideoOrientation> {
        self.sensor_orientation
    }

    fn movie_output(&self) -> Arc<dyn MovieOutput> {
        self.movie.clone()
    }

    fn photo_output(&self) -> Arc<dyn PhotoOutput> {
        self.photo.clone()
    }
}

struct ActiveWriter {
    path: PathBuf,
    running: Arc<AtomicBool>,
}

/// Movie output writing synthetic frames to disk.
///
/// The file is created and written on a dedicated writer thread.
/// `stop_recording` only signals that thread; the delegate is called from it
/// once the file is flushed, or as soon as creating or writing it fails.
pub struct VirtualMovieOutput {
    frame_interval: Duration,
    active: Mutex<Option<ActiveWriter>>,
}

impl VirtualMovieOutput {
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            frame_interval,
            active: Mutex::new(None),
        }
    }
}

impl MovieOutput for VirtualMovieOutput {
    fn is_recording(&self) -> bool {
        self.active.lock().is_some()
    }

    fn start_recording(&self, path: &Path, delegate: Arc<dyn RecordingDelegate>) -> Result<(), CaptureError> {
        let mut active = self.active.lock();
        if let Some(current) = active.as_ref() {
            return Err(CaptureError::OutputFailed(format!(
                "already writing {}",
                current.path.display()
            )));
        }

        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);
        let thread_path = path.to_path_buf();
        let interval = self.frame_interval;

        thread::Builder::new()
            .name("virtual-movie-writer".into())
            .spawn(move || {
                let outcome = File::create(&thread_path)
                    .map_err(|e| {
                        CaptureError::OutputFailed(format!("failed to create {}: {}", thread_path.display(), e))
                    })
                    .and_then(|file| write_frames(file, &thread_running, interval));
                // Failures are reported through the delegate only.
                if let Ok(frames) = &outcome {
                    log::debug!("Finished {} ({} frames)", thread_path.display(), frames);
                }
                delegate.on_recording_finished(&thread_path, outcome.map(|_| ()));
            })
            .map_err(|e| CaptureError::OutputFailed(format!("failed to spawn writer thread: {}", e)))?;

        *active = Some(ActiveWriter {
            path: path.to_path_buf(),
            running,
        });
        Ok(())
    }

    fn stop_recording(&self) {
        if let Some(writer) = self.active.lock().take() {
            writer.running.store(false, Ordering::SeqCst);
        }
    }
}

/// Writer loop. Always emits at least one frame so a finished file is never
/// just a header.
fn write_frames(file: File, running: &AtomicBool, interval: Duration) -> Result<u64, CaptureError> {
    let io_err = |e: std::io::Error| CaptureError::OutputFailed(format!("write failed: {}", e));
    let mut out = BufWriter::new(file);
    out.write_all(MOVIE_MAGIC).map_err(io_err)?;

    let mut index: u64 = 0;
    loop {
        out.write_all(&index.to_le_bytes()).map_err(io_err)?;
        out.write_all(&[(index % 251) as u8; FRAME_PAYLOAD]).map_err(io_err)?;
        index += 1;
        if !running.load(Ordering::SeqCst) {
            break;
        }
        thread::sleep(interval);
    }

    let file = out.into_inner().map_err(|e| io_err(e.into_error()))?;
    file.sync_all().map_err(io_err)?;
    Ok(index)
}

/// Photo output producing small JPEG-framed buffers.
#[derive(Default)]
pub struct VirtualPhotoOutput {
    shots: AtomicU64,
}

#[async_trait]
impl PhotoOutput for VirtualPhotoOutput {
    async fn capture_single_frame(&self, settings: &PhotoSettings) -> Result<RawFrame, CaptureError> {
        let exposure = match settings.prioritization {
            QualityPrioritization::Speed => Duration::ZERO,
            QualityPrioritization::Balanced => Duration::from_millis(5),
            QualityPrioritization::Quality => Duration::from_millis(20),
        };
        tokio::time::sleep(exposure).await;

        let shot = self.shots.fetch_add(1, Ordering::SeqCst);
        let mut data = vec![0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10];
        data.extend_from_slice(b"JFIF\0");
        data.extend_from_slice(&shot.to_be_bytes());
        data.push(settings.red_eye_reduction as u8);
        data.extend_from_slice(&[0xff, 0xd9]);

        Ok(RawFrame::encoded(data, 1920, 1080))
    }
}
