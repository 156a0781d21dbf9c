//! Records a short clip and takes a photo with the virtual backend.
//!
//! Usage: `capture-demo [OUTPUT_DIR] [SECONDS]`. Set `RUST_LOG=debug` to see
//! the configuration pipeline.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use camera_session_core::{
    CameraSession, Collaborators, DevicePosition, FlashMode, QualityPreset, SessionConfiguration, StabilizationMode,
};
use camera_session_local::{FolderLibrary, FsPathResolver, StaticPermission, VirtualBackend};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let root = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("camera-session-demo"));
    let seconds: u64 = match args.next() {
        Some(s) => s.parse()?,
        None => 2,
    };

    let collaborators = Collaborators {
        library: Arc::new(FolderLibrary::new(root.join("Library"))),
        resolver: Arc::new(FsPathResolver::new(&root)),
        permissions: Arc::new(StaticPermission::from_env()),
    };
    let session =
        CameraSession::launch(Box::new(VirtualBackend::new()), collaborators, SessionConfiguration::default()).await?;

    session
        .quality(QualityPreset::Hd1920x1080)?
        .stabilization(StabilizationMode::Standard)?
        .zoom(2.0)?;
    log::info!("Device state: {:?}", session.state());

    let mut videos = session.videos();
    let path = session.start_recording().await?;
    println!("Recording to {}", path.display());
    tokio::time::sleep(Duration::from_secs(seconds)).await;
    session.stop_recording().await?;

    // The first value may be a clip from an earlier run.
    let finished = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(outcome) = videos.recv().await {
            match outcome {
                Ok(file) if file.path() == Some(path.as_path()) => return Some(Ok(file)),
                Ok(_) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        None
    })
    .await;
    match finished {
        Ok(Some(Ok(file))) => println!("Finished {:?}", file.path()),
        Ok(Some(Err(e))) => eprintln!("Recording failed: {}", e),
        Ok(None) | Err(_) => eprintln!("No recording result"),
    }

    session.position(DevicePosition::Front)?;
    session.camera().set_flash(FlashMode::Auto);
    let photo = session.capture_photo().await?;
    println!("Captured photo ({} bytes)", photo.bytes().map(<[u8]>::len).unwrap_or(0));

    for file in session.recorder().files(0).await {
        println!("video: {:?}", file.path());
    }
    for file in session.camera().files(0).await {
        println!("photo: {:?} at {}", file.path(), file.produced_at);
    }

    session.shutdown().await;
    Ok(())
}
