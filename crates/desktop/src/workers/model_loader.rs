use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use facecam_core::detection::domain::face_detector::FaceDetector;
use facecam_core::detection::infrastructure::model_resolver::{self, ProgressFn};
use facecam_core::detection::infrastructure::onnx_yolo_detector::{
    DetectorConfig, OnnxYoloDetector,
};
use facecam_core::shared::constants::{FACE_MODEL_NAME, FACE_MODEL_URL};

pub enum ModelMessage {
    DownloadProgress(u64, u64),
    Ready(Box<dyn FaceDetector>),
    Failed(String),
}

impl std::fmt::Debug for ModelMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelMessage::DownloadProgress(dl, total) => {
                write!(f, "DownloadProgress({dl}, {total})")
            }
            ModelMessage::Ready(_) => write!(f, "Ready"),
            ModelMessage::Failed(e) => write!(f, "Failed({e})"),
        }
    }
}

/// Resolves the face model (downloading it on first run) and builds the
/// detector on a background thread.
pub fn spawn(config: DetectorConfig) -> Receiver<ModelMessage> {
    spawn_with(
        |progress| {
            model_resolver::resolve(
                FACE_MODEL_NAME,
                FACE_MODEL_URL,
                bundled_model_dir().as_deref(),
                Some(progress),
            )
            .map_err(|e| e.to_string())
        },
        move |path| {
            OnnxYoloDetector::new(path, config)
                .map(|d| Box::new(d) as Box<dyn FaceDetector>)
                .map_err(|e| e.to_string())
        },
    )
}

fn spawn_with<R, B>(resolve: R, build: B) -> Receiver<ModelMessage>
where
    R: FnOnce(ProgressFn) -> Result<PathBuf, String> + Send + 'static,
    B: FnOnce(&Path) -> Result<Box<dyn FaceDetector>, String> + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::unbounded::<ModelMessage>();

    thread::spawn(move || {
        let message = match load(&tx, resolve, build) {
            Ok(detector) => ModelMessage::Ready(detector),
            Err(e) => {
                log::error!("Face model unavailable: {e}");
                ModelMessage::Failed(e)
            }
        };
        let _ = tx.send(message);
    });

    rx
}

fn load<R, B>(tx: &Sender<ModelMessage>, resolve: R, build: B) -> Result<Box<dyn FaceDetector>, String>
where
    R: FnOnce(ProgressFn) -> Result<PathBuf, String>,
    B: FnOnce(&Path) -> Result<Box<dyn FaceDetector>, String>,
{
    let tx_progress = tx.clone();
    let progress: ProgressFn = Box::new(move |downloaded, total| {
        let _ = tx_progress.send(ModelMessage::DownloadProgress(downloaded, total));
    });
    let model_path = resolve(progress)?;
    build(&model_path)
}

/// `models/` next to the executable, for pre-packaged installs.
fn bundled_model_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("models")))
}
