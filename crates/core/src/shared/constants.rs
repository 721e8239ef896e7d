use std::time::Duration;

pub const FACE_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const FACE_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

/// Application folder under the platform cache/config directories.
pub const APP_DIR_NAME: &str = "FaceCam";

pub const DEFAULT_CAMERA_INDEX: u32 = 0;

/// Working resolution every captured frame is resized to.
pub const WORKING_WIDTH: u32 = 320;
pub const WORKING_HEIGHT: u32 = 240;

/// Run the detector on every Nth processed frame.
pub const DETECTION_INTERVAL: u64 = 5;

/// Delay between two scheduled cycles.
pub const FRAME_DELAY: Duration = Duration::from_millis(10);

pub const FPS_WINDOW: Duration = Duration::from_secs(1);

/// FPS at or above this value is drawn in the "good" color.
pub const FPS_GOOD_THRESHOLD: f64 = 30.0;

/// Gray level of the placeholder shown while stopped.
pub const PLACEHOLDER_GRAY: u8 = 128;

pub const DEFAULT_MIN_FACE_SIZE: u32 = 30;
