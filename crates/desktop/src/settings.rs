use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use facecam_core::detection::infrastructure::onnx_yolo_detector::{
    DetectorConfig, DEFAULT_CONFIDENCE, DEFAULT_NMS_IOU,
};
use facecam_core::pipeline::live_view_controller::LiveViewConfig;
use facecam_core::shared::constants::{
    APP_DIR_NAME, DEFAULT_CAMERA_INDEX, DEFAULT_MIN_FACE_SIZE, DETECTION_INTERVAL,
    FPS_GOOD_THRESHOLD, FPS_WINDOW, FRAME_DELAY, PLACEHOLDER_GRAY, WORKING_HEIGHT, WORKING_WIDTH,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    System,
    Dark,
    Light,
}

/// Optional overrides read from `<config dir>/FaceCam/settings.json`.
///
/// The file is never written by the app; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub camera_index: u32,
    pub frame_width: u32,
    pub frame_height: u32,
    pub detection_interval: u64,
    pub frame_delay_ms: u64,
    pub fps_threshold: f64,
    pub confidence: f64,
    pub min_face_size: u32,
    pub mirror: bool,
    pub appearance: Appearance,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera_index: DEFAULT_CAMERA_INDEX,
            frame_width: WORKING_WIDTH,
            frame_height: WORKING_HEIGHT,
            detection_interval: DETECTION_INTERVAL,
            frame_delay_ms: FRAME_DELAY.as_millis() as u64,
            fps_threshold: FPS_GOOD_THRESHOLD,
            confidence: DEFAULT_CONFIDENCE,
            min_face_size: DEFAULT_MIN_FACE_SIZE,
            mirror: true,
            appearance: Appearance::System,
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("settings.json"))
    }

    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Self::default(),
        }
    }

    /// Reads settings from `path`, falling back to defaults on any error.
    pub fn load_from(path: &Path) -> Self {
        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| serde_json::from_str::<Settings>(&json).map_err(|e| e.to_string()));
        match parsed {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings.sanitized()
            }
            Err(e) => {
                log::warn!("Ignoring settings file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Replaces values that would stall or break the live view.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.frame_width == 0 || self.frame_height == 0 {
            self.frame_width = defaults.frame_width;
            self.frame_height = defaults.frame_height;
        }
        if self.detection_interval == 0 {
            self.detection_interval = defaults.detection_interval;
        }
        if self.frame_delay_ms == 0 {
            self.frame_delay_ms = defaults.frame_delay_ms;
        }
        self.confidence = self.confidence.clamp(0.0, 1.0);
        self
    }

    pub fn live_view_config(&self) -> LiveViewConfig {
        LiveViewConfig {
            width: self.frame_width,
            height: self.frame_height,
            detection_interval: self.detection_interval,
            fps_window: FPS_WINDOW,
            fps_threshold: self.fps_threshold,
            frame_delay: Duration::from_millis(self.frame_delay_ms),
            mirror: self.mirror,
            placeholder_gray: PLACEHOLDER_GRAY,
        }
    }

    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            confidence: self.confidence,
            nms_iou: DEFAULT_NMS_IOU,
            min_face_size: self.min_face_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_live_view_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.live_view_config(), LiveViewConfig::default());
        assert_eq!(settings.detector_config(), DetectorConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, r#"{ "camera_index": 2, "appearance": "dark" }"#).unwrap();

        let settings = Settings::load_from(&path);

        assert_eq!(settings.camera_index, 2);
        assert_eq!(settings.appearance, Appearance::Dark);
        assert_eq!(settings.detection_interval, DETECTION_INTERVAL);
        assert_eq!(settings.frame_width, WORKING_WIDTH);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, "not json").unwrap();

        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(
            Settings::load_from(&tmp.path().join("absent.json")),
            Settings::default()
        );
    }

    #[test]
    fn test_zero_values_are_sanitized() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "detection_interval": 0, "frame_delay_ms": 0, "frame_width": 0, "confidence": 3.0 }"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path);

        assert_eq!(settings.detection_interval, DETECTION_INTERVAL);
        assert_eq!(settings.frame_delay_ms, FRAME_DELAY.as_millis() as u64);
        assert_eq!(settings.frame_width, WORKING_WIDTH);
        assert_eq!(settings.confidence, 1.0);
    }

    #[test]
    fn test_conversion_carries_overrides() {
        let settings = Settings {
            frame_delay_ms: 33,
            fps_threshold: 24.0,
            mirror: false,
            min_face_size: 12,
            ..Settings::default()
        };

        let live = settings.live_view_config();
        assert_eq!(live.frame_delay, Duration::from_millis(33));
        assert_eq!(live.fps_threshold, 24.0);
        assert!(!live.mirror);
        assert_eq!(settings.detector_config().min_face_size, 12);
    }
}
