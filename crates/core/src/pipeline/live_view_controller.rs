use std::time::{Duration, Instant};

use thiserror::Error;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::infrastructure::skip_frame_detector::SkipFrameDetector;
use crate::pipeline::fps_counter::FpsCounter;
use crate::shared::constants::{
    DETECTION_INTERVAL, FPS_GOOD_THRESHOLD, FPS_WINDOW, FRAME_DELAY, PLACEHOLDER_GRAY,
    WORKING_HEIGHT, WORKING_WIDTH,
};
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;
use crate::video::domain::display_sink::DisplaySink;
use crate::video::domain::frame_source::FrameSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiveViewError {
    #[error("could not open camera: {0}")]
    CameraOpen(String),
    #[error("face detector is not ready yet")]
    DetectorNotReady,
}

/// What a single scheduled tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A camera frame was processed and shown.
    Rendered,
    /// Running, but the camera had no frame this time.
    Skipped,
    /// Stopped; the placeholder was shown.
    Idle,
    /// The camera stream closed underneath a running view. No frame was
    /// read and the controller is now stopped.
    CameraLost,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiveViewConfig {
    pub width: u32,
    pub height: u32,
    pub detection_interval: u64,
    pub fps_window: Duration,
    pub fps_threshold: f64,
    pub frame_delay: Duration,
    pub mirror: bool,
    pub placeholder_gray: u8,
}

impl Default for LiveViewConfig {
    fn default() -> Self {
        Self {
            width: WORKING_WIDTH,
            height: WORKING_HEIGHT,
            detection_interval: DETECTION_INTERVAL,
            fps_window: FPS_WINDOW,
            fps_threshold: FPS_GOOD_THRESHOLD,
            frame_delay: FRAME_DELAY,
            mirror: true,
            placeholder_gray: PLACEHOLDER_GRAY,
        }
    }
}

/// Owns the run/stop state and drives capture → detect → annotate → display.
///
/// Every method runs on the caller's thread; the UI event loop decides when
/// the next tick happens.
pub struct LiveViewController {
    source: Box<dyn FrameSource>,
    annotator: Box<dyn FrameAnnotator>,
    detector: Option<SkipFrameDetector>,
    fps: FpsCounter,
    state: RunState,
    config: LiveViewConfig,
}

impl LiveViewController {
    pub fn new(
        source: Box<dyn FrameSource>,
        annotator: Box<dyn FrameAnnotator>,
        config: LiveViewConfig,
    ) -> Self {
        Self {
            source,
            annotator,
            detector: None,
            fps: FpsCounter::new(Instant::now(), config.fps_window),
            state: RunState::Stopped,
            config,
        }
    }

    pub fn install_detector(&mut self, detector: Box<dyn FaceDetector>) -> Result<(), &'static str> {
        self.detector = Some(SkipFrameDetector::new(
            detector,
            self.config.detection_interval,
        )?);
        Ok(())
    }

    pub fn has_detector(&self) -> bool {
        self.detector.is_some()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn config(&self) -> &LiveViewConfig {
        &self.config
    }

    pub fn current_fps(&self) -> f64 {
        self.fps.current_fps()
    }

    /// Boxes drawn on the most recent frame (empty before any detection).
    pub fn cached_faces(&self) -> &[FaceBox] {
        self.detector
            .as_ref()
            .map(|d| d.last_boxes())
            .unwrap_or(&[])
    }

    /// `Stopped → Running`. A no-op while already running.
    pub fn start(&mut self) -> Result<(), LiveViewError> {
        if self.is_running() {
            return Ok(());
        }
        if self.detector.is_none() {
            return Err(LiveViewError::DetectorNotReady);
        }
        if !self.source.is_open() {
            self.source
                .open()
                .map_err(|e| LiveViewError::CameraOpen(e.to_string()))?;
        }
        self.fps.restart(Instant::now());
        self.state = RunState::Running;
        log::info!("Live view started");
        Ok(())
    }

    /// `Running → Stopped`. Releases the camera; cached faces are kept.
    pub fn stop(&mut self) {
        self.source.release();
        if self.is_running() {
            self.state = RunState::Stopped;
            log::info!("Live view stopped");
        }
    }

    pub fn toggle(&mut self) -> Result<RunState, LiveViewError> {
        match self.state {
            RunState::Stopped => self.start()?,
            RunState::Running => self.stop(),
        }
        Ok(self.state)
    }

    /// Final teardown before the window closes.
    pub fn shutdown(&mut self) {
        self.stop();
        log::debug!("Live view shut down");
    }

    /// Runs one tick: a capture cycle while running, the idle cycle otherwise.
    pub fn tick(&mut self, now: Instant, sink: &mut dyn DisplaySink) -> CycleOutcome {
        match self.state {
            RunState::Running => self.run_cycle(now, sink),
            RunState::Stopped => self.idle_cycle(sink),
        }
    }

    /// One capture → detect → annotate → display cycle.
    ///
    /// Does nothing (and reads no frame) unless running.
    pub fn run_cycle(&mut self, now: Instant, sink: &mut dyn DisplaySink) -> CycleOutcome {
        if !self.is_running() {
            return CycleOutcome::Skipped;
        }
        if !self.source.is_open() {
            log::warn!("Camera stream closed while running, stopping live view");
            self.stop();
            return CycleOutcome::CameraLost;
        }

        let raw = match self.source.read() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                log::debug!("No frame available, skipping cycle");
                return CycleOutcome::Skipped;
            }
            Err(e) => {
                log::debug!("Camera read failed, skipping cycle: {e}");
                return CycleOutcome::Skipped;
            }
        };

        let mut frame = raw.resized(self.config.width, self.config.height);
        if self.config.mirror {
            frame.mirror_horizontal();
        }

        let faces = self.detect_faces(&frame);

        let mut annotated = frame.clone();
        self.annotator.draw_faces(&mut annotated, &faces);
        let fps = self.fps.tick(now);
        self.annotator.draw_fps(&mut annotated, fps);

        sink.show(&annotated);
        CycleOutcome::Rendered
    }

    /// Shows the uniform placeholder while stopped.
    pub fn idle_cycle(&mut self, sink: &mut dyn DisplaySink) -> CycleOutcome {
        sink.show(&self.placeholder());
        CycleOutcome::Idle
    }

    pub fn placeholder(&self) -> Frame {
        Frame::uniform(
            self.config.width,
            self.config.height,
            self.config.placeholder_gray,
            0,
        )
    }

    fn detect_faces(&mut self, frame: &Frame) -> Vec<FaceBox> {
        let Some(detector) = self.detector.as_mut() else {
            return Vec::new();
        };
        match detector.detect(frame) {
            Ok(faces) => faces,
            Err(e) => {
                log::warn!("Face detection failed on frame {}: {e}", frame.index());
                Vec::new()
            }
        }
    }
}

impl Drop for LiveViewController {
    fn drop(&mut self) {
        self.source.release();
    }
}
