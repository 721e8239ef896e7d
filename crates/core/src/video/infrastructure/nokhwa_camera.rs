use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

use crate::shared::frame::Frame;
use crate::video::domain::frame_source::FrameSource;

/// Webcam frame source backed by `nokhwa`.
///
/// The device is opened lazily by [`FrameSource::open`] and closed again by
/// [`FrameSource::release`] or on drop.
pub struct NokhwaCamera {
    index: u32,
    camera: Option<Camera>,
    frames_read: usize,
}

impl NokhwaCamera {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            camera: None,
            frames_read: 0,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    fn stop(&self, mut camera: Camera) {
        if let Err(e) = camera.stop_stream() {
            log::warn!("Failed to stop camera {}: {e}", self.index);
        } else {
            log::info!("Released camera {}", self.index);
        }
    }
}

impl FrameSource for NokhwaCamera {
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if self.is_open() {
            return Ok(());
        }
        if let Some(stale) = take_stale(&mut self.camera, Camera::is_stream_open) {
            log::info!("Camera {} stream ended, reopening", self.index);
            self.stop(stale);
        }
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(self.index), requested)?;
        camera.open_stream()?;
        let format = camera.camera_format();
        log::info!(
            "Opened camera {} ({}x{} @ {} fps)",
            self.index,
            format.width(),
            format.height(),
            format.frame_rate()
        );
        self.camera = Some(camera);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.camera
            .as_ref()
            .map(|camera| camera.is_stream_open())
            .unwrap_or(false)
    }

    fn read(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let Some(camera) = self.camera.as_mut() else {
            return Ok(None);
        };
        let buffer = camera.frame()?;
        let decoded = buffer.decode_image::<RgbFormat>()?;
        let (width, height) = (decoded.width(), decoded.height());
        let data = decoded.into_raw();
        if width == 0 || height == 0 || data.len() != width as usize * height as usize * 3 {
            return Ok(None);
        }
        let frame = Frame::new(data, width, height, 3, self.frames_read);
        self.frames_read += 1;
        Ok(Some(frame))
    }

    fn release(&mut self) {
        if let Some(camera) = self.camera.take() {
            self.stop(camera);
        }
    }
}

/// Takes a handle out of `slot` if its stream is no longer live, so the
/// device is freed before it is opened again.
fn take_stale<C>(slot: &mut Option<C>, is_live: impl Fn(&C) -> bool) -> Option<C> {
    if slot.as_ref().is_some_and(|handle| !is_live(handle)) {
        slot.take()
    } else {
        None
    }
}

impl Drop for NokhwaCamera {
    fn drop(&mut self) {
        self.release();
    }
}

/// Requests camera permission where the OS requires it up front.
///
/// Only macOS needs this; elsewhere it is a no-op.
pub fn request_camera_access() {
    #[cfg(target_os = "macos")]
    {
        nokhwa::nokhwa_initialize(|granted| {
            if !granted {
                log::warn!("Camera access was not granted");
            }
        });
    }
}
