use crate::shared::frame::Frame;

/// A live source of frames, typically a camera device.
///
/// `open` and `release` must be idempotent: the controller calls them on
/// every start/stop transition without tracking prior calls.
pub trait FrameSource {
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error>>;

    fn is_open(&self) -> bool;

    /// Reads the next frame. `Ok(None)` means no frame is available right now.
    fn read(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    fn release(&mut self);
}
