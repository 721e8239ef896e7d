use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Domain interface for drawing overlays onto a frame.
///
/// Implementations modify the frame in-place (`&mut Frame`).
pub trait FrameAnnotator {
    fn draw_faces(&self, frame: &mut Frame, faces: &[FaceBox]);

    fn draw_fps(&self, frame: &mut Frame, fps: f64);
}
