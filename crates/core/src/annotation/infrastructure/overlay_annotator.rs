use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::shared::constants::FPS_GOOD_THRESHOLD;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

use super::bitmap_font;

pub const BOX_COLOR: [u8; 3] = [255, 0, 0];
pub const FPS_GOOD_COLOR: [u8; 3] = [0, 255, 0];
pub const FPS_BAD_COLOR: [u8; 3] = [0, 0, 255];

const BOX_THICKNESS: i32 = 2;
const FPS_ORIGIN: (i32, i32) = (10, 10);
const FPS_SCALE: u32 = 3;

/// Draws face rectangles and the FPS readout directly onto RGB frames.
pub struct OverlayAnnotator {
    fps_threshold: f64,
}

impl OverlayAnnotator {
    pub fn new(fps_threshold: f64) -> Self {
        Self { fps_threshold }
    }

    /// Color used for the FPS readout; the threshold itself counts as good.
    pub fn fps_color(&self, fps: f64) -> [u8; 3] {
        if fps >= self.fps_threshold {
            FPS_GOOD_COLOR
        } else {
            FPS_BAD_COLOR
        }
    }
}

impl Default for OverlayAnnotator {
    fn default() -> Self {
        Self::new(FPS_GOOD_THRESHOLD)
    }
}

pub fn format_fps(fps: f64) -> String {
    format!("FPS: {fps:.2}")
}

impl FrameAnnotator for OverlayAnnotator {
    fn draw_faces(&self, frame: &mut Frame, faces: &[FaceBox]) {
        if frame.channels() != 3 {
            return;
        }
        let mut img = frame.as_rgb_image_mut();
        for face in faces {
            if face.width < 0 || face.height < 0 {
                continue;
            }
            // Corners land on (x, y) and (x + w, y + h), inset for thickness.
            for inset in 0..BOX_THICKNESS {
                let w = face.width - 2 * inset + 1;
                let h = face.height - 2 * inset + 1;
                if w <= 0 || h <= 0 {
                    break;
                }
                let rect = Rect::at(face.x + inset, face.y + inset).of_size(w as u32, h as u32);
                draw_hollow_rect_mut(&mut img, rect, image::Rgb(BOX_COLOR));
            }
        }
    }

    fn draw_fps(&self, frame: &mut Frame, fps: f64) {
        let (x, y) = FPS_ORIGIN;
        let text = format_fps(fps);
        let scale = fitting_scale(&text, frame.width(), frame.height());
        bitmap_font::draw_text(frame, x, y, &text, self.fps_color(fps), scale);
    }
}

/// Largest scale up to `FPS_SCALE` at which `text` fits inside the frame.
fn fitting_scale(text: &str, width: u32, height: u32) -> u32 {
    let (x, y) = FPS_ORIGIN;
    (1..=FPS_SCALE)
        .rev()
        .find(|&scale| {
            x as u32 + bitmap_font::text_width(text, scale) <= width
                && y as u32 + bitmap_font::text_height(scale) <= height
        })
        .unwrap_or(1)
}
