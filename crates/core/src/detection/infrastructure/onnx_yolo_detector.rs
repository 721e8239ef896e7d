/// YOLO face detector using ONNX Runtime via `ort`.
///
/// Handles letterbox preprocessing, inference, NMS post-processing and the
/// mapping of boxes back into frame coordinates.
use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::constants::DEFAULT_MIN_FACE_SIZE;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

use super::execution_provider::preferred_execution_providers;

/// Fallback model input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

pub const DEFAULT_CONFIDENCE: f64 = 0.5;

pub const DEFAULT_NMS_IOU: f64 = 0.45;

/// Letterbox padding value (YOLO convention).
const PAD_VALUE: f32 = 114.0 / 255.0;

#[derive(Clone, Debug, PartialEq)]
pub struct DetectorConfig {
    pub confidence: f64,
    pub nms_iou: f64,
    /// Boxes narrower or shorter than this (in frame pixels) are dropped.
    pub min_face_size: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            confidence: DEFAULT_CONFIDENCE,
            nms_iou: DEFAULT_NMS_IOU,
            min_face_size: DEFAULT_MIN_FACE_SIZE,
        }
    }
}

/// YOLO face detector backed by an ONNX Runtime session.
pub struct OnnxYoloDetector {
    session: ort::session::Session,
    config: DetectorConfig,
    input_size: u32,
}

impl OnnxYoloDetector {
    /// Load a YOLO ONNX model and prepare for inference.
    ///
    /// The input resolution is read from the model's input shape (expecting NCHW).
    /// Falls back to 640 if the shape is dynamic or unreadable.
    pub fn new(model_path: &Path, config: DetectorConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    // [N, C, H, W]; input is square
                    if shape.len() >= 4 && shape[2] > 0 {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        log::info!(
            "Loaded face model {} (input {input_size}x{input_size})",
            model_path.display()
        );

        Ok(Self {
            session,
            config,
            input_size,
        })
    }
}

impl FaceDetector for OnnxYoloDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
        if frame.channels() != 3 || frame.width() == 0 || frame.height() == 0 {
            return Err(format!(
                "Unsupported frame {}x{}x{}",
                frame.width(),
                frame.height(),
                frame.channels()
            )
            .into());
        }

        let letterboxed = letterbox(frame, self.input_size);

        let input_value = ort::value::Tensor::from_array(letterboxed.tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("YOLO model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        let data = tensor
            .as_standard_layout()
            .as_slice()
            .ok_or("Cannot get tensor slice")?
            .to_vec();

        let raw = parse_detections(&data, &shape, self.config.confidence, &letterboxed)?;
        let kept = nms(raw, self.config.nms_iou);

        let min = self.config.min_face_size as i32;
        Ok(kept
            .iter()
            .filter_map(|d| {
                FaceBox::from_corners(d.x1, d.y1, d.x2, d.y2).clamp_to(frame.width(), frame.height())
            })
            .filter(|b| b.width >= min && b.height >= min)
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

struct Letterboxed {
    tensor: ndarray::Array4<f32>,
    scale: f64,
    pad_x: u32,
    pad_y: u32,
}

/// Letterbox-resize a frame to `target_size` × `target_size` as an NCHW
/// float tensor in `[0, 1]`.
fn letterbox(frame: &Frame, target_size: u32) -> Letterboxed {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = ((fw * scale).round() as u32).min(target_size);
    let new_h = ((fh * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let mut tensor = ndarray::Array4::<f32>::from_elem(
        (1, 3, target_size as usize, target_size as usize),
        PAD_VALUE,
    );

    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;

    // Nearest-neighbor resize into the padded area
    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    Letterboxed {
        tensor,
        scale,
        pad_x,
        pad_y,
    }
}

// ---------------------------------------------------------------------------
// Post-processing
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct RawDetection {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    confidence: f64,
}

/// Decodes `[1, features, detections]` or `[1, detections, features]` output
/// rows of the form `[cx, cy, w, h, conf, ...]` into frame coordinates.
fn parse_detections(
    data: &[f32],
    shape: &[usize],
    confidence: f64,
    lb: &Letterboxed,
) -> Result<Vec<RawDetection>, Box<dyn std::error::Error>> {
    if shape.len() != 3 {
        return Err(format!("Unexpected YOLO output shape: {shape:?}").into());
    }
    let transposed = shape[1] < shape[2];
    let (num_dets, num_feats) = if transposed {
        (shape[2], shape[1])
    } else {
        (shape[1], shape[2])
    };
    if num_feats < 5 {
        return Ok(Vec::new());
    }

    let at = |det: usize, feat: usize| -> f64 {
        if transposed {
            data[feat * num_dets + det] as f64
        } else {
            data[det * num_feats + feat] as f64
        }
    };

    let pad_x = lb.pad_x as f64;
    let pad_y = lb.pad_y as f64;
    let mut dets = Vec::new();
    for i in 0..num_dets {
        let conf = at(i, 4);
        if conf < confidence {
            continue;
        }
        let (cx, cy, w, h) = (at(i, 0), at(i, 1), at(i, 2), at(i, 3));
        dets.push(RawDetection {
            x1: ((cx - w / 2.0) - pad_x) / lb.scale,
            y1: ((cy - h / 2.0) - pad_y) / lb.scale,
            x2: ((cx + w / 2.0) - pad_x) / lb.scale,
            y2: ((cy + h / 2.0) - pad_y) / lb.scale,
            confidence: conf,
        });
    }
    Ok(dets)
}

/// Greedy NMS: sort by confidence descending, suppress overlapping boxes.
fn nms(mut dets: Vec<RawDetection>, iou_thresh: f64) -> Vec<RawDetection> {
    dets.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<RawDetection> = Vec::new();
    for det in dets {
        let overlaps = keep.iter().any(|k| {
            bbox_iou(
                &[k.x1, k.y1, k.x2, k.y2],
                &[det.x1, det.y1, det.x2, det.y2],
            ) > iou_thresh
        });
        if !overlaps {
            keep.push(det);
        }
    }
    keep
}

fn bbox_iou(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    inter / (area_a + area_b - inter)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn raw(x1: f64, y1: f64, x2: f64, y2: f64, confidence: f64) -> RawDetection {
        RawDetection {
            x1,
            y1,
            x2,
            y2,
            confidence,
        }
    }

    #[test]
    fn test_letterbox_preserves_aspect_ratio() {
        // 320x240 -> 640: scale 2.0, new 640x480, pad_y 80
        let frame = Frame::uniform(320, 240, 128, 0);
        let lb = letterbox(&frame, 640);

        assert_eq!(lb.tensor.shape(), &[1, 3, 640, 640]);
        assert_relative_eq!(lb.scale, 2.0);
        assert_eq!(lb.pad_x, 0);
        assert_eq!(lb.pad_y, 80);
    }

    #[test]
    fn test_letterbox_values_normalized() {
        let frame = Frame::uniform(100, 50, 255, 0);
        let lb = letterbox(&frame, 640);

        let y = lb.pad_y as usize + 1;
        let x = lb.pad_x as usize + 1;
        assert_relative_eq!(lb.tensor[[0, 0, y, x]], 1.0, epsilon = 0.01);
        assert_relative_eq!(lb.tensor[[0, 0, 0, 0]], PAD_VALUE, epsilon = 0.01);
    }

    #[test]
    fn test_parse_detections_maps_back_to_frame() {
        let frame = Frame::uniform(320, 240, 0, 0);
        let lb = letterbox(&frame, 640); // scale 2, pad_y 80
        // [1, 8 detections, 5 features]; only the first row is confident
        let mut data = vec![0.0f32; 8 * 5];
        data[..5].copy_from_slice(&[200.0, 280.0, 80.0, 100.0, 0.9]);
        let dets = parse_detections(&data, &[1, 8, 5], 0.5, &lb).unwrap();

        assert_eq!(dets.len(), 1);
        assert_relative_eq!(dets[0].x1, 80.0);
        assert_relative_eq!(dets[0].y1, 75.0);
        assert_relative_eq!(dets[0].x2, 120.0);
        assert_relative_eq!(dets[0].y2, 125.0);
    }

    #[test]
    fn test_parse_detections_transposed_layout_and_threshold() {
        let frame = Frame::uniform(640, 640, 0, 0);
        let lb = letterbox(&frame, 640);
        // [1, 5 features, 6 detections]: only detection 1 passes the threshold
        let mut data = vec![0.0f32; 5 * 6];
        let det = 1;
        data[det] = 100.0; // cx
        data[6 + det] = 100.0; // cy
        data[2 * 6 + det] = 40.0; // w
        data[3 * 6 + det] = 40.0; // h
        data[4 * 6 + det] = 0.8; // conf
        data[4 * 6 + 3] = 0.2;

        let dets = parse_detections(&data, &[1, 5, 6], 0.5, &lb).unwrap();
        assert_eq!(dets.len(), 1);
        assert_relative_eq!(dets[0].x1, 80.0);
        assert_relative_eq!(dets[0].confidence, 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_parse_detections_rejects_bad_shape() {
        let frame = Frame::uniform(10, 10, 0, 0);
        let lb = letterbox(&frame, 640);
        assert!(parse_detections(&[0.0; 5], &[5], 0.5, &lb).is_err());
    }

    #[test]
    fn test_nms_suppresses_overlapping() {
        let dets = vec![
            raw(0.0, 0.0, 100.0, 100.0, 0.8),
            raw(5.0, 5.0, 105.0, 105.0, 0.9),
        ];
        let kept = nms(dets, 0.3);
        assert_eq!(kept.len(), 1);
        assert_relative_eq!(kept[0].confidence, 0.9);
    }

    #[test]
    fn test_nms_keeps_non_overlapping() {
        let dets = vec![
            raw(0.0, 0.0, 50.0, 50.0, 0.9),
            raw(200.0, 200.0, 250.0, 250.0, 0.8),
        ];
        assert_eq!(nms(dets, 0.3).len(), 2);
    }

    #[test]
    fn test_nms_empty_input() {
        assert!(nms(Vec::new(), 0.3).is_empty());
    }

    #[test]
    fn test_bbox_iou() {
        assert_eq!(
            bbox_iou(&[0.0, 0.0, 10.0, 10.0], &[20.0, 20.0, 30.0, 30.0]),
            0.0
        );
        let b = [0.0, 0.0, 10.0, 10.0];
        assert_relative_eq!(bbox_iou(&b, &b), 1.0);
    }

    #[test]
    fn test_default_config() {
        let config = DetectorConfig::default();
        assert_eq!(config.min_face_size, 30);
        assert_relative_eq!(config.confidence, 0.5);
    }
}
