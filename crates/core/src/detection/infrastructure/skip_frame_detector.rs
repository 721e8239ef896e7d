use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Decorator that runs detection every N frames, reusing results in between.
///
/// The cached boxes are replaced wholesale on detection frames only. A failed
/// detection replaces them with an empty list before the error is returned,
/// so the following frames reuse "no faces" rather than stale boxes.
pub struct SkipFrameDetector {
    inner: Box<dyn FaceDetector>,
    skip_interval: u64,
    frame_count: u64,
    last_boxes: Vec<FaceBox>,
}

impl SkipFrameDetector {
    pub fn new(inner: Box<dyn FaceDetector>, skip_interval: u64) -> Result<Self, &'static str> {
        if skip_interval < 1 {
            return Err("skip_interval must be >= 1");
        }
        Ok(Self {
            inner,
            skip_interval,
            frame_count: 0,
            last_boxes: Vec::new(),
        })
    }

    /// Whether the next call to `detect` will invoke the inner detector.
    pub fn is_detection_frame(&self) -> bool {
        self.frame_count % self.skip_interval == 0
    }

    /// Number of frames seen so far. Never decreases.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn last_boxes(&self) -> &[FaceBox] {
        &self.last_boxes
    }
}

impl FaceDetector for SkipFrameDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
        let run_inner = self.is_detection_frame();
        self.frame_count += 1;

        if run_inner {
            match self.inner.detect(frame) {
                Ok(boxes) => self.last_boxes = boxes,
                Err(e) => {
                    self.last_boxes = Vec::new();
                    return Err(e);
                }
            }
        }
        Ok(self.last_boxes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeDetector {
        results: Vec<Result<Vec<FaceBox>, &'static str>>,
        call_count: Arc<AtomicUsize>,
    }

    impl FakeDetector {
        fn new(results: Vec<Result<Vec<FaceBox>, &'static str>>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    results,
                    call_count: calls.clone(),
                },
                calls,
            )
        }
    }

    impl FaceDetector for FakeDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
            let n = self.call_count.fetch_add(1, Ordering::SeqCst);
            self.results[n % self.results.len()]
                .clone()
                .map_err(|e| e.into())
        }
    }

    fn frame(index: usize) -> Frame {
        Frame::uniform(32, 24, 0, index)
    }

    fn face(x: i32) -> FaceBox {
        FaceBox::new(x, 10, 20, 20)
    }

    #[test]
    fn test_interval_1_delegates_every_frame() {
        let (inner, calls) = FakeDetector::new(vec![Ok(vec![face(1)])]);
        let mut detector = SkipFrameDetector::new(Box::new(inner), 1).unwrap();

        for i in 0..3 {
            assert_eq!(detector.detect(&frame(i)).unwrap().len(), 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_interval_5_invokes_only_on_multiples_of_5() {
        let (inner, calls) = FakeDetector::new(vec![Ok(vec![face(1)])]);
        let mut detector = SkipFrameDetector::new(Box::new(inner), 5).unwrap();

        for n in 0..23u64 {
            let before = calls.load(Ordering::SeqCst);
            assert_eq!(detector.is_detection_frame(), n % 5 == 0);
            detector.detect(&frame(n as usize)).unwrap();
            let invoked = calls.load(Ordering::SeqCst) > before;
            assert_eq!(invoked, n % 5 == 0, "cycle {n}");
        }
        assert_eq!(detector.frame_count(), 23);
    }

    #[test]
    fn test_skipped_frames_reuse_last_result_exactly() {
        let (inner, _) = FakeDetector::new(vec![
            Ok(vec![face(1), face(50)]),
            Ok(vec![face(7)]),
        ]);
        let mut detector = SkipFrameDetector::new(Box::new(inner), 5).unwrap();

        let first = detector.detect(&frame(0)).unwrap();
        for i in 1..5 {
            assert_eq!(detector.detect(&frame(i)).unwrap(), first);
        }
        let second = detector.detect(&frame(5)).unwrap();
        assert_eq!(second, vec![face(7)]);
        assert_eq!(detector.detect(&frame(6)).unwrap(), second);
    }

    #[test]
    fn test_skip_interval_0_errors() {
        let (inner, _) = FakeDetector::new(vec![Ok(vec![])]);
        assert!(SkipFrameDetector::new(Box::new(inner), 0).is_err());
    }

    #[test]
    fn test_failed_detection_clears_cache_and_counts_frame() {
        let (inner, _) = FakeDetector::new(vec![Ok(vec![face(1)]), Err("bad image")]);
        let mut detector = SkipFrameDetector::new(Box::new(inner), 2).unwrap();

        assert_eq!(detector.detect(&frame(0)).unwrap().len(), 1);
        assert_eq!(detector.detect(&frame(1)).unwrap().len(), 1);
        assert!(detector.detect(&frame(2)).is_err());
        assert!(detector.last_boxes().is_empty());
        assert!(detector.detect(&frame(3)).unwrap().is_empty());
        assert_eq!(detector.frame_count(), 4);
    }

    #[test]
    fn test_empty_before_first_detection_result() {
        let (inner, _) = FakeDetector::new(vec![Ok(vec![])]);
        let detector = SkipFrameDetector::new(Box::new(inner), 5).unwrap();
        assert!(detector.last_boxes().is_empty());
    }
}
