use image::RgbaImage;
use tracing::trace;

use crate::error::ValidationError;
use crate::face_detector::{Detection, FaceDetector};

/// Run the external detector once over `image`.
///
/// Results are accepted as-is: no retry and no confidence filtering.
pub(crate) fn detect_all(detector: &dyn FaceDetector, image: &RgbaImage) -> Vec<Detection> {
    let detections = detector.detect(image);
    trace!(
        faces = detections.len(),
        width = image.width(),
        height = image.height(),
        "face detector invoked"
    );
    detections
}

/// Pick the detection a single-face check operates on: the highest-scoring one.
pub(crate) fn select_single(detections: &[Detection]) -> Result<&Detection, ValidationError> {
    detections
        .iter()
        .max_by(|a, b| {
            a.bounds()
                .confidence
                .partial_cmp(&b.bounds().confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .ok_or(ValidationError::NoFaceDetected)
}

/// Detections memoized for the current image.
#[derive(Debug, Default)]
pub(crate) struct DetectionCache {
    detections: Option<Vec<Detection>>,
}

impl DetectionCache {
    /// Return the detections for `image`, invoking the detector only when
    /// nothing is cached or caching is disabled.
    pub(crate) fn get_or_detect(
        &mut self,
        detector: &dyn FaceDetector,
        image: &RgbaImage,
        enabled: bool,
    ) -> Vec<Detection> {
        if !enabled {
            return detect_all(detector, image);
        }
        self.detections
            .get_or_insert_with(|| detect_all(detector, image))
            .clone()
    }

    /// Forget cached detections; the next lookup re-runs the detector.
    pub(crate) fn clear(&mut self) {
        self.detections = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::face_detector::{FaceBounds, Landmarks, Point};

    fn detection(confidence: f64) -> Detection {
        let eye = vec![Point::new(0.0, 0.0)];
        Detection::new(
            FaceBounds::new(0.0, 0.0, 10.0, 10.0).with_confidence(confidence),
            Landmarks::new(vec![], eye.clone(), eye).unwrap(),
        )
        .unwrap()
    }

    struct CountingDetector {
        calls: AtomicUsize,
        faces: Vec<Detection>,
    }

    impl FaceDetector for CountingDetector {
        fn detect(&self, _image: &RgbaImage) -> Vec<Detection> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.faces.clone()
        }
    }

    #[test]
    fn select_single_fails_without_faces() {
        assert_eq!(
            select_single(&[]).unwrap_err(),
            ValidationError::NoFaceDetected
        );
    }

    #[test]
    fn select_single_prefers_highest_confidence() {
        let faces = [detection(0.4), detection(0.9), detection(0.7)];
        let best = select_single(&faces).unwrap();
        assert_eq!(best.bounds().confidence, 0.9);
    }

    #[test]
    fn cache_runs_detector_once() {
        let detector = CountingDetector {
            calls: AtomicUsize::new(0),
            faces: vec![detection(1.0)],
        };
        let image = RgbaImage::new(4, 4);
        let mut cache = DetectionCache::default();
        assert_eq!(cache.get_or_detect(&detector, &image, true).len(), 1);
        assert_eq!(cache.get_or_detect(&detector, &image, true).len(), 1);
        assert_eq!(detector.calls.load(Ordering::SeqCst), 1);

        cache.clear();
        cache.get_or_detect(&detector, &image, true);
        assert_eq!(detector.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn disabled_cache_runs_detector_every_time() {
        let detector = CountingDetector {
            calls: AtomicUsize::new(0),
            faces: vec![],
        };
        let image = RgbaImage::new(4, 4);
        let mut cache = DetectionCache::default();
        for _ in 0..3 {
            assert!(cache.get_or_detect(&detector, &image, false).is_empty());
        }
        assert_eq!(detector.calls.load(Ordering::SeqCst), 3);
    }
}
