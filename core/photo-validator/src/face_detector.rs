use image::RgbaImage;

use crate::error::ValidationError;

/// Index range of the left-eye points in the 68-point iBUG layout.
const IBUG68_LEFT_EYE: std::ops::Range<usize> = 36..42;
/// Index range of the right-eye points in the 68-point iBUG layout.
const IBUG68_RIGHT_EYE: std::ops::Range<usize> = 42..48;

/// A point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Horizontal coordinate (pixels, growing right).
    pub x: f64,
    /// Vertical coordinate (pixels, growing down).
    pub y: f64,
}

impl Point {
    /// Create a point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounding box of a detected face within an image.
///
/// Boxes may extend past the image edges; a partially cropped face is still
/// a valid detection.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceBounds {
    /// X coordinate of the top-left corner (pixels).
    pub x: f64,
    /// Y coordinate of the top-left corner (pixels).
    pub y: f64,
    /// Width of the bounding box (pixels).
    pub width: f64,
    /// Height of the bounding box (pixels).
    pub height: f64,
    /// Detection confidence score.
    pub confidence: f64,
}

impl FaceBounds {
    /// Create a box with a confidence of 1.0.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence: 1.0,
        }
    }

    /// Set the detection confidence.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Centre of the box.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    fn check(&self) -> Result<(), ValidationError> {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(ValidationError::InvalidDetection(
                "face box has a non-finite coordinate".into(),
            ));
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(ValidationError::InvalidDetection(format!(
                "face box has negative extent {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Facial landmark points of one detection.
///
/// Only the eye groups feed the rule engine; the flat `positions` list is
/// drawn on the overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct Landmarks {
    positions: Vec<Point>,
    left_eye: Vec<Point>,
    right_eye: Vec<Point>,
}

impl Landmarks {
    /// Build a landmark set from explicit eye groups.
    ///
    /// Both eye groups must be non-empty.
    pub fn new(
        positions: Vec<Point>,
        left_eye: Vec<Point>,
        right_eye: Vec<Point>,
    ) -> Result<Self, ValidationError> {
        if left_eye.is_empty() || right_eye.is_empty() {
            return Err(ValidationError::InvalidDetection(
                "landmarks must include left and right eye points".into(),
            ));
        }
        Ok(Self {
            positions,
            left_eye,
            right_eye,
        })
    }

    /// Build a landmark set from the 68-point iBUG layout
    /// (left eye 36–41, right eye 42–47).
    pub fn from_ibug68(positions: Vec<Point>) -> Result<Self, ValidationError> {
        if positions.len() != 68 {
            return Err(ValidationError::InvalidDetection(format!(
                "expected 68 landmark points, got {}",
                positions.len()
            )));
        }
        let left_eye = positions[IBUG68_LEFT_EYE].to_vec();
        let right_eye = positions[IBUG68_RIGHT_EYE].to_vec();
        Self::new(positions, left_eye, right_eye)
    }

    /// Every landmark point, in model order.
    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    /// Points outlining the left eye.
    pub fn left_eye(&self) -> &[Point] {
        &self.left_eye
    }

    /// Points outlining the right eye.
    pub fn right_eye(&self) -> &[Point] {
        &self.right_eye
    }
}

/// One detected face: its box plus landmarks.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    bounds: FaceBounds,
    landmarks: Landmarks,
}

impl Detection {
    /// Pair a face box with its landmarks, rejecting malformed boxes.
    pub fn new(bounds: FaceBounds, landmarks: Landmarks) -> Result<Self, ValidationError> {
        bounds.check()?;
        Ok(Self { bounds, landmarks })
    }

    /// The face bounding box.
    pub fn bounds(&self) -> &FaceBounds {
        &self.bounds
    }

    /// The facial landmarks.
    pub fn landmarks(&self) -> &Landmarks {
        &self.landmarks
    }
}

/// Pluggable face detection and landmark backend.
///
/// The model itself lives outside this crate. Implement this trait over
/// whatever engine is available (ONNX, dlib, a browser model whose results
/// are handed over as data) and pass it to
/// [`crate::PhotoValidator::initialize`].
pub trait FaceDetector: Send + Sync {
    /// Detect every face in an RGBA image. An empty result means no face.
    fn detect(&self, image: &RgbaImage) -> Vec<Detection>;
}
