//! Deterministic threshold checks.
//!
//! Each function here is a pure function of a detection and the image
//! dimensions. [`crate::PhotoValidator`] wires them to the detector and the
//! configuration; they are public so callers holding their own detections
//! can apply the same rules directly.

use crate::error::ValidationError;
use crate::face_detector::{FaceBounds, Landmarks, Point};

/// Upload MIME types accepted for an ID photo.
pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];

/// Whether `mime` is one of [`ALLOWED_MIME_TYPES`].
pub fn is_allowed_mime_type(mime: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime)
}

/// Whether the image is at least `min_width` × `min_height`.
pub fn meets_min_size(width: u32, height: u32, min_width: u32, min_height: u32) -> bool {
    width >= min_width && height >= min_height
}

/// Verdict for the number of detected faces.
///
/// One face passes and zero faces is a plain `false`, but more than one is an
/// error: a group photo is rejected outright rather than reported as a failed
/// check.
pub fn single_face_verdict(face_count: usize) -> Result<bool, ValidationError> {
    match face_count {
        0 => Ok(false),
        1 => Ok(true),
        n => Err(ValidationError::MultipleFacesDetected(n)),
    }
}

/// Largest y (lowest point on screen) of a point group.
fn lowest_y(points: &[Point]) -> f64 {
    points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max)
}

/// Vertical distance between the lowest points of the two eyes.
pub fn eye_height_difference(landmarks: &Landmarks) -> f64 {
    (lowest_y(landmarks.left_eye()) - lowest_y(landmarks.right_eye())).abs()
}

/// Whether the eyes are level within `threshold` pixels (strict).
pub fn is_facing_forward(landmarks: &Landmarks, threshold: f64) -> bool {
    eye_height_difference(landmarks) < threshold
}

/// Gap above the face box as a fraction of the image height.
pub fn head_top_ratio(bounds: &FaceBounds, image_height: u32) -> f64 {
    bounds.y / image_height as f64
}

/// Whether the gap above the face exceeds `min_ratio` of the height (strict).
pub fn is_head_fully_visible(bounds: &FaceBounds, image_height: u32, min_ratio: f64) -> bool {
    head_top_ratio(bounds, image_height) > min_ratio
}

/// Distance between the face centre and the image centre, with the
/// tolerances it is compared against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterOffsets {
    /// Horizontal distance between the centres.
    pub offset_x: f64,
    /// Vertical distance between the centres.
    pub offset_y: f64,
    /// Horizontal tolerance (image width × ratio).
    pub max_offset_x: f64,
    /// Vertical tolerance (image height × ratio).
    pub max_offset_y: f64,
}

impl CenterOffsets {
    /// Both offsets strictly within tolerance.
    pub fn is_centered(&self) -> bool {
        self.offset_x < self.max_offset_x && self.offset_y < self.max_offset_y
    }
}

/// Compare the face centre with the image centre.
pub fn center_offsets(
    bounds: &FaceBounds,
    image_width: u32,
    image_height: u32,
    x_ratio: f64,
    y_ratio: f64,
) -> CenterOffsets {
    let (width, height) = (image_width as f64, image_height as f64);
    let face = bounds.center();
    CenterOffsets {
        offset_x: (width / 2.0 - face.x).abs(),
        offset_y: (height / 2.0 - face.y).abs(),
        max_offset_x: width * x_ratio,
        max_offset_y: height * y_ratio,
    }
}

/// The face box neither touches the top edge nor is taller than the image.
pub fn is_face_complete(bounds: &FaceBounds, image_height: u32) -> bool {
    bounds.y > 0.0 && bounds.height < image_height as f64
}

/// Centred within the tolerances and not cropped.
pub fn is_centered_and_complete(
    bounds: &FaceBounds,
    image_width: u32,
    image_height: u32,
    x_ratio: f64,
    y_ratio: f64,
) -> bool {
    center_offsets(bounds, image_width, image_height, x_ratio, y_ratio).is_centered()
        && is_face_complete(bounds, image_height)
}

/// Round to three decimals as a browser's `toFixed(3)` does: the exact
/// binary value is rounded, and exact halves go away from zero.
///
/// 0.8005 is stored slightly below the half, so it rounds down to 0.8.
pub fn round3(value: f64) -> f64 {
    // A value ending exactly in a half-thousandth is an odd number of sixteenths.
    let sixteenths = value * 16.0;
    if sixteenths.fract() == 0.0 && sixteenths % 2.0 != 0.0 {
        return (value * 1000.0).round() / 1000.0;
    }
    format!("{value:.3}").parse().unwrap_or(value)
}

/// Width/height ratio rounded to three decimals.
pub fn aspect_ratio(width: u32, height: u32) -> f64 {
    round3(width as f64 / height as f64)
}

/// Whether the rounded aspect ratio lies in `[min, max]`.
pub fn is_accepted_aspect_ratio(width: u32, height: u32, min: f64, max: f64) -> bool {
    let ratio = aspect_ratio(width, height);
    min <= ratio && ratio <= max
}
