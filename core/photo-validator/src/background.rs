//! Background uniformity analysis.
//!
//! Small blocks are sampled along the image border and one horizontal line
//! in the upper half, skipping anything that overlaps the estimated subject
//! (head plus shoulders) or lies in the lower half, where clothing usually
//! is. The background is uniform when the per-channel standard deviation of
//! the block averages stays below the colour threshold.

use crate::face_detector::FaceBounds;
use crate::pixels::{PixelRegion, PixelSource};
use crate::stats::{std_dev, ColorSample};

/// Distance of the edge samples from the image border.
const SAMPLE_MARGIN: f64 = 10.0;
/// Side length of each square sample.
const SAMPLE_SIZE: f64 = 10.0;
/// Samples at or below this fraction of the height are never read.
const BOTTOM_EXCLUSION_RATIO: f64 = 0.5;
/// Rows sampled along each side edge.
const EDGE_ROWS: f64 = 5.0;
/// Column spacing of the top and middle lines, as a divisor of the width.
const LINE_COLUMNS: f64 = 8.0;
/// Below this many samples the check passes for lack of evidence.
pub const MIN_BACKGROUND_SAMPLES: usize = 3;

/// Floating-point rectangle in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width (pixels).
    pub width: f64,
    /// Height (pixels).
    pub height: f64,
}

impl Rect {
    /// Create a rectangle.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the interiors intersect; touching edges do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    fn to_pixel_region(self) -> PixelRegion {
        PixelRegion::new(
            self.x.trunc() as i64,
            self.y.trunc() as i64,
            self.width as u32,
            self.height as u32,
        )
    }
}

/// Estimated head-and-shoulders area around a face box, clamped to the image.
///
/// Extends 30% of the face width to each side, 70% of the face height above
/// the face, and is twice the face height tall.
pub fn subject_region(bounds: &FaceBounds, image_width: u32, image_height: u32) -> Rect {
    let x = (bounds.x - bounds.width * 0.3).max(0.0);
    let y = (bounds.y - bounds.height * 0.7).max(0.0);
    Rect::new(
        x,
        y,
        (bounds.width * 1.6).min(image_width as f64 - x),
        (bounds.height * 2.0).min(image_height as f64 - y),
    )
}

/// `start, start + step, ...` while below `end`.
fn stepped(start: f64, end: f64, step: f64) -> impl Iterator<Item = f64> {
    let step = if step > 0.0 { step } else { f64::INFINITY };
    std::iter::successors(Some(start), move |v| Some(v + step)).take_while(move |v| *v < end)
}

/// Every candidate sample position before subject and bottom filtering.
pub fn candidate_samples(image_width: u32, image_height: u32) -> Vec<Rect> {
    let (width, height) = (image_width as f64, image_height as f64);
    let bottom = height * BOTTOM_EXCLUSION_RATIO;
    let square = |x: f64, y: f64| Rect::new(x, y, SAMPLE_SIZE, SAMPLE_SIZE);

    let row_step = bottom / EDGE_ROWS;
    let rows_end = bottom - SAMPLE_MARGIN;
    let column_step = width / LINE_COLUMNS;
    let columns_start = SAMPLE_MARGIN + SAMPLE_SIZE * 2.0;
    let columns_end = width - SAMPLE_MARGIN - SAMPLE_SIZE * 2.0;
    let right_x = width - SAMPLE_MARGIN - SAMPLE_SIZE;
    let mid_y = bottom * 0.5;

    let mut samples = Vec::new();
    samples.extend(stepped(SAMPLE_MARGIN, rows_end, row_step).map(|y| square(SAMPLE_MARGIN, y)));
    samples.extend(stepped(SAMPLE_MARGIN, rows_end, row_step).map(|y| square(right_x, y)));
    samples.extend(
        stepped(columns_start, columns_end, column_step).map(|x| square(x, SAMPLE_MARGIN)),
    );
    samples.extend(stepped(columns_start, columns_end, column_step).map(|x| square(x, mid_y)));
    samples
}

/// Candidate samples that avoid the subject and the lower half.
pub fn background_samples(bounds: &FaceBounds, image_width: u32, image_height: u32) -> Vec<Rect> {
    let subject = subject_region(bounds, image_width, image_height);
    let bottom = image_height as f64 * BOTTOM_EXCLUSION_RATIO;
    candidate_samples(image_width, image_height)
        .into_iter()
        .filter(|sample| sample.y <= bottom && !sample.overlaps(&subject))
        .collect()
}

/// Everything measured by the uniform-background check.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundAnalysis {
    /// Sample rectangles that were read.
    pub samples: Vec<Rect>,
    /// Average colour of each sample, same order as `samples`.
    pub colors: Vec<ColorSample>,
    /// Red, green and blue standard deviations across samples; `None` when
    /// too few samples survived to judge.
    pub std_dev: Option<[f64; 3]>,
    /// The verdict.
    pub is_uniform: bool,
}

/// Sample the background around `bounds` and judge its uniformity.
pub fn analyze_background<P>(
    pixels: &P,
    bounds: &FaceBounds,
    color_threshold: f64,
) -> BackgroundAnalysis
where
    P: PixelSource + ?Sized,
{
    let (width, height) = pixels.dimensions();
    let samples = background_samples(bounds, width, height);
    let colors: Vec<ColorSample> = samples
        .iter()
        .filter_map(|sample| {
            ColorSample::from_pixels(&pixels.read_region(sample.to_pixel_region()))
        })
        .collect();

    if colors.len() < MIN_BACKGROUND_SAMPLES {
        return BackgroundAnalysis {
            samples,
            colors,
            std_dev: None,
            is_uniform: true,
        };
    }

    let channel = |f: fn(&ColorSample) -> f64| {
        let values: Vec<f64> = colors.iter().map(f).collect();
        std_dev(&values).unwrap_or(0.0)
    };
    let deviations = [
        channel(|c| c.avg_red),
        channel(|c| c.avg_green),
        channel(|c| c.avg_blue),
    ];
    let is_uniform = deviations.iter().all(|d| *d < color_threshold);

    BackgroundAnalysis {
        samples,
        colors,
        std_dev: Some(deviations),
        is_uniform,
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;

    fn scenario_bounds() -> FaceBounds {
        FaceBounds::new(220.0, 60.0, 160.0, 200.0)
    }

    #[test]
    fn subject_region_expands_and_clamps() {
        let region = subject_region(&scenario_bounds(), 600, 480);
        assert!((region.x - 172.0).abs() < 1e-9);
        assert_eq!(region.y, 0.0);
        assert!((region.width - 256.0).abs() < 1e-9);
        assert_eq!(region.height, 400.0);

        let clamped = subject_region(&FaceBounds::new(500.0, 300.0, 100.0, 150.0), 600, 480);
        assert!((clamped.width - 130.0).abs() < 1e-9);
        assert!((clamped.height - 285.0).abs() < 1e-9);
    }

    #[test]
    fn candidate_layout() {
        let samples = candidate_samples(600, 480);
        // 5 left + 5 right + 8 top + 8 middle
        assert_eq!(samples.len(), 26);
        assert_eq!(samples[0], Rect::new(10.0, 10.0, 10.0, 10.0));
        assert_eq!(samples[4].y, 202.0);
        assert_eq!(samples[5].x, 580.0);
        assert_eq!(samples[10], Rect::new(30.0, 10.0, 10.0, 10.0));
        assert_eq!(samples[18].y, 120.0);
    }

    #[test]
    fn samples_skip_subject_region() {
        let samples = background_samples(&scenario_bounds(), 600, 480);
        assert_eq!(samples.len(), 18);
        let subject = subject_region(&scenario_bounds(), 600, 480);
        assert!(samples.iter().all(|s| !s.overlaps(&subject)));
    }

    #[test]
    fn touching_rects_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(a.overlaps(&Rect::new(9.5, 9.5, 5.0, 5.0)));
    }

    #[test]
    fn tiny_image_has_no_samples() {
        assert!(candidate_samples(30, 30).len() <= 2);
        assert!(candidate_samples(1, 1).is_empty());
    }

    #[test]
    fn two_tone_background_within_threshold() {
        let img = RgbaImage::from_fn(600, 480, |x, _| {
            if x < 300 {
                Rgba([250, 250, 250, 255])
            } else {
                Rgba([240, 240, 240, 255])
            }
        });
        let analysis = analyze_background(&img, &scenario_bounds(), 15.0);
        assert_eq!(analysis.colors.len(), 18);
        let [r, g, b] = analysis.std_dev.unwrap();
        assert!((r - 5.0).abs() < 1e-9);
        assert!((g - 5.0).abs() < 1e-9);
        assert!((b - 5.0).abs() < 1e-9);
        assert!(analysis.is_uniform);
        assert!(!analyze_background(&img, &scenario_bounds(), 5.0).is_uniform);
    }

    #[test]
    fn contrasting_background_fails() {
        let img = RgbaImage::from_fn(600, 480, |x, _| {
            if x < 300 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        let analysis = analyze_background(&img, &scenario_bounds(), 15.0);
        assert!(!analysis.is_uniform);
    }

    #[test]
    fn single_noisy_channel_fails() {
        let img = RgbaImage::from_fn(600, 480, |x, _| {
            let blue = if x < 300 { 255 } else { 0 };
            Rgba([200, 200, blue, 255])
        });
        let analysis = analyze_background(&img, &scenario_bounds(), 15.0);
        let [r, g, _] = analysis.std_dev.unwrap();
        assert_eq!((r, g), (0.0, 0.0));
        assert!(!analysis.is_uniform);
    }

    #[test]
    fn too_few_samples_passes_regardless_of_colour() {
        let img = RgbaImage::from_fn(600, 480, |x, y| {
            if (x / 10 + y / 10) % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let bounds = FaceBounds::new(5.0, 5.0, 590.0, 470.0);
        let analysis = analyze_background(&img, &bounds, 15.0);
        assert!(analysis.colors.len() < MIN_BACKGROUND_SAMPLES);
        assert_eq!(analysis.std_dev, None);
        assert!(analysis.is_uniform);
    }
}
