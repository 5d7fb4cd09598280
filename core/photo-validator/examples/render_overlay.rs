//! Run every check over a synthetic portrait and save the debug overlay.
//!
//! The face box comes from a fixed detector, so no model is needed. Pass an
//! output path to choose where the overlay lands; set `RUST_LOG=debug` to see
//! the measurements behind each verdict.
//!
//! Usage:
//!   cargo run --example render_overlay [-- overlay.png]

use image::{DynamicImage, Rgb, RgbImage, RgbaImage};
use photo_validator::{
    Detection, FaceBounds, FaceDetector, Landmarks, PhotoValidator, Point, ValidatorConfig,
};
use tracing_subscriber::EnvFilter;

/// Always reports the same face.
struct FixedFace(Detection);

impl FaceDetector for FixedFace {
    fn detect(&self, _image: &RgbaImage) -> Vec<Detection> {
        vec![self.0.clone()]
    }
}

fn portrait() -> RgbImage {
    RgbImage::from_fn(480, 600, |x, y| {
        let (dx, dy) = (x as f64 - 240.0, y as f64 - 250.0);
        if (dx / 70.0).powi(2) + (dy / 90.0).powi(2) <= 1.0 {
            Rgb([205, 160, 135])
        } else if y > 360 && (x as f64 - 240.0).abs() < 160.0 {
            Rgb([40, 50, 80])
        } else {
            Rgb([236, 238, 240])
        }
    })
}

fn face() -> Detection {
    let left_eye: Vec<Point> = (0..6)
        .map(|i| Point::new(195.0 + i as f64 * 4.0, 225.0 + (i % 3) as f64))
        .collect();
    let right_eye: Vec<Point> = (0..6)
        .map(|i| Point::new(265.0 + i as f64 * 4.0, 226.0 + (i % 3) as f64))
        .collect();
    let mut positions = left_eye.clone();
    positions.extend(right_eye.iter().copied());
    positions.push(Point::new(240.0, 260.0));
    positions.push(Point::new(240.0, 295.0));
    Detection::new(
        FaceBounds::new(170.0, 160.0, 140.0, 180.0).with_confidence(0.98),
        Landmarks::new(positions, left_eye, right_eye).unwrap(),
    )
    .unwrap()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "overlay.png".to_string());

    let config = ValidatorConfig::default()
        .min_size(400, 500)
        .render_overlay(true)
        .debug(true);
    let mut validator = PhotoValidator::new(config).unwrap();
    validator.initialize(Box::new(FixedFace(face())));
    validator
        .set_image(DynamicImage::ImageRgb8(portrait()), Some("image/png"))
        .unwrap();

    let report = validator.report();
    for result in &report.results {
        match &result.outcome {
            Ok(verdict) => println!("{:<20} {}", result.check, verdict),
            Err(err) => println!("{:<20} error: {err}", result.check),
        }
    }
    println!("all passed: {}", report.all_passed());

    match validator.overlay() {
        Some(overlay) => {
            overlay.save(&output).unwrap();
            println!("\nOverlay written to {output}");
        }
        None => println!("\nNo overlay rendered"),
    }
}
