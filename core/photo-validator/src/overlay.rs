//! Debug overlay: the photo letterboxed onto a fixed canvas with the
//! detection drawn on top, green when the check passed and red otherwise.
//!
//! Presentation only; nothing here feeds back into a verdict.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect as PixelRect;

use crate::background::Rect;
use crate::face_detector::{Detection, FaceBounds, Point};

/// Overlay canvas width in pixels.
pub const CANVAS_WIDTH: u32 = 400;
/// Overlay canvas height in pixels.
pub const CANVAS_HEIGHT: u32 = 500;

/// Canvas fill behind the letterboxed photo.
pub const BACKGROUND_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
/// Face box colour for a passing check.
pub const PASS_COLOR: Rgba<u8> = Rgba([0, 128, 0, 255]);
/// Face box colour for a failing check, and for every face in the all-faces view.
pub const FAIL_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
/// Landmark dot colour in the single-detection view.
pub const LANDMARK_COLOR: Rgba<u8> = Rgba([0, 0, 255, 255]);

const LINE_WIDTH: u32 = 2;
const POINT_RADIUS: u32 = 2;

/// A drawable output surface.
pub trait Surface {
    /// `(width, height)` in pixels.
    fn size(&self) -> (u32, u32);

    /// Paint the whole surface.
    fn fill(&mut self, color: Rgba<u8>);

    /// Draw `image` scaled into `dest`.
    fn draw_image(&mut self, image: &RgbaImage, dest: Rect);

    /// Stroke the outline of `rect`.
    fn draw_rect(&mut self, rect: Rect, color: Rgba<u8>, line_width: u32);

    /// Draw a filled dot.
    fn draw_point(&mut self, center: Point, radius: u32, color: Rgba<u8>);
}

impl Surface for RgbaImage {
    fn size(&self) -> (u32, u32) {
        self.dimensions()
    }

    fn fill(&mut self, color: Rgba<u8>) {
        for pixel in self.pixels_mut() {
            *pixel = color;
        }
    }

    fn draw_image(&mut self, image: &RgbaImage, dest: Rect) {
        let width = dest.width.round().max(1.0) as u32;
        let height = dest.height.round().max(1.0) as u32;
        let scaled = imageops::resize(image, width, height, FilterType::Triangle);
        imageops::overlay(self, &scaled, dest.x.round() as i64, dest.y.round() as i64);
    }

    fn draw_rect(&mut self, rect: Rect, color: Rgba<u8>, line_width: u32) {
        // Edges past the canvas by more than the stroke are invisible, so clamp
        // there; face boxes may be arbitrarily large.
        let margin = line_width as f64 + 1.0;
        let (canvas_width, canvas_height) = (self.width() as f64, self.height() as f64);
        let clamp_x = |v: f64| v.clamp(-margin, canvas_width + margin).round();
        let clamp_y = |v: f64| v.clamp(-margin, canvas_height + margin).round();
        let (left, right) = (clamp_x(rect.x), clamp_x(rect.x + rect.width));
        let (top, bottom) = (clamp_y(rect.y), clamp_y(rect.y + rect.height));
        let width = (right - left).max(1.0) as u32;
        let height = (bottom - top).max(1.0) as u32;
        for inset in 0..line_width {
            let grow = inset as i32;
            let outline = PixelRect::at(left as i32 - grow, top as i32 - grow)
                .of_size(width + 2 * inset, height + 2 * inset);
            draw_hollow_rect_mut(self, outline, color);
        }
    }

    fn draw_point(&mut self, center: Point, radius: u32, color: Rgba<u8>) {
        let r = radius as f64;
        let on_canvas = (-r..=self.width() as f64 + r).contains(&center.x)
            && (-r..=self.height() as f64 + r).contains(&center.y);
        if !on_canvas {
            return;
        }
        let c = (center.x.round() as i32, center.y.round() as i32);
        draw_filled_circle_mut(self, c, radius as i32, color);
    }
}

/// Aspect-preserving scale-to-fit placement of an image on a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Image-to-surface scale factor.
    pub scale: f64,
    /// Horizontal padding left of the image.
    pub offset_x: f64,
    /// Vertical padding above the image.
    pub offset_y: f64,
}

impl Letterbox {
    /// Fit `source` into `target`, centred.
    pub fn fit(source: (u32, u32), target: (u32, u32)) -> Self {
        let (sw, sh) = (source.0 as f64, source.1 as f64);
        let (tw, th) = (target.0 as f64, target.1 as f64);
        let scale = (tw / sw).min(th / sh);
        Self {
            scale,
            offset_x: (tw - sw * scale) / 2.0,
            offset_y: (th - sh * scale) / 2.0,
        }
    }

    /// Map an image point onto the surface.
    pub fn point(&self, p: Point) -> Point {
        Point::new(self.offset_x + p.x * self.scale, self.offset_y + p.y * self.scale)
    }

    /// Map a face box onto the surface.
    pub fn face(&self, bounds: &FaceBounds) -> Rect {
        Rect::new(
            self.offset_x + bounds.x * self.scale,
            self.offset_y + bounds.y * self.scale,
            bounds.width * self.scale,
            bounds.height * self.scale,
        )
    }
}

/// A blank overlay canvas of the standard size.
pub fn new_canvas() -> RgbaImage {
    RgbaImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, BACKGROUND_COLOR)
}

fn draw_letterboxed<S: Surface + ?Sized>(surface: &mut S, image: &RgbaImage) -> Letterbox {
    surface.fill(BACKGROUND_COLOR);
    let letterbox = Letterbox::fit(image.dimensions(), surface.size());
    let dest = Rect::new(
        letterbox.offset_x,
        letterbox.offset_y,
        image.width() as f64 * letterbox.scale,
        image.height() as f64 * letterbox.scale,
    );
    surface.draw_image(image, dest);
    letterbox
}

/// Draw `image` with one detection, coloured by the check verdict.
pub fn render_detection<S: Surface + ?Sized>(
    surface: &mut S,
    image: &RgbaImage,
    detection: &Detection,
    passed: bool,
) {
    let letterbox = draw_letterboxed(surface, image);
    let color = if passed { PASS_COLOR } else { FAIL_COLOR };
    surface.draw_rect(letterbox.face(detection.bounds()), color, LINE_WIDTH);
    for point in detection.landmarks().positions() {
        surface.draw_point(letterbox.point(*point), POINT_RADIUS, LANDMARK_COLOR);
    }
}

/// Draw `image` with every detection in red, for the multiple-faces failure.
pub fn render_all_detections<S: Surface + ?Sized>(
    surface: &mut S,
    image: &RgbaImage,
    detections: &[Detection],
) {
    let letterbox = draw_letterboxed(surface, image);
    for detection in detections {
        surface.draw_rect(letterbox.face(detection.bounds()), FAIL_COLOR, LINE_WIDTH);
        for point in detection.landmarks().positions() {
            surface.draw_point(letterbox.point(*point), POINT_RADIUS, FAIL_COLOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face_detector::Landmarks;

    fn detection(x: f64, y: f64, w: f64, h: f64) -> Detection {
        let eye = vec![Point::new(x + w * 0.3, y + h * 0.4)];
        let other = vec![Point::new(x + w * 0.7, y + h * 0.4)];
        let positions = vec![eye[0], other[0]];
        Detection::new(
            FaceBounds::new(x, y, w, h),
            Landmarks::new(positions, eye, other).unwrap(),
        )
        .unwrap()
    }

    fn photo() -> RgbaImage {
        RgbaImage::from_pixel(600, 480, Rgba([200, 200, 200, 255]))
    }

    #[test]
    fn letterbox_fits_wide_image() {
        let lb = Letterbox::fit((600, 480), (400, 500));
        assert!((lb.scale - 2.0 / 3.0).abs() < 1e-12);
        assert!(lb.offset_x.abs() < 1e-9);
        assert!((lb.offset_y - 90.0).abs() < 1e-9);
    }

    #[test]
    fn letterbox_fits_tall_image() {
        let lb = Letterbox::fit((300, 1000), (400, 500));
        assert_eq!(lb.scale, 0.5);
        assert_eq!(lb.offset_x, 125.0);
        assert_eq!(lb.offset_y, 0.0);
        assert_eq!(lb.point(Point::new(100.0, 100.0)), Point::new(175.0, 50.0));
    }

    #[test]
    fn passing_detection_is_green() {
        let mut canvas = new_canvas();
        render_detection(&mut canvas, &photo(), &detection(220.0, 60.0, 160.0, 200.0), true);
        // top edge of the box: y = 90 + 60 * 2/3 = 130
        assert_eq!(*canvas.get_pixel(200, 130), PASS_COLOR);
        // letterbox band stays white, the photo fills the middle
        assert_eq!(*canvas.get_pixel(5, 5), BACKGROUND_COLOR);
        assert_eq!(*canvas.get_pixel(20, 300), Rgba([200, 200, 200, 255]));
    }

    #[test]
    fn failing_detection_is_red_with_blue_landmarks() {
        let mut canvas = new_canvas();
        let face = detection(220.0, 60.0, 160.0, 200.0);
        render_detection(&mut canvas, &photo(), &face, false);
        assert_eq!(*canvas.get_pixel(200, 130), FAIL_COLOR);
        let eye = Letterbox::fit((600, 480), (400, 500)).point(face.landmarks().positions()[0]);
        let (ex, ey) = (eye.x.round() as u32, eye.y.round() as u32);
        assert_eq!(*canvas.get_pixel(ex, ey), LANDMARK_COLOR);
    }

    #[test]
    fn oversized_box_is_clipped_to_canvas() {
        let mut canvas = new_canvas();
        let huge = detection(10.0, 10.0, 1e12, 1e12);
        render_detection(&mut canvas, &photo(), &huge, false);
        // top-left corner of the box: (10 * 2/3, 90 + 10 * 2/3) ≈ (7, 97)
        assert_eq!(*canvas.get_pixel(200, 97), FAIL_COLOR);
        assert_eq!(*canvas.get_pixel(7, 300), FAIL_COLOR);
        assert_eq!(*canvas.get_pixel(200, 300), Rgba([200, 200, 200, 255]));
    }

    #[test]
    fn box_left_of_canvas_draws_nothing_visible() {
        let mut canvas = new_canvas();
        canvas.draw_rect(Rect::new(-1e9, 10.0, 50.0, 50.0), FAIL_COLOR, 2);
        canvas.draw_point(Point::new(-1e9, 1e9), 2, FAIL_COLOR);
        assert!(canvas.pixels().all(|p| *p == BACKGROUND_COLOR));
    }

    #[test]
    fn all_detections_are_red() {
        let mut canvas = new_canvas();
        let faces = [
            detection(30.0, 60.0, 150.0, 180.0),
            detection(400.0, 60.0, 150.0, 180.0),
        ];
        render_all_detections(&mut canvas, &photo(), &faces);
        assert_eq!(*canvas.get_pixel(50, 130), FAIL_COLOR);
        assert_eq!(*canvas.get_pixel(300, 130), FAIL_COLOR);
        let eye = Letterbox::fit((600, 480), (400, 500)).point(faces[1].landmarks().positions()[0]);
        assert_eq!(*canvas.get_pixel(eye.x.round() as u32, eye.y.round() as u32), FAIL_COLOR);
    }
}
