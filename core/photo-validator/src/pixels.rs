use image::{Rgba, RgbaImage};

/// Integer pixel rectangle. The origin may lie outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    /// Left column.
    pub x: i64,
    /// Top row.
    pub y: i64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRegion {
    /// Create a region.
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of pixels covered by the region.
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Read access to a decoded bitmap.
pub trait PixelSource {
    /// `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Pixels of `region` in row-major order. Always returns `region.area()`
    /// pixels; those outside the bitmap read as transparent black.
    fn read_region(&self, region: PixelRegion) -> Vec<Rgba<u8>>;
}

impl PixelSource for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn read_region(&self, region: PixelRegion) -> Vec<Rgba<u8>> {
        let (width, height) = (self.width() as i64, self.height() as i64);
        let mut out = Vec::with_capacity(region.area());
        for dy in 0..region.height as i64 {
            let y = region.y + dy;
            for dx in 0..region.width as i64 {
                let x = region.x + dx;
                if (0..width).contains(&x) && (0..height).contains(&y) {
                    out.push(*self.get_pixel(x as u32, y as u32));
                } else {
                    out.push(Rgba([0, 0, 0, 0]));
                }
            }
        }
        out
    }
}
