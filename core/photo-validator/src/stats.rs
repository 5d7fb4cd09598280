use image::Rgba;

/// Population standard deviation (divides by N). `None` for an empty slice.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    Some(variance.sqrt())
}

/// Average red, green and blue intensity of a block of pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSample {
    /// Mean red intensity (0–255).
    pub avg_red: f64,
    /// Mean green intensity (0–255).
    pub avg_green: f64,
    /// Mean blue intensity (0–255).
    pub avg_blue: f64,
}

impl ColorSample {
    /// Average the colour channels of `pixels`; alpha is ignored.
    /// `None` for an empty block.
    pub fn from_pixels(pixels: &[Rgba<u8>]) -> Option<Self> {
        if pixels.is_empty() {
            return None;
        }
        let (r, g, b) = pixels.iter().fold((0u64, 0u64, 0u64), |(r, g, b), p| {
            (r + p[0] as u64, g + p[1] as u64, b + p[2] as u64)
        });
        let count = pixels.len() as f64;
        Some(Self {
            avg_red: r as f64 / count,
            avg_green: g as f64 / count,
            avg_blue: b as f64 / count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_dev_of_empty_is_undefined() {
        assert_eq!(std_dev(&[]), None);
    }

    #[test]
    fn std_dev_of_single_value_is_zero() {
        assert_eq!(std_dev(&[42.0]), Some(0.0));
    }

    #[test]
    fn std_dev_uses_population_formula() {
        // mean 3, squared deviations 4+1+0+1+4 = 10, 10/5 = 2
        let sd = std_dev(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((sd - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn color_sample_averages_channels() {
        let pixels = [Rgba([10, 100, 200, 255]), Rgba([20, 0, 100, 0])];
        let sample = ColorSample::from_pixels(&pixels).unwrap();
        assert_eq!(sample.avg_red, 15.0);
        assert_eq!(sample.avg_green, 50.0);
        assert_eq!(sample.avg_blue, 150.0);
    }

    #[test]
    fn color_sample_of_empty_block_is_none() {
        assert!(ColorSample::from_pixels(&[]).is_none());
    }
}
