use crate::error::ValidationError;

/// Maximum eye-height difference (px) for a face to count as forward-facing.
pub const DEFAULT_EYE_HEIGHT_DIFF_THRESHOLD: f64 = 3.5;

/// Maximum per-channel standard deviation of background samples (0–255 scale).
pub const DEFAULT_COLOR_THRESHOLD: f64 = 15.0;

/// Allowed horizontal face-centre offset as a fraction of the image width.
pub const DEFAULT_CENTER_OFFSET_X_RATIO: f64 = 0.2;

/// Allowed vertical face-centre offset as a fraction of the image height.
pub const DEFAULT_CENTER_OFFSET_Y_RATIO: f64 = 0.28;

/// Minimum gap above the face box, as a fraction of the image height.
pub const DEFAULT_HEAD_TOP_RATIO: f64 = 0.13;

/// Accepted width/height range after rounding to three decimals.
pub const DEFAULT_ASPECT_RATIO_RANGE: (f64, f64) = (0.6, 0.8);

/// Thresholds and switches for a [`crate::PhotoValidator`].
///
/// Fixed once the validator is constructed. Every field has a default, so
/// callers usually start from [`ValidatorConfig::default`] and override a
/// few values with the builder setters:
///
/// ```
/// use photo_validator::ValidatorConfig;
///
/// let config = ValidatorConfig::default()
///     .color_threshold(20.0)
///     .min_size(300, 400)
///     .debug(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorConfig {
    /// Eye-height difference (px) at or above which a face is tilted.
    pub eye_height_diff_threshold: f64,
    /// Background colour standard deviation at or above which the background
    /// is not uniform.
    pub color_threshold: f64,
    /// Horizontal centring tolerance as a fraction of the image width.
    pub center_offset_x_ratio: f64,
    /// Vertical centring tolerance as a fraction of the image height.
    pub center_offset_y_ratio: f64,
    /// The face box top must sit strictly below this fraction of the height.
    pub head_top_ratio: f64,
    /// Lowest accepted width/height ratio (inclusive).
    pub aspect_ratio_min: f64,
    /// Highest accepted width/height ratio (inclusive).
    pub aspect_ratio_max: f64,
    /// Minimum width used by the named `image-size` check.
    pub min_width: u32,
    /// Minimum height used by the named `image-size` check.
    pub min_height: u32,
    /// Run the detector once per image instead of once per check.
    pub cache_detections: bool,
    /// Render the 400×500 debug overlay from the centring and single-face checks.
    pub render_overlay: bool,
    /// Emit per-check measurements as `tracing` debug events.
    pub debug: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            eye_height_diff_threshold: DEFAULT_EYE_HEIGHT_DIFF_THRESHOLD,
            color_threshold: DEFAULT_COLOR_THRESHOLD,
            center_offset_x_ratio: DEFAULT_CENTER_OFFSET_X_RATIO,
            center_offset_y_ratio: DEFAULT_CENTER_OFFSET_Y_RATIO,
            head_top_ratio: DEFAULT_HEAD_TOP_RATIO,
            aspect_ratio_min: DEFAULT_ASPECT_RATIO_RANGE.0,
            aspect_ratio_max: DEFAULT_ASPECT_RATIO_RANGE.1,
            min_width: 0,
            min_height: 0,
            cache_detections: true,
            render_overlay: false,
            debug: false,
        }
    }
}

impl ValidatorConfig {
    /// Set the eye-height difference threshold in pixels (default: 3.5).
    pub fn eye_height_diff_threshold(mut self, threshold: f64) -> Self {
        self.eye_height_diff_threshold = threshold;
        self
    }

    /// Set the background colour threshold (default: 15).
    pub fn color_threshold(mut self, threshold: f64) -> Self {
        self.color_threshold = threshold;
        self
    }

    /// Set both centring tolerances (defaults: 0.2 horizontal, 0.28 vertical).
    pub fn center_offset_ratios(mut self, x_ratio: f64, y_ratio: f64) -> Self {
        self.center_offset_x_ratio = x_ratio;
        self.center_offset_y_ratio = y_ratio;
        self
    }

    /// Set the head top-margin ratio (default: 0.13).
    pub fn head_top_ratio(mut self, ratio: f64) -> Self {
        self.head_top_ratio = ratio;
        self
    }

    /// Set the accepted aspect-ratio range (default: 0.6–0.8).
    pub fn aspect_ratio_range(mut self, min: f64, max: f64) -> Self {
        self.aspect_ratio_min = min;
        self.aspect_ratio_max = max;
        self
    }

    /// Set the minimum dimensions used by the named `image-size` check.
    pub fn min_size(mut self, width: u32, height: u32) -> Self {
        self.min_width = width;
        self.min_height = height;
        self
    }

    /// Enable or disable per-image detection caching (default: enabled).
    pub fn cache_detections(mut self, enable: bool) -> Self {
        self.cache_detections = enable;
        self
    }

    /// Enable or disable overlay rendering (default: disabled).
    pub fn render_overlay(mut self, enable: bool) -> Self {
        self.render_overlay = enable;
        self
    }

    /// Enable or disable diagnostic logging (default: disabled).
    pub fn debug(mut self, enable: bool) -> Self {
        self.debug = enable;
        self
    }

    /// Check every threshold against its accepted range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.eye_height_diff_threshold.is_finite() && self.eye_height_diff_threshold > 0.0) {
            return Err(invalid(
                "eye_height_diff_threshold",
                self.eye_height_diff_threshold,
                "must be a positive number",
            ));
        }
        if !(self.color_threshold.is_finite()
            && self.color_threshold > 0.0
            && self.color_threshold <= 255.0)
        {
            return Err(invalid(
                "color_threshold",
                self.color_threshold,
                "must be in (0, 255]",
            ));
        }
        for (name, ratio) in [
            ("center_offset_x_ratio", self.center_offset_x_ratio),
            ("center_offset_y_ratio", self.center_offset_y_ratio),
        ] {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(invalid(name, ratio, "must be in (0, 1]"));
            }
        }
        if !(self.head_top_ratio >= 0.0 && self.head_top_ratio < 1.0) {
            return Err(invalid(
                "head_top_ratio",
                self.head_top_ratio,
                "must be in [0, 1)",
            ));
        }
        for (name, bound) in [
            ("aspect_ratio_min", self.aspect_ratio_min),
            ("aspect_ratio_max", self.aspect_ratio_max),
        ] {
            if !(bound.is_finite() && bound > 0.0) {
                return Err(invalid(name, bound, "must be a positive number"));
            }
        }
        if self.aspect_ratio_min > self.aspect_ratio_max {
            return Err(ValidationError::InvalidConfiguration(format!(
                "aspect_ratio_min ({}) exceeds aspect_ratio_max ({})",
                self.aspect_ratio_min, self.aspect_ratio_max
            )));
        }
        Ok(())
    }
}

fn invalid(field: &str, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidConfiguration(format!("{field} {reason}, got {value}"))
}
