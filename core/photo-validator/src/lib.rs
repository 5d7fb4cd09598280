//! Identity photo compliance checks: one face, looking straight ahead, in
//! front of a plain background, centred, with room above the head and an
//! accepted aspect ratio.
//!
//! Face detection itself is pluggable: implement [`FaceDetector`] over any
//! landmark model and hand it to [`PhotoValidator::initialize`]. Every check
//! returns its own verdict; combining them is up to the caller.
//!
//! # Example
//!
//! ```
//! use image::{DynamicImage, RgbImage};
//! use photo_validator::{
//!     Detection, FaceBounds, FaceDetector, Landmarks, PhotoValidator, Point, ValidatorConfig,
//! };
//!
//! struct OneFace;
//!
//! impl FaceDetector for OneFace {
//!     fn detect(&self, _image: &image::RgbaImage) -> Vec<Detection> {
//!         let left = vec![Point::new(130.0, 170.0)];
//!         let right = vec![Point::new(170.0, 170.0)];
//!         let landmarks = Landmarks::new(vec![left[0], right[0]], left, right).unwrap();
//!         vec![Detection::new(FaceBounds::new(100.0, 100.0, 100.0, 130.0), landmarks).unwrap()]
//!     }
//! }
//!
//! let mut validator = PhotoValidator::new(ValidatorConfig::default()).unwrap();
//! validator.initialize(Box::new(OneFace));
//! validator
//!     .set_image(DynamicImage::ImageRgb8(RgbImage::new(300, 400)), Some("image/png"))
//!     .unwrap();
//!
//! assert!(validator.is_single_face().unwrap());
//! assert!(validator.is_facing_forward().unwrap());
//! assert!(validator.is_valid_aspect_ratio().unwrap());
//! ```
#![warn(missing_docs)]

/// Background sampling and uniformity analysis.
pub mod background;
mod check;
mod config;
mod detection;
mod error;
/// Face detection traits and data types.
pub mod face_detector;
mod input;
/// Debug overlay rendering.
pub mod overlay;
/// Pixel buffer access.
pub mod pixels;
/// The individual threshold checks as pure functions.
pub mod rules;
/// Statistics helpers.
pub mod stats;

use image::{DynamicImage, RgbaImage};
use tracing::{debug, trace};

pub use background::BackgroundAnalysis;
pub use check::{Check, CheckResult, ValidationReport};
pub use config::ValidatorConfig;
/// Error type returned by validator operations.
pub use error::ValidationError;
pub use face_detector::{Detection, FaceBounds, FaceDetector, Landmarks, Point};
pub use input::sniff_mime_type;

use detection::DetectionCache;

/// Whether a face detector has been attached.
enum ModelState {
    Uninitialized,
    Ready(Box<dyn FaceDetector>),
}

/// The image currently under validation.
struct LoadedImage {
    pixels: RgbaImage,
    mime_type: Option<String>,
}

/// A validation session over one image at a time.
///
/// Holds the configuration, the detector, the current image and the
/// detections computed for it. Every check fails with
/// [`ValidationError::NotInitialized`] until [`initialize`](Self::initialize)
/// has been called, and checks that look at the photo fail with
/// [`ValidationError::NoImage`] until an image is set.
pub struct PhotoValidator {
    config: ValidatorConfig,
    state: ModelState,
    image: Option<LoadedImage>,
    cache: DetectionCache,
    overlay: Option<RgbaImage>,
}

impl PhotoValidator {
    /// Create an uninitialized validator, rejecting out-of-range thresholds.
    pub fn new(config: ValidatorConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self {
            config,
            state: ModelState::Uninitialized,
            image: None,
            cache: DetectionCache::default(),
            overlay: None,
        })
    }

    /// The configuration this validator was built with.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Attach the face detector and mark the validator ready.
    ///
    /// Calling this again swaps the detector and drops cached detections and
    /// the overlay drawn from them.
    pub fn initialize(&mut self, detector: Box<dyn FaceDetector>) {
        self.state = ModelState::Ready(detector);
        self.cache.clear();
        self.overlay = None;
        debug!("photo validator initialized");
    }

    /// Whether [`initialize`](Self::initialize) has been called.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, ModelState::Ready(_))
    }

    /// Decode PNG, JPEG or WebP bytes and make them the current image.
    ///
    /// The sniffed MIME type is kept for the named file-type check.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<(), ValidationError> {
        let mime = input::sniff_mime_type(bytes)?;
        let decoded = input::decode_image(bytes)?;
        self.set_image(decoded, Some(mime))
    }

    /// Make `image` the current image. `mime_type` is the upload's declared type.
    pub fn set_image(
        &mut self,
        image: DynamicImage,
        mime_type: Option<&str>,
    ) -> Result<(), ValidationError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ValidationError::ZeroDimensions);
        }
        debug!(
            width = image.width(),
            height = image.height(),
            ?mime_type,
            "image set"
        );
        self.image = Some(LoadedImage {
            pixels: image.to_rgba8(),
            mime_type: mime_type.map(str::to_owned),
        });
        self.cache.clear();
        self.overlay = None;
        Ok(())
    }

    /// `(width, height)` of the current image.
    pub fn image_dimensions(&self) -> Option<(u32, u32)> {
        self.image.as_ref().map(|image| image.pixels.dimensions())
    }

    /// MIME type recorded for the current image.
    pub fn mime_type(&self) -> Option<&str> {
        self.image.as_ref()?.mime_type.as_deref()
    }

    /// The most recently rendered overlay, when overlay rendering is enabled.
    pub fn overlay(&self) -> Option<&RgbaImage> {
        self.overlay.as_ref()
    }

    fn ensure_ready(&self) -> Result<(), ValidationError> {
        match self.state {
            ModelState::Ready(_) => Ok(()),
            ModelState::Uninitialized => Err(ValidationError::NotInitialized),
        }
    }

    fn current_image(&self) -> Result<&LoadedImage, ValidationError> {
        self.ensure_ready()?;
        self.image.as_ref().ok_or(ValidationError::NoImage)
    }

    fn detections(&mut self) -> Result<Vec<Detection>, ValidationError> {
        let detector = match &self.state {
            ModelState::Ready(detector) => detector.as_ref(),
            ModelState::Uninitialized => return Err(ValidationError::NotInitialized),
        };
        let image = self.image.as_ref().ok_or(ValidationError::NoImage)?;
        Ok(self
            .cache
            .get_or_detect(detector, &image.pixels, self.config.cache_detections))
    }

    fn single_detection(&mut self) -> Result<Detection, ValidationError> {
        let detections = self.detections()?;
        detection::select_single(&detections).cloned()
    }

    fn render(&mut self, draw: impl FnOnce(&mut RgbaImage, &RgbaImage)) {
        if !self.config.render_overlay {
            return;
        }
        let Some(image) = self.image.as_ref() else {
            return;
        };
        let canvas = self.overlay.get_or_insert_with(overlay::new_canvas);
        draw(canvas, &image.pixels);
    }

    /// Whether `mime_type` is an accepted upload type (PNG or JPEG).
    pub fn is_valid_file_type(&self, mime_type: &str) -> Result<bool, ValidationError> {
        self.ensure_ready()?;
        Ok(rules::is_allowed_mime_type(mime_type))
    }

    /// Whether the image is at least `min_width` × `min_height`.
    pub fn is_image_size_valid(
        &self,
        min_width: u32,
        min_height: u32,
    ) -> Result<bool, ValidationError> {
        let (width, height) = self.current_image()?.pixels.dimensions();
        Ok(rules::meets_min_size(width, height, min_width, min_height))
    }

    /// Whether the photo shows exactly one face.
    ///
    /// No face is an ordinary `false`. More than one face fails with
    /// [`ValidationError::MultipleFacesDetected`] (after drawing every face on
    /// the overlay), so callers must treat the error as the failure signal.
    pub fn is_single_face(&mut self) -> Result<bool, ValidationError> {
        let detections = self.detections()?;
        if detections.len() > 1 {
            self.render(|canvas, image| overlay::render_all_detections(canvas, image, &detections));
        }
        rules::single_face_verdict(detections.len())
    }

    /// Whether the eyes are level within the configured threshold.
    pub fn is_facing_forward(&mut self) -> Result<bool, ValidationError> {
        let detection = self.single_detection()?;
        let threshold = self.config.eye_height_diff_threshold;
        if self.config.debug {
            let difference = rules::eye_height_difference(detection.landmarks());
            debug!(difference, threshold, "eye height difference");
        }
        Ok(rules::is_facing_forward(detection.landmarks(), threshold))
    }

    /// The sampling behind [`is_uniform_background`](Self::is_uniform_background).
    pub fn background_analysis(&mut self) -> Result<BackgroundAnalysis, ValidationError> {
        let detection = self.single_detection()?;
        let image = self.current_image()?;
        let analysis = background::analyze_background(
            &image.pixels,
            detection.bounds(),
            self.config.color_threshold,
        );
        if self.config.debug {
            match analysis.std_dev {
                Some([red, green, blue]) => debug!(
                    red,
                    green,
                    blue,
                    samples = analysis.colors.len(),
                    "background colour standard deviation"
                ),
                None => debug!(
                    samples = analysis.colors.len(),
                    "too few background samples, passing"
                ),
            }
        }
        Ok(analysis)
    }

    /// Whether the background around the subject is a single colour.
    ///
    /// Passes when too few background samples can be taken to judge.
    pub fn is_uniform_background(&mut self) -> Result<bool, ValidationError> {
        Ok(self.background_analysis()?.is_uniform)
    }

    /// Whether there is enough room between the top of the image and the face.
    pub fn is_head_fully_visible(&mut self) -> Result<bool, ValidationError> {
        let detection = self.single_detection()?;
        let (_, height) = self.current_image()?.pixels.dimensions();
        let min_ratio = self.config.head_top_ratio;
        if self.config.debug {
            let ratio = rules::head_top_ratio(detection.bounds(), height);
            debug!(ratio, min = min_ratio, "top distance ratio");
        }
        Ok(rules::is_head_fully_visible(detection.bounds(), height, min_ratio))
    }

    /// Whether the face is near the image centre and not cut off.
    ///
    /// Draws the detection on the overlay, green on pass and red on fail.
    pub fn is_face_centered_and_complete(&mut self) -> Result<bool, ValidationError> {
        let detection = self.single_detection()?;
        let (width, height) = self.current_image()?.pixels.dimensions();
        let (x_ratio, y_ratio) = (
            self.config.center_offset_x_ratio,
            self.config.center_offset_y_ratio,
        );
        if self.config.debug {
            let offsets =
                rules::center_offsets(detection.bounds(), width, height, x_ratio, y_ratio);
            debug!(
                offset_x = offsets.offset_x,
                offset_y = offsets.offset_y,
                max_offset_x = offsets.max_offset_x,
                max_offset_y = offsets.max_offset_y,
                "face centre offset"
            );
        }
        let passed =
            rules::is_centered_and_complete(detection.bounds(), width, height, x_ratio, y_ratio);
        self.render(|canvas, image| overlay::render_detection(canvas, image, &detection, passed));
        Ok(passed)
    }

    /// Whether the width/height ratio, rounded to three decimals, is accepted.
    pub fn is_valid_aspect_ratio(&self) -> Result<bool, ValidationError> {
        let (width, height) = self.current_image()?.pixels.dimensions();
        if self.config.debug {
            debug!(ratio = rules::aspect_ratio(width, height), "current aspect ratio");
        }
        Ok(rules::is_accepted_aspect_ratio(
            width,
            height,
            self.config.aspect_ratio_min,
            self.config.aspect_ratio_max,
        ))
    }

    /// Run one check by name.
    ///
    /// The file-type check uses the MIME type recorded with the image (an
    /// unknown type fails); the image-size check uses the configured minimums.
    pub fn run_check(&mut self, check: Check) -> Result<bool, ValidationError> {
        trace!(%check, "running check");
        match check {
            Check::FileType => {
                let image = self.current_image()?;
                Ok(image
                    .mime_type
                    .as_deref()
                    .is_some_and(rules::is_allowed_mime_type))
            }
            Check::ImageSize => {
                self.is_image_size_valid(self.config.min_width, self.config.min_height)
            }
            Check::SingleFace => self.is_single_face(),
            Check::FacingForward => self.is_facing_forward(),
            Check::UniformBackground => self.is_uniform_background(),
            Check::HeadFullyVisible => self.is_head_fully_visible(),
            Check::CenteredAndComplete => self.is_face_centered_and_complete(),
            Check::AspectRatio => self.is_valid_aspect_ratio(),
        }
    }

    /// Run every check once and collect the outcomes.
    pub fn report(&mut self) -> ValidationReport {
        let results = Check::ALL
            .into_iter()
            .map(|check| CheckResult {
                check,
                outcome: self.run_check(check),
            })
            .collect();
        ValidationReport { results }
    }
}
