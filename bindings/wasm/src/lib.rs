use image::RgbaImage;
use photo_validator::{
    Check, Detection, FaceBounds, FaceDetector, Landmarks, PhotoValidator, Point,
    ValidationError, ValidationReport, ValidatorConfig,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

/// Validator options, passed as a JavaScript object.
///
/// All fields are optional; missing fields keep their defaults.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidatorOptions {
    pub eye_height_diff_threshold: Option<f64>,
    pub color_threshold: Option<f64>,
    pub center_offset_x_ratio: Option<f64>,
    pub center_offset_y_ratio: Option<f64>,
    pub head_top_ratio: Option<f64>,
    pub aspect_ratio_min: Option<f64>,
    pub aspect_ratio_max: Option<f64>,
    pub min_width: Option<u32>,
    pub min_height: Option<u32>,
    pub render_overlay: Option<bool>,
    pub debug: Option<bool>,
}

#[derive(Deserialize)]
struct JsPoint {
    x: f64,
    y: f64,
}

impl From<JsPoint> for Point {
    fn from(p: JsPoint) -> Self {
        Point::new(p.x, p.y)
    }
}

#[derive(Deserialize)]
struct JsBox {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsEyeGroups {
    #[serde(default)]
    positions: Vec<JsPoint>,
    left_eye: Vec<JsPoint>,
    right_eye: Vec<JsPoint>,
}

/// Landmarks as a flat 68-point array or as explicit eye groups.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsLandmarks {
    Ibug68(Vec<JsPoint>),
    Groups(JsEyeGroups),
}

/// One face as reported by a browser-side detector such as face-api.js.
#[derive(Deserialize)]
struct JsDetection {
    #[serde(rename = "box")]
    bounds: JsBox,
    score: Option<f64>,
    landmarks: JsLandmarks,
}

fn points(raw: Vec<JsPoint>) -> Vec<Point> {
    raw.into_iter().map(Point::from).collect()
}

impl TryFrom<JsDetection> for Detection {
    type Error = ValidationError;

    fn try_from(raw: JsDetection) -> Result<Self, Self::Error> {
        let b = raw.bounds;
        let mut bounds = FaceBounds::new(b.x, b.y, b.width, b.height);
        if let Some(score) = raw.score {
            bounds = bounds.with_confidence(score);
        }
        let landmarks = match raw.landmarks {
            JsLandmarks::Ibug68(positions) => Landmarks::from_ibug68(points(positions))?,
            JsLandmarks::Groups(groups) => Landmarks::new(
                points(groups.positions),
                points(groups.left_eye),
                points(groups.right_eye),
            )?,
        };
        Detection::new(bounds, landmarks)
    }
}

/// Hands detections computed in JavaScript to the validator.
struct FixedDetector(Vec<Detection>);

impl FaceDetector for FixedDetector {
    fn detect(&self, _image: &RgbaImage) -> Vec<Detection> {
        self.0.clone()
    }
}

/// Create a JS `Error` with a `code` property.
fn make_error(code: &str, message: &str) -> JsValue {
    let err = js_sys::Error::new(message);
    let _ = js_sys::Reflect::set(&err, &"code".into(), &JsValue::from_str(code));
    JsValue::from(err)
}

fn error_code(e: &ValidationError) -> &'static str {
    match e {
        ValidationError::NotInitialized => "NOT_INITIALIZED",
        ValidationError::NoImage => "NO_IMAGE",
        ValidationError::NoFaceDetected => "NO_FACE_DETECTED",
        ValidationError::MultipleFacesDetected(_) => "MULTIPLE_FACES_DETECTED",
        ValidationError::InvalidConfiguration(_) => "INVALID_OPTIONS",
        ValidationError::InvalidDetection(_) => "INVALID_DETECTION",
        ValidationError::UnknownCheck(_) => "UNKNOWN_CHECK",
        ValidationError::DecodeError(_) => "DECODE_ERROR",
        ValidationError::ZeroDimensions => "ZERO_DIMENSIONS",
    }
}

/// Convert a `ValidationError` into a JS `Error` with a machine-readable `code` property.
fn to_js_error(e: ValidationError) -> JsValue {
    make_error(error_code(&e), &e.to_string())
}

fn parse_options(options: JsValue) -> Result<ValidatorOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(ValidatorOptions::default())
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| make_error("INVALID_OPTIONS", &format!("invalid options: {e}")))
    }
}

fn parse_detections(detections: JsValue) -> Result<Vec<Detection>, JsValue> {
    if detections.is_undefined() || detections.is_null() {
        return Ok(Vec::new());
    }
    let raw: Vec<JsDetection> = serde_wasm_bindgen::from_value(detections)
        .map_err(|e| make_error("INVALID_DETECTION", &format!("invalid detections: {e}")))?;
    raw.into_iter()
        .map(Detection::try_from)
        .collect::<Result<_, _>>()
        .map_err(to_js_error)
}

/// Apply parsed `ValidatorOptions` on top of the default configuration.
fn apply_options(opts: &ValidatorOptions) -> ValidatorConfig {
    let mut config = ValidatorConfig::default();
    if let Some(threshold) = opts.eye_height_diff_threshold {
        config = config.eye_height_diff_threshold(threshold);
    }
    if let Some(threshold) = opts.color_threshold {
        config = config.color_threshold(threshold);
    }
    let x_ratio = opts.center_offset_x_ratio.unwrap_or(config.center_offset_x_ratio);
    let y_ratio = opts.center_offset_y_ratio.unwrap_or(config.center_offset_y_ratio);
    config = config.center_offset_ratios(x_ratio, y_ratio);
    if let Some(ratio) = opts.head_top_ratio {
        config = config.head_top_ratio(ratio);
    }
    let min = opts.aspect_ratio_min.unwrap_or(config.aspect_ratio_min);
    let max = opts.aspect_ratio_max.unwrap_or(config.aspect_ratio_max);
    config = config.aspect_ratio_range(min, max);
    let width = opts.min_width.unwrap_or(config.min_width);
    let height = opts.min_height.unwrap_or(config.min_height);
    config = config.min_size(width, height);
    if let Some(render) = opts.render_overlay {
        config = config.render_overlay(render);
    }
    if let Some(debug) = opts.debug {
        config = config.debug(debug);
    }
    config
}

fn build_validator(
    input: &[u8],
    detections: JsValue,
    options: JsValue,
) -> Result<PhotoValidator, JsValue> {
    let opts = parse_options(options)?;
    let detections = parse_detections(detections)?;
    let mut validator = PhotoValidator::new(apply_options(&opts)).map_err(to_js_error)?;
    validator.initialize(Box::new(FixedDetector(detections)));
    validator.load_image(input).map_err(to_js_error)?;
    Ok(validator)
}

/// Build a plain JS object from a `ValidationReport`.
fn build_report_object(
    report: &ValidationReport,
    validator: &PhotoValidator,
) -> Result<JsValue, JsValue> {
    let obj = js_sys::Object::new();
    let checks = js_sys::Array::new();
    for result in &report.results {
        let entry = js_sys::Object::new();
        js_sys::Reflect::set(&entry, &"check".into(), &JsValue::from_str(result.check.name()))?;
        match &result.outcome {
            Ok(passed) => {
                js_sys::Reflect::set(&entry, &"passed".into(), &JsValue::from(*passed))?;
                js_sys::Reflect::set(&entry, &"error".into(), &JsValue::NULL)?;
            }
            Err(e) => {
                let err_obj = js_sys::Object::new();
                js_sys::Reflect::set(&err_obj, &"code".into(), &JsValue::from_str(error_code(e)))?;
                js_sys::Reflect::set(
                    &err_obj,
                    &"message".into(),
                    &JsValue::from_str(&e.to_string()),
                )?;
                js_sys::Reflect::set(&entry, &"passed".into(), &JsValue::FALSE)?;
                js_sys::Reflect::set(&entry, &"error".into(), &err_obj)?;
            }
        }
        checks.push(&entry);
    }
    js_sys::Reflect::set(&obj, &"checks".into(), &checks)?;
    js_sys::Reflect::set(&obj, &"allPassed".into(), &JsValue::from(report.all_passed()))?;

    let overlay = match validator.overlay() {
        Some(canvas) => {
            let overlay_obj = js_sys::Object::new();
            let data = js_sys::Uint8ClampedArray::from(canvas.as_raw().as_slice());
            js_sys::Reflect::set(&overlay_obj, &"data".into(), &data)?;
            js_sys::Reflect::set(&overlay_obj, &"width".into(), &JsValue::from(canvas.width()))?;
            js_sys::Reflect::set(&overlay_obj, &"height".into(), &JsValue::from(canvas.height()))?;
            JsValue::from(overlay_obj)
        }
        None => JsValue::NULL,
    };
    js_sys::Reflect::set(&obj, &"overlay".into(), &overlay)?;

    Ok(JsValue::from(obj))
}

/// Run every compliance check over a photo.
///
/// @param input - Raw image bytes (PNG, JPEG, or WebP)
/// @param detections - Array of faces, each `{ box: {x, y, width, height},
///   score?, landmarks }` where `landmarks` is a 68-point array of `{x, y}`
///   or `{ positions?, leftEye, rightEye }`
/// @param options - Optional object with fields: eyeHeightDiffThreshold,
///   colorThreshold, centerOffsetXRatio, centerOffsetYRatio, headTopRatio,
///   aspectRatioMin, aspectRatioMax, minWidth, minHeight, renderOverlay, debug
#[wasm_bindgen]
pub fn validate(input: Vec<u8>, detections: JsValue, options: JsValue) -> Result<JsValue, JsValue> {
    let mut validator = build_validator(&input, detections, options)?;
    let report = validator.report();
    build_report_object(&report, &validator)
}

/// Run one check by name (`file-type`, `image-size`, `single-face`,
/// `facing-forward`, `uniform-background`, `head-visible`, `centered`,
/// `aspect-ratio`).
///
/// Rejects with `MULTIPLE_FACES_DETECTED` when more than one face is
/// present and with `NO_FACE_DETECTED` when a single-face check has no face.
#[wasm_bindgen(js_name = "runCheck")]
pub fn run_check(
    input: Vec<u8>,
    detections: JsValue,
    check: String,
    options: JsValue,
) -> Result<bool, JsValue> {
    let check: Check = check.parse().map_err(to_js_error)?;
    let mut validator = build_validator(&input, detections, options)?;
    validator.run_check(check).map_err(to_js_error)
}

/// Whether a declared upload MIME type is accepted (PNG or JPEG).
#[wasm_bindgen(js_name = "isValidFileType")]
pub fn is_valid_file_type(mime_type: &str) -> bool {
    photo_validator::rules::is_allowed_mime_type(mime_type)
}
