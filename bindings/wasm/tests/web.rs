use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use photo_validator_wasm::{is_valid_file_type, run_check, validate};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

/// 600×480 photo with a two-tone near-white background.
fn make_test_png() -> Vec<u8> {
    let img = RgbImage::from_fn(600, 480, |x, _| {
        if x < 300 {
            Rgb([250, 250, 250])
        } else {
            Rgb([240, 240, 240])
        }
    });

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(img.as_raw(), 600, 480, ExtendedColorType::Rgb8)
        .unwrap();
    buffer
}

fn face_json(x: f64) -> String {
    format!(
        r#"{{
            "box": {{ "x": {x}, "y": 60, "width": 160, "height": 200 }},
            "score": 0.9,
            "landmarks": {{
                "leftEye": [{{ "x": {lx}, "y": 140 }}],
                "rightEye": [{{ "x": {rx}, "y": 141 }}]
            }}
        }}"#,
        lx = x + 50.0,
        rx = x + 110.0,
    )
}

fn detections(faces: &[String]) -> JsValue {
    js_sys::JSON::parse(&format!("[{}]", faces.join(","))).unwrap()
}

fn options(json: &str) -> JsValue {
    js_sys::JSON::parse(json).unwrap()
}

fn get(target: &JsValue, key: &str) -> JsValue {
    js_sys::Reflect::get(target, &JsValue::from_str(key)).unwrap()
}

fn error_code(err: &JsValue) -> Option<String> {
    get(err, "code").as_string()
}

fn check_entry(report: &JsValue, name: &str) -> JsValue {
    let checks = js_sys::Array::from(&get(report, "checks"));
    checks
        .iter()
        .find(|entry| get(entry, "check").as_string().as_deref() == Some(name))
        .unwrap()
}

#[wasm_bindgen_test]
fn validate_reports_every_check() {
    let report = validate(
        make_test_png(),
        detections(&[face_json(220.0)]),
        JsValue::UNDEFINED,
    )
    .unwrap();

    assert_eq!(js_sys::Array::from(&get(&report, "checks")).length(), 8);
    assert_eq!(get(&report, "allPassed").as_bool(), Some(false));
    assert_eq!(get(&check_entry(&report, "single-face"), "passed").as_bool(), Some(true));
    assert_eq!(get(&check_entry(&report, "facing-forward"), "passed").as_bool(), Some(true));
    assert_eq!(get(&check_entry(&report, "head-visible"), "passed").as_bool(), Some(false));
    assert_eq!(get(&check_entry(&report, "centered"), "passed").as_bool(), Some(true));
    assert_eq!(get(&check_entry(&report, "aspect-ratio"), "passed").as_bool(), Some(false));
    assert!(get(&report, "overlay").is_null());
}

#[wasm_bindgen_test]
fn validate_reports_check_errors_inline() {
    let report = validate(
        make_test_png(),
        detections(&[face_json(40.0), face_json(400.0)]),
        JsValue::NULL,
    )
    .unwrap();

    let entry = check_entry(&report, "single-face");
    assert_eq!(get(&entry, "passed").as_bool(), Some(false));
    assert_eq!(
        get(&get(&entry, "error"), "code").as_string().as_deref(),
        Some("MULTIPLE_FACES_DETECTED")
    );
}

#[wasm_bindgen_test]
fn overlay_returned_when_requested() {
    let report = validate(
        make_test_png(),
        detections(&[face_json(220.0)]),
        options(r#"{ "renderOverlay": true }"#),
    )
    .unwrap();

    let overlay = get(&report, "overlay");
    assert_eq!(get(&overlay, "width").as_f64(), Some(400.0));
    assert_eq!(get(&overlay, "height").as_f64(), Some(500.0));
    let data = js_sys::Uint8ClampedArray::from(get(&overlay, "data"));
    assert_eq!(data.length(), 400 * 500 * 4);
}

#[wasm_bindgen_test]
fn run_check_by_name() {
    let verdict = run_check(
        make_test_png(),
        detections(&[face_json(220.0)]),
        "centered".to_string(),
        JsValue::UNDEFINED,
    )
    .unwrap();
    assert!(verdict);

    let verdict = run_check(
        make_test_png(),
        detections(&[face_json(420.0)]),
        "centered".to_string(),
        JsValue::UNDEFINED,
    )
    .unwrap();
    assert!(!verdict);
}

#[wasm_bindgen_test]
fn options_override_thresholds() {
    let verdict = run_check(
        make_test_png(),
        detections(&[face_json(220.0)]),
        "head-visible".to_string(),
        options(r#"{ "headTopRatio": 0.1 }"#),
    )
    .unwrap();
    assert!(verdict);
}

#[wasm_bindgen_test]
fn no_face_is_false_but_many_faces_reject() {
    let verdict = run_check(
        make_test_png(),
        detections(&[]),
        "single-face".to_string(),
        JsValue::UNDEFINED,
    )
    .unwrap();
    assert!(!verdict);

    let err = run_check(
        make_test_png(),
        detections(&[face_json(40.0), face_json(400.0)]),
        "single-face".to_string(),
        JsValue::UNDEFINED,
    )
    .unwrap_err();
    assert_eq!(error_code(&err).as_deref(), Some("MULTIPLE_FACES_DETECTED"));
}

#[wasm_bindgen_test]
fn ibug68_landmarks_accepted() {
    let points: Vec<String> = (0..68)
        .map(|i| format!(r#"{{ "x": {}, "y": 140 }}"#, 240 + i))
        .collect();
    let face = format!(
        r#"{{ "box": {{ "x": 220, "y": 60, "width": 160, "height": 200 }}, "landmarks": [{}] }}"#,
        points.join(",")
    );

    let verdict = run_check(
        make_test_png(),
        detections(&[face]),
        "facing-forward".to_string(),
        JsValue::UNDEFINED,
    )
    .unwrap();
    assert!(verdict);
}

#[wasm_bindgen_test]
fn malformed_detection_rejected() {
    let face = r#"{ "box": { "x": 0, "y": 0, "width": -5, "height": 10 },
        "landmarks": { "leftEye": [{ "x": 1, "y": 1 }], "rightEye": [{ "x": 2, "y": 1 }] } }"#;
    let err = validate(
        make_test_png(),
        detections(&[face.to_string()]),
        JsValue::UNDEFINED,
    )
    .unwrap_err();
    assert_eq!(error_code(&err).as_deref(), Some("INVALID_DETECTION"));
}

#[wasm_bindgen_test]
fn unknown_check_name_rejected() {
    let err = run_check(
        make_test_png(),
        detections(&[]),
        "smile".to_string(),
        JsValue::UNDEFINED,
    )
    .unwrap_err();
    assert_eq!(error_code(&err).as_deref(), Some("UNKNOWN_CHECK"));
}

#[wasm_bindgen_test]
fn invalid_input_returns_error() {
    let err = validate(b"not an image".to_vec(), detections(&[]), JsValue::UNDEFINED).unwrap_err();
    assert_eq!(error_code(&err).as_deref(), Some("DECODE_ERROR"));
}

#[wasm_bindgen_test]
fn invalid_options_rejected() {
    let err = validate(
        make_test_png(),
        detections(&[]),
        options(r#"{ "colorThreshold": -3 }"#),
    )
    .unwrap_err();
    assert_eq!(error_code(&err).as_deref(), Some("INVALID_OPTIONS"));
}

#[wasm_bindgen_test]
fn file_type_allow_list() {
    assert!(is_valid_file_type("image/png"));
    assert!(is_valid_file_type("image/jpeg"));
    assert!(!is_valid_file_type("image/webp"));
}
