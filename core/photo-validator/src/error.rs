use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("validator is not initialized, call initialize() with a face detector first")]
    NotInitialized,

    #[error("no image has been set on the validator")]
    NoImage,

    #[error("no face detected in the photo")]
    NoFaceDetected,

    #[error("an ID photo must contain a single person, found {0} faces")]
    MultipleFacesDetected(usize),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid detection: {0}")]
    InvalidDetection(String),

    #[error("unknown check: {0}")]
    UnknownCheck(String),

    #[error("failed to decode image: {0}")]
    DecodeError(String),

    #[error("image dimensions are zero")]
    ZeroDimensions,
}
