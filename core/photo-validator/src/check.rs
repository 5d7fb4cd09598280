use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// A named compliance check, runnable through [`crate::PhotoValidator::run_check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
    /// Upload MIME type is PNG or JPEG.
    FileType,
    /// Image meets the configured minimum dimensions.
    ImageSize,
    /// Exactly one face in the photo.
    SingleFace,
    /// Eyes are level.
    FacingForward,
    /// Background around the subject is a single colour.
    UniformBackground,
    /// There is room above the head.
    HeadFullyVisible,
    /// Face is centred and not cropped.
    CenteredAndComplete,
    /// Width/height ratio is within the accepted range.
    AspectRatio,
}

impl Check {
    /// Every check, in the order [`crate::PhotoValidator::report`] runs them.
    pub const ALL: [Check; 8] = [
        Check::FileType,
        Check::ImageSize,
        Check::SingleFace,
        Check::FacingForward,
        Check::UniformBackground,
        Check::HeadFullyVisible,
        Check::CenteredAndComplete,
        Check::AspectRatio,
    ];

    /// Stable kebab-case name.
    pub fn name(self) -> &'static str {
        match self {
            Check::FileType => "file-type",
            Check::ImageSize => "image-size",
            Check::SingleFace => "single-face",
            Check::FacingForward => "facing-forward",
            Check::UniformBackground => "uniform-background",
            Check::HeadFullyVisible => "head-visible",
            Check::CenteredAndComplete => "centered",
            Check::AspectRatio => "aspect-ratio",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Check {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Check::ALL
            .into_iter()
            .find(|check| check.name() == s)
            .ok_or_else(|| ValidationError::UnknownCheck(s.to_string()))
    }
}

/// Outcome of one check: a verdict, or the error that aborted it.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    /// Which check ran.
    pub check: Check,
    /// Its verdict or error.
    pub outcome: Result<bool, ValidationError>,
}

impl CheckResult {
    /// True only for a passing verdict.
    pub fn passed(&self) -> bool {
        matches!(self.outcome, Ok(true))
    }
}

/// Every check's outcome for one image.
///
/// Outcomes are independent; the report does not fold them into a single
/// verdict. [`ValidationReport::all_passed`] is there for callers that want
/// the plain conjunction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    /// One entry per check, in run order.
    pub results: Vec<CheckResult>,
}

impl ValidationReport {
    /// Outcome of `check`, if it was run.
    pub fn get(&self, check: Check) -> Option<&Result<bool, ValidationError>> {
        self.results
            .iter()
            .find(|r| r.check == check)
            .map(|r| &r.outcome)
    }

    /// Checks that returned `false` or failed with an error.
    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.passed())
    }

    /// Every check returned `true`.
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(CheckResult::passed)
    }
}
