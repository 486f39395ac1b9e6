use crate::error::{AutotagError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic version representation
///
/// Ordering is lexicographic over major, minor, patch, which is exactly what
/// the derived `Ord` gives us for this field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemanticVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
        }
    }

    /// Compute the version that follows `current` for the given step.
    ///
    /// A repository without any matching tag starts from `0.0.0`, so the
    /// first patch release is `0.0.1` and the first major is `1.0.0`.
    pub fn next(current: Option<SemanticVersion>, step: Step) -> Self {
        current.unwrap_or_default().bump(step)
    }

    /// Bump version according to step
    pub fn bump(&self, step: Step) -> Self {
        match step {
            Step::Major => SemanticVersion::new(self.major.saturating_add(1), 0, 0),
            Step::Minor => SemanticVersion::new(self.major, self.minor.saturating_add(1), 0),
            Step::Patch => {
                SemanticVersion::new(self.major, self.minor, self.patch.saturating_add(1))
            }
        }
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Which version component a tagging run increments
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Major,
    #[default]
    Minor,
    Patch,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Major => "major",
            Step::Minor => "minor",
            Step::Patch => "patch",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Step {
    type Err = AutotagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "major" => Ok(Step::Major),
            "minor" => Ok(Step::Minor),
            "patch" => Ok(Step::Patch),
            other => Err(AutotagError::config(format!(
                "step must be one of major, minor or patch, got '{}'",
                other
            ))),
        }
    }
}
