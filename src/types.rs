//! Shared types passed between the normalizer, the batch driver, the report
//! writer and the CLI output.

use crate::imaging::{AspectRatio, Dimensions};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The transform applied to an image that was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    /// Uniform nearest-neighbor resample to the target size.
    Scale,
    /// Centered crop to the target size.
    Crop,
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Adjustment::Scale => f.write_str("scaled"),
            Adjustment::Crop => f.write_str("cropped"),
        }
    }
}

/// What happened to one source file.
///
/// The first four variants come out of the normalizer; the others are
/// produced by the batch driver before the normalizer ever runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProcessingOutcome {
    Success {
        original: Dimensions,
        ratio: AspectRatio,
        new: Dimensions,
        adjustment: Adjustment,
    },
    NoMatchingRatio {
        original: Dimensions,
    },
    AlreadyConforming {
        original: Dimensions,
        ratio: AspectRatio,
    },
    NotAdjusted {
        original: Dimensions,
        ratio: AspectRatio,
    },
    DecodeFailure {
        reason: String,
    },
    IoFailure {
        reason: String,
    },
    /// The pixel transform refused the decoded buffer.
    TransformFailure {
        reason: String,
    },
    UnsupportedFormat {
        extension: String,
    },
}

/// Coarse grouping used for summary counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutcomeKind {
    Changed,
    Unchanged,
    Skipped,
    Failed,
}

impl ProcessingOutcome {
    /// Dimensions of the decoded source, when it was decoded.
    pub fn original(&self) -> Option<Dimensions> {
        match self {
            Self::Success { original, .. }
            | Self::NoMatchingRatio { original }
            | Self::AlreadyConforming { original, .. }
            | Self::NotAdjusted { original, .. } => Some(*original),
            _ => None,
        }
    }

    /// The catalog ratio that was chosen, if any.
    pub fn ratio(&self) -> Option<AspectRatio> {
        match self {
            Self::Success { ratio, .. }
            | Self::AlreadyConforming { ratio, .. }
            | Self::NotAdjusted { ratio, .. } => Some(*ratio),
            _ => None,
        }
    }

    /// New dimensions, only when the image was actually changed.
    pub fn new_dimensions(&self) -> Option<Dimensions> {
        match self {
            Self::Success { new, .. } => Some(*new),
            _ => None,
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Success { .. } => OutcomeKind::Changed,
            Self::AlreadyConforming { .. } | Self::NotAdjusted { .. } => OutcomeKind::Unchanged,
            Self::NoMatchingRatio { .. } | Self::UnsupportedFormat { .. } => OutcomeKind::Skipped,
            Self::DecodeFailure { .. }
            | Self::IoFailure { .. }
            | Self::TransformFailure { .. } => OutcomeKind::Failed,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.kind() == OutcomeKind::Failed
    }

    /// Human-readable status, used for the log's Status column.
    pub fn status(&self) -> String {
        match self {
            Self::Success {
                ratio, adjustment, ..
            } => format!("Success: {adjustment} to {ratio}"),
            Self::NoMatchingRatio { .. } => "No matching aspect ratio within tolerance".to_string(),
            Self::AlreadyConforming { .. } => "Already conforming".to_string(),
            Self::NotAdjusted { .. } => {
                "Not adjusted: change exceeds pixel tolerance on both axes".to_string()
            }
            Self::DecodeFailure { reason } => format!("Decode failure: {reason}"),
            Self::IoFailure { reason } => format!("IO failure: {reason}"),
            Self::TransformFailure { reason } => format!("Transform failure: {reason}"),
            Self::UnsupportedFormat { extension } => format!("Unsupported format: {extension}"),
        }
    }
}

impl fmt::Display for ProcessingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status())
    }
}
