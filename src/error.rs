//! Error taxonomy shared by the decoder, encoder, query service and capture assembly.

use thiserror::Error;

use crate::types::Index;

pub type Result<T, E = BvhError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum BvhError {
    /// A required keyword, block or section is missing, or the block nesting is broken.
    #[error("structural error at line {line}: {message}")]
    Structural { line: usize, message: String },

    /// A line is present but its contents cannot be parsed.
    #[error("format error at line {line}: {message}")]
    Format { line: usize, message: String },

    /// Frame width disagrees with the skeleton's total channel count.
    #[error("frame {frame} has {actual} channel values, skeleton declares {expected}")]
    ChannelMismatch {
        frame: usize,
        expected: usize,
        actual: usize,
    },

    /// A motion row is shorter than the channel count and short rows are rejected.
    #[error("motion row at line {line} has {actual} values, expected {expected}")]
    DataIntegrity {
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("frame index {index} out of range for animation with {frame_count} frames")]
    Range { index: usize, frame_count: usize },

    /// The joint graph would stop being a tree (second root, duplicate name, missing root).
    #[error("invalid hierarchy: {0}")]
    Hierarchy(String),

    #[error("playback time {0} does not map to a frame")]
    InvalidTime(f64),

    #[error("unknown joint '{0}'")]
    UnknownJoint(String),

    #[error("joint index {0} does not exist")]
    InvalidJointIndex(Index),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to serialize payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl BvhError {
    pub(crate) fn structural(line: usize, message: impl Into<String>) -> Self {
        BvhError::Structural {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        BvhError::Format {
            line,
            message: message.into(),
        }
    }

    /// Line number the error points at, when it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            BvhError::Structural { line, .. }
            | BvhError::Format { line, .. }
            | BvhError::DataIntegrity { line, .. } => Some(*line),
            _ => None,
        }
    }
}
