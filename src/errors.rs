use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by pose and pose-sequence handling
#[derive(Error, Debug)]
pub enum PoseError {
    #[error("Malformed pose data: {0}")]
    MalformedPoseData(String),

    #[error("Malformed pose sequence data: {0}")]
    MalformedSequenceData(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Pose sequence is empty")]
    EmptySequence,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PoseError>;
