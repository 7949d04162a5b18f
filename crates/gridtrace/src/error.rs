use std::path::PathBuf;
use thiserror::Error;

use crate::phase::SinglePhaseKind;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors from network loading and phase connectivity resolution.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Network file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid phase: {0}")]
    InvalidPhase(String),

    #[error("Phase {0} is not an X/Y marker and cannot be tracked")]
    NotXyPhase(SinglePhaseKind),

    #[error("Phase {phase} is not a valid candidate for {xy}")]
    InvalidCandidate {
        xy: SinglePhaseKind,
        phase: SinglePhaseKind,
    },

    #[error("Duplicate mRID: {0}")]
    DuplicateMrid(String),

    #[error("Unknown equipment: {0}")]
    UnknownEquipment(String),

    #[error("Unknown terminal: {0}")]
    UnknownTerminal(String),

    #[error("Invalid network document: {0}")]
    InvalidDocument(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// `true` when the error signals a logic defect rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::Internal(_))
    }
}
