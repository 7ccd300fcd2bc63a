use thiserror::Error;

/// Error taxonomy for the document engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("parse error at byte {offset}: {reason}")]
    Parse { offset: usize, reason: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("range error: {0}")]
    Range(String),

    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("path not found: {0}")]
    PathNotFound(String),

    #[error("invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("cycle detected while printing")]
    CycleDetected,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("options error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
