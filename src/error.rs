use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    ValidationError,
    InvalidIndex,
    EmptyDataset,
    StorageError,
    EngineError,
    InvalidRequest,
    IoError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError => write!(f, "VALIDATION_ERROR"),
            Self::InvalidIndex => write!(f, "INVALID_INDEX"),
            Self::EmptyDataset => write!(f, "EMPTY_DATASET"),
            Self::StorageError => write!(f, "STORAGE_ERROR"),
            Self::EngineError => write!(f, "ENGINE_ERROR"),
            Self::InvalidRequest => write!(f, "INVALID_REQUEST"),
            Self::IoError => write!(f, "IO_ERROR"),
        }
    }
}

impl ErrorCode {
    /// Whether the failure was caused by the caller's input rather than by
    /// storage or the engine.
    pub fn is_client_error(self) -> bool {
        matches!(
            self,
            Self::ValidationError | Self::InvalidIndex | Self::EmptyDataset | Self::InvalidRequest
        )
    }
}

#[derive(Debug, Serialize)]
pub struct RuleError {
    pub code: ErrorCode,
    pub message: String,
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for RuleError {}

impl RuleError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn invalid_index(index: usize, len: usize) -> Self {
        Self::new(
            ErrorCode::InvalidIndex,
            format!("Invalid index: {index} (dataset has {len} transactions)"),
        )
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    pub fn engine(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::EngineError, message)
    }
}

/// Extract the code and message from an error chain. Anything that is not a
/// [`RuleError`] (config files, sockets, runtime) is `IO_ERROR`, reported
/// with its whole cause chain.
pub fn classify(e: &anyhow::Error) -> (ErrorCode, String) {
    if let Some(re) = e.downcast_ref::<RuleError>() {
        (re.code, re.message.clone())
    } else {
        (ErrorCode::IoError, format!("{e:#}"))
    }
}
