use serde::{Deserialize, Serialize};

use super::transaction::Transaction;

/// Acknowledgement for dataset mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    /// The transaction as stored, after trimming
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Transaction>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(message: impl Into<String>, data: Transaction) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

/// Error body returned by the HTTP layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}
