use thiserror::Error;

use crate::types::{CustomerId, LoanId};

#[derive(Error, Debug)]
pub enum ApprovalError {
    #[error("invalid input: {message}")]
    InvalidInput {
        message: String,
    },

    #[error("customer not found: {id}")]
    CustomerNotFound {
        id: CustomerId,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: LoanId,
    },

    #[error("customer already registered with phone number {phone_number}")]
    DuplicateCustomer {
        phone_number: u64,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("malformed row {row}: {message}")]
    IngestRow {
        row: usize,
        message: String,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store unavailable: {message}")]
    StoreUnavailable {
        message: String,
    },
}

impl ApprovalError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ApprovalError::InvalidInput {
            message: message.into(),
        }
    }

    /// unresolved customer or loan identifier
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApprovalError::CustomerNotFound { .. } | ApprovalError::LoanNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ApprovalError>;
