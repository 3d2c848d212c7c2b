use thiserror::Error;

use crate::types::{CashEntryId, LoanId, PaymentId, Role};

#[derive(Error, Debug)]
pub enum CobroError {
    #[error("loan not found: {id}")]
    LoanNotFound { id: LoanId },

    #[error("payment not found: {id}")]
    PaymentNotFound { id: PaymentId },

    #[error("cash entry not found: {id}")]
    CashEntryNotFound { id: CashEntryId },

    /// business rejection, not a system fault; never logged as an error
    #[error("no se puede abonar a un préstamo inactivo")]
    LoanInactive { id: LoanId },

    #[error("loan has {payment_count} payments and cannot be deleted")]
    LoanHasPayments { id: LoanId, payment_count: usize },

    #[error("invalid input: {message}")]
    Validation { message: String },

    #[error("operation requires role {required:?}, actor has {actual:?}")]
    NotAuthorized { required: Role, actual: Role },

    /// transient; the caller may retry the whole operation from scratch
    #[error("loan version mismatch: expected {expected}, found {found}")]
    ConcurrencyConflict { expected: u64, found: u64 },

    #[error("persistence failure: {message}")]
    Persistence { message: String },
}

impl CobroError {
    pub fn validation(message: impl Into<String>) -> Self {
        CobroError::Validation {
            message: message.into(),
        }
    }

    /// transient errors are safe to retry end-to-end
    pub fn is_retryable(&self) -> bool {
        matches!(self, CobroError::ConcurrencyConflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, CobroError>;
