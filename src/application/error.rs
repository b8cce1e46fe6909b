use thiserror::Error;

use crate::domain::{Amount, NonPositiveAmount};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Account not found with the username: {0}")]
    NotFound(String),

    #[error("Account already exists with the username: {0}")]
    AlreadyExists(String),

    #[error(
        "Insufficient balance for {username}: current balance is {balance}, requested {requested}"
    )]
    InsufficientFunds {
        username: String,
        balance: Amount,
        requested: Amount,
    },

    #[error("Invalid amount {0}: amounts must be positive")]
    InvalidAmount(Amount),

    #[error("Balance of {0} cannot hold the result of this operation")]
    AmountOverflow(String),

    #[error("Cannot transfer from {0} to itself")]
    SelfTransfer(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Credential hashing failed: {0}")]
    Hashing(String),

    #[error("Store unavailable: {0:#}")]
    StoreUnavailable(#[from] anyhow::Error),
}

impl From<NonPositiveAmount> for AppError {
    fn from(err: NonPositiveAmount) -> Self {
        AppError::InvalidAmount(err.0)
    }
}

impl AppError {
    /// Store failures may succeed on a later attempt; business-rule failures
    /// will not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::StoreUnavailable(_))
    }
}
