use thiserror::Error;

use crate::domain::{Amount, PartnerClientError, StoreError, UserId};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("user not found")]
    UserNotFound(UserId),

    /// Zero counts as insufficient; an already disbursed balance looks the same.
    #[error("insufficient balance")]
    InsufficientBalance { user_id: UserId, balance: Amount },

    /// The partner was reachable but did not accept the payout.
    #[error("partner error")]
    PartnerError { status: String, message: String },

    #[error("invalid parameter")]
    InvalidParameter(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Partner(#[from] PartnerClientError),

    /// A spawned ledger write panicked or was cancelled without reporting an error.
    #[error("ledger task failed: {0}")]
    LedgerTask(String),
}

impl AppError {
    /// Errors the caller is told about verbatim. Everything else is an
    /// internal failure at the boundary.
    pub fn is_client_visible(&self) -> bool {
        matches!(
            self,
            AppError::UserNotFound(_)
                | AppError::InsufficientBalance { .. }
                | AppError::InvalidParameter(_)
        )
    }
}
