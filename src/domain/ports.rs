//! Collaborators the disbursement workflow depends on.
//!
//! The workflow only sees these traits; SQLite, in-memory and HTTP
//! implementations live in `storage` and `partner`.

use async_trait::async_trait;
use thiserror::Error;

use super::{Amount, DisbursementRequest, DisbursementResponse, JournalEntry, UserBalance, UserId};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("storage failure: {0:#}")]
    Database(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum PartnerClientError {
    /// The partner could not be reached, or the request timed out.
    #[error("payout partner unreachable: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The partner answered with a body that is not a disbursement response.
    #[error("malformed payout partner response: {0}")]
    Protocol(#[from] serde_json::Error),
}

#[async_trait]
pub trait BalanceStore: Send + Sync {
    async fn get_by_id(&self, id: UserId) -> Result<UserBalance, StoreError>;

    /// Unconditionally overwrite the balance of `id`.
    async fn set_balance(&self, id: UserId, balance: Amount) -> Result<(), StoreError>;
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Append an entry, returning it with its assigned sequence number.
    async fn append(&self, entry: JournalEntry) -> Result<JournalEntry, StoreError>;
}

#[async_trait]
pub trait PayoutPartner: Send + Sync {
    async fn create_disbursement(
        &self,
        request: DisbursementRequest,
    ) -> Result<DisbursementResponse, PartnerClientError>;
}
