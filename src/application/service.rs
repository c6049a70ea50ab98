use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::task::JoinSet;

use crate::domain::{
    disbursement_entries, Amount, BalanceStore, DisbursementRequest, JournalEntry, LedgerStore,
    PayoutPartner, StoreError, UserBalance, UserId,
};

use super::AppError;

/// Application service providing the wallet operations.
/// This is the primary interface for any client (HTTP server, CLI, tests).
pub struct WalletService {
    balances: Arc<dyn BalanceStore>,
    ledger: Arc<dyn LedgerStore>,
    partner: Arc<dyn PayoutPartner>,
    locks: UserLocks,
}

/// Result of a completed disbursement
#[derive(Debug, Clone)]
pub struct Disbursement {
    pub user_id: UserId,
    /// Reference id sent to the partner, also stored as the folio of both entries
    pub reference_id: String,
    /// Transaction id assigned by the partner, if it sent one
    pub partner_id: Option<String>,
    pub amount: Amount,
    pub debit: JournalEntry,
    pub credit: JournalEntry,
}

impl WalletService {
    pub fn new(
        balances: Arc<dyn BalanceStore>,
        ledger: Arc<dyn LedgerStore>,
        partner: Arc<dyn PayoutPartner>,
    ) -> Self {
        Self {
            balances,
            ledger,
            partner,
            locks: UserLocks::default(),
        }
    }

    /// Get a user's balance record.
    pub async fn get_user_balance(&self, user_id: UserId) -> Result<UserBalance, AppError> {
        self.fetch_user(user_id).await
    }

    /// Pay a user's whole balance out to their bank account.
    ///
    /// Steps run in order and the first failure stops the rest:
    /// fetch, validate, call the partner, zero the balance, then write the
    /// debit and credit journal entries concurrently.
    ///
    /// Nothing is rolled back. Once the partner has accepted the payout, a
    /// failure to zero the balance or to write either journal entry is
    /// reported as an error while the money is already on its way, and a
    /// retry will pay again.
    pub async fn disburse_balance(&self, user_id: UserId) -> Result<Disbursement, AppError> {
        // Held until the ledger is written so a concurrent call for the same
        // user sees the zeroed balance.
        let _guard = self.locks.acquire(user_id).await;

        let user = self.fetch_user(user_id).await.inspect_err(|error| {
            tracing::error!(user_id, "disbursement: fetching balance failed: {error}")
        })?;

        if !user.is_disbursable() {
            tracing::warn!(user_id, balance = user.balance, "disbursement: insufficient balance");
            return Err(AppError::InsufficientBalance {
                user_id,
                balance: user.balance,
            });
        }

        let amount = user.balance;
        let request = DisbursementRequest::new(user.destination(), amount);
        let reference_id = request.reference_id.clone();

        let response = self
            .partner
            .create_disbursement(request)
            .await
            .inspect_err(|error| {
                tracing::error!(user_id, %reference_id, "disbursement: partner call failed: {error}")
            })?;

        if !response.is_success() {
            tracing::warn!(
                user_id,
                %reference_id,
                status = %response.status,
                message = %response.message,
                "disbursement: partner declined payout"
            );
            return Err(AppError::PartnerError {
                status: response.status,
                message: response.message,
            });
        }
        let partner_id = response.partner_id().map(str::to_string);

        self.balances
            .set_balance(user_id, 0)
            .await
            .inspect_err(|error| {
                tracing::error!(
                    user_id,
                    %reference_id,
                    "disbursement: payout sent but zeroing the balance failed: {error}"
                )
            })?;

        let (debit, credit) = disbursement_entries(user.id, &user.account_no, amount, &reference_id);
        let (debit, credit) = self.record_entries(debit, credit).await.inspect_err(|error| {
            tracing::error!(
                user_id,
                %reference_id,
                "disbursement: balance zeroed but journal write failed: {error}"
            )
        })?;

        tracing::info!(user_id, %reference_id, amount, "disbursement completed");

        Ok(Disbursement {
            user_id,
            reference_id,
            partner_id,
            amount,
            debit,
            credit,
        })
    }

    async fn fetch_user(&self, user_id: UserId) -> Result<UserBalance, AppError> {
        match self.balances.get_by_id(user_id).await {
            Ok(user) => Ok(user),
            Err(StoreError::NotFound) => Err(AppError::UserNotFound(user_id)),
            Err(error) => Err(error.into()),
        }
    }

    /// Append both entries as independent tasks. The first failure aborts the
    /// other task; both are joined before returning.
    async fn record_entries(
        &self,
        debit: JournalEntry,
        credit: JournalEntry,
    ) -> Result<(JournalEntry, JournalEntry), AppError> {
        let mut tasks = JoinSet::new();
        for entry in [debit, credit] {
            let ledger = Arc::clone(&self.ledger);
            tasks.spawn(async move { ledger.append(entry).await });
        }

        let mut stored = Vec::with_capacity(2);
        let mut first_error = None;

        while let Some(joined) = tasks.join_next().await {
            let failure = match joined {
                Ok(Ok(entry)) => {
                    stored.push(entry);
                    continue;
                }
                Ok(Err(error)) => AppError::from(error),
                Err(join_error) if join_error.is_cancelled() => continue,
                Err(join_error) => AppError::LedgerTask(join_error.to_string()),
            };

            if first_error.is_none() {
                tasks.abort_all();
                first_error = Some(failure);
            }
        }

        if let Some(error) = first_error {
            return Err(error);
        }

        let (mut debits, mut credits): (Vec<_>, Vec<_>) =
            stored.into_iter().partition(JournalEntry::is_debit);
        match (debits.pop(), credits.pop()) {
            (Some(debit), Some(credit)) => Ok((debit, credit)),
            _ => Err(AppError::LedgerTask(
                "ledger store did not return both entries".to_string(),
            )),
        }
    }
}

/// One async mutex per user id, created on demand.
#[derive(Default)]
struct UserLocks {
    locks: Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>,
}

impl UserLocks {
    async fn acquire(&self, user_id: UserId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            // Drop locks nobody holds or waits on.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(user_id).or_default())
        };

        lock.lock_owned().await
    }
}
