// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use ppr_wallet::application::WalletService;
use ppr_wallet::domain::{
    Amount, BalanceStore, DisbursementData, DisbursementRequest, DisbursementResponse,
    JournalEntry, LedgerStore, NewUserBalance, PartnerClientError, PayoutPartner, StoreError,
    UserBalance, UserId,
};
use ppr_wallet::storage::{InMemoryBalanceStore, InMemoryLedgerStore, Repository};
use tempfile::TempDir;
use tokio::sync::Barrier;

/// Helper to create a migrated repository in a temporary database
pub async fn test_repository() -> Result<(Repository, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let repo = Repository::init(&format!("sqlite:{}?mode=rwc", db_path.display())).await?;
    Ok((repo, temp_dir))
}

/// The balance record used throughout the examples: Andy, 10000, bca/0810.
pub fn andy(id: UserId, balance: Amount) -> UserBalance {
    NewUserBalance::new("andy123", balance, "bca", "0810", "Andy").into_record(id, Utc::now())
}

// ========================
// Payout partner double
// ========================

#[derive(Debug, Clone)]
pub enum PartnerReply {
    Status(String),
    Unreachable,
    Malformed,
}

/// Payout partner that records every request and answers from a script.
pub struct StubPartner {
    reply: PartnerReply,
    delay: Option<Duration>,
    requests: Mutex<Vec<DisbursementRequest>>,
}

impl StubPartner {
    pub fn replying(reply: PartnerReply) -> Self {
        Self {
            reply,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn ok() -> Self {
        Self::replying(PartnerReply::Status("ok".to_string()))
    }

    pub fn declining(status: &str) -> Self {
        Self::replying(PartnerReply::Status(status.to_string()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<DisbursementRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl PayoutPartner for StubPartner {
    async fn create_disbursement(
        &self,
        request: DisbursementRequest,
    ) -> Result<DisbursementResponse, PartnerClientError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.reply {
            PartnerReply::Status(status) => Ok(DisbursementResponse {
                status: status.clone(),
                message: String::new(),
                data: Some(DisbursementData {
                    id: "trx-0001".to_string(),
                    status: "pending".to_string(),
                    reference_id: request.reference_id,
                    account: Some(request.account),
                    amount: Some(request.amount),
                    created_at: Some(Utc::now()),
                }),
            }),
            PartnerReply::Unreachable => Err(PartnerClientError::Network(Box::new(
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
            ))),
            PartnerReply::Malformed => Err(PartnerClientError::Protocol(
                serde_json::from_str::<DisbursementResponse>("<html>").unwrap_err(),
            )),
        }
    }
}

// ========================
// Store doubles
// ========================

/// In-memory balance store that counts writes and can be told to fail.
#[derive(Default)]
pub struct TrackedBalanceStore {
    pub inner: InMemoryBalanceStore,
    pub fail_reads: bool,
    pub fail_writes: bool,
    writes: AtomicUsize,
}

impl TrackedBalanceStore {
    pub async fn with_user(user: UserBalance) -> Self {
        let store = Self::default();
        store.inner.insert(user).await;
        store
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn balance_of(&self, id: UserId) -> Option<Amount> {
        self.inner.get(id).await.map(|user| user.balance)
    }
}

#[async_trait]
impl BalanceStore for TrackedBalanceStore {
    async fn get_by_id(&self, id: UserId) -> Result<UserBalance, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Database(anyhow::anyhow!("database is locked")));
        }
        self.inner.get_by_id(id).await
    }

    async fn set_balance(&self, id: UserId, balance: Amount) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(StoreError::Database(anyhow::anyhow!("disk I/O error")));
        }
        self.inner.set_balance(id, balance).await
    }
}

/// In-memory journal that counts appends and can reject either side.
#[derive(Default)]
pub struct FaultyLedgerStore {
    pub inner: InMemoryLedgerStore,
    pub fail_debits: bool,
    pub fail_credits: bool,
    appends: AtomicUsize,
}

impl FaultyLedgerStore {
    pub fn failing_debits() -> Self {
        Self {
            fail_debits: true,
            ..Self::default()
        }
    }

    pub fn failing_credits() -> Self {
        Self {
            fail_credits: true,
            ..Self::default()
        }
    }

    pub fn append_count(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }

    pub async fn entries(&self) -> Vec<JournalEntry> {
        self.inner.entries().await
    }
}

#[async_trait]
impl LedgerStore for FaultyLedgerStore {
    async fn append(&self, entry: JournalEntry) -> Result<JournalEntry, StoreError> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        let rejected = if entry.is_debit() {
            self.fail_debits
        } else {
            self.fail_credits
        };
        if rejected {
            return Err(StoreError::Database(anyhow::anyhow!("journal write failed")));
        }
        self.inner.append(entry).await
    }
}

/// Journal whose appends only proceed once both sides of the pair are in flight.
pub struct RendezvousLedgerStore {
    pub inner: InMemoryLedgerStore,
    barrier: Barrier,
}

impl Default for RendezvousLedgerStore {
    fn default() -> Self {
        Self {
            inner: InMemoryLedgerStore::default(),
            barrier: Barrier::new(2),
        }
    }
}

#[async_trait]
impl LedgerStore for RendezvousLedgerStore {
    async fn append(&self, entry: JournalEntry) -> Result<JournalEntry, StoreError> {
        self.barrier.wait().await;
        self.inner.append(entry).await
    }
}

/// Journal with a slow debit side and a credit side that always fails.
pub struct SlowDebitLedgerStore {
    pub inner: InMemoryLedgerStore,
    pub debit_delay: Duration,
}

impl SlowDebitLedgerStore {
    pub fn new(debit_delay: Duration) -> Self {
        Self {
            inner: InMemoryLedgerStore::default(),
            debit_delay,
        }
    }
}

#[async_trait]
impl LedgerStore for SlowDebitLedgerStore {
    async fn append(&self, entry: JournalEntry) -> Result<JournalEntry, StoreError> {
        if !entry.is_debit() {
            return Err(StoreError::Database(anyhow::anyhow!("credit rejected")));
        }
        tokio::time::sleep(self.debit_delay).await;
        self.inner.append(entry).await
    }
}

/// Service over a single user, a healthy partner and the given journal.
pub async fn service_with_ledger(
    user: UserBalance,
    ledger: Arc<dyn LedgerStore>,
) -> (WalletService, Arc<TrackedBalanceStore>) {
    let balances = Arc::new(TrackedBalanceStore::with_user(user).await);
    let service = WalletService::new(balances.clone(), ledger, Arc::new(StubPartner::ok()));
    (service, balances)
}

// ========================
// Service fixture
// ========================

/// A wallet service wired to test doubles, with handles kept for assertions.
pub struct Harness {
    pub service: Arc<WalletService>,
    pub balances: Arc<TrackedBalanceStore>,
    pub ledger: Arc<FaultyLedgerStore>,
    pub partner: Arc<StubPartner>,
}

impl Harness {
    pub fn new(
        balances: TrackedBalanceStore,
        ledger: FaultyLedgerStore,
        partner: StubPartner,
    ) -> Self {
        let balances = Arc::new(balances);
        let ledger = Arc::new(ledger);
        let partner = Arc::new(partner);
        let service = WalletService::new(balances.clone(), ledger.clone(), partner.clone());

        Self {
            service: Arc::new(service),
            balances,
            ledger,
            partner,
        }
    }

    /// One user, a healthy journal and the given partner.
    pub async fn with_user(user: UserBalance, partner: StubPartner) -> Self {
        Self::new(
            TrackedBalanceStore::with_user(user).await,
            FaultyLedgerStore::default(),
            partner,
        )
    }
}
