use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::{
    Amount, BalanceStore, JournalEntry, LedgerStore, NewUserBalance, StoreError, UserBalance,
    UserId,
};

/// A thread-safe in-memory store for balance records.
///
/// Clones share the same underlying map, so a test can keep one handle and
/// give another to the service.
#[derive(Default, Clone)]
pub struct InMemoryBalanceStore {
    users: Arc<RwLock<HashMap<UserId, UserBalance>>>,
}

impl InMemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under an explicit id, replacing any existing one.
    pub async fn insert(&self, user: UserBalance) {
        self.users.write().await.insert(user.id, user);
    }

    /// Insert a new record under the next free id.
    pub async fn create(&self, user: NewUserBalance) -> UserBalance {
        let mut users = self.users.write().await;
        let id = users.keys().max().copied().unwrap_or(0) + 1;
        let record = user.into_record(id, Utc::now());
        users.insert(id, record.clone());
        record
    }

    pub async fn get(&self, id: UserId) -> Option<UserBalance> {
        self.users.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl BalanceStore for InMemoryBalanceStore {
    async fn get_by_id(&self, id: UserId) -> Result<UserBalance, StoreError> {
        self.get(id).await.ok_or(StoreError::NotFound)
    }

    async fn set_balance(&self, id: UserId, balance: Amount) -> Result<(), StoreError> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.balance = balance;
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

/// A thread-safe in-memory append-only journal.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    entries: Arc<RwLock<Vec<JournalEntry>>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every entry in append order.
    pub async fn entries(&self) -> Vec<JournalEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn append(&self, mut entry: JournalEntry) -> Result<JournalEntry, StoreError> {
        let mut entries = self.entries.write().await;
        entry.id = entries.len() as i64 + 1;
        entries.push(entry.clone());
        Ok(entry)
    }
}
