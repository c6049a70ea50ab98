use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::domain::{
    AccountRef, Amount, BalanceStore, JournalEntry, LedgerStore, NewUserBalance, StoreError,
    UserBalance, UserId,
};

use super::MIGRATION_001_INITIAL;

/// Repository for persisting and querying balance records and journal entries.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Close every pooled connection. Later queries fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ========================
    // Balance operations
    // ========================

    /// Insert a new balance record, returning it with its assigned id.
    pub async fn insert_user_balance(&self, user: &NewUserBalance) -> Result<UserBalance> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO user_balances (username, balance, bank_code, account_no, account_name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(user.balance)
        .bind(&user.bank_code)
        .bind(&user.account_no)
        .bind(&user.account_name)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to insert user balance")?;

        tracing::debug!(username = %user.username, "inserted user balance");

        Ok(user.clone().into_record(result.last_insert_rowid(), now))
    }

    /// Get a balance record by user ID.
    pub async fn get_user_balance(&self, id: UserId) -> Result<Option<UserBalance>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, balance, bank_code, account_no, account_name, created_at, updated_at
            FROM user_balances
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user balance")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_user_balance(&row)?)),
            None => Ok(None),
        }
    }

    /// List all balance records, ordered by ID.
    pub async fn list_user_balances(&self) -> Result<Vec<UserBalance>> {
        let rows = sqlx::query(
            r#"
            SELECT id, username, balance, bank_code, account_no, account_name, created_at, updated_at
            FROM user_balances
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list user balances")?;

        rows.iter().map(Self::row_to_user_balance).collect()
    }

    /// Overwrite the balance of a user. Missing users are not an error.
    pub async fn update_balance(&self, id: UserId, balance: Amount) -> Result<()> {
        let result = sqlx::query("UPDATE user_balances SET balance = ?, updated_at = ? WHERE id = ?")
            .bind(balance)
            .bind(Utc::now().to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update balance")?;

        if result.rows_affected() == 0 {
            tracing::warn!(user_id = id, "balance update matched no rows");
        }
        Ok(())
    }

    fn row_to_user_balance(row: &sqlx::sqlite::SqliteRow) -> Result<UserBalance> {
        let created_at_str: String = row.get("created_at");
        let updated_at_str: String = row.get("updated_at");

        Ok(UserBalance {
            id: row.get("id"),
            username: row.get("username"),
            balance: row.get("balance"),
            bank_code: row.get("bank_code"),
            account_no: row.get("account_no"),
            account_name: row.get("account_name"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
                .context("Invalid updated_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Journal operations
    // ========================

    /// Save a new journal entry. The database assigns the sequence number.
    pub async fn save_journal_entry(&self, entry: &mut JournalEntry) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO journal_entries (account_kind, account_id, transaction_name, debit_amount, credit_amount, folio)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.account.kind())
        .bind(entry.account.to_string())
        .bind(&entry.transaction_name)
        .bind(entry.debit_amount)
        .bind(entry.credit_amount)
        .bind(&entry.folio)
        .execute(&self.pool)
        .await
        .context("Failed to save journal entry")?;

        entry.id = result.last_insert_rowid();
        Ok(())
    }

    /// List all journal entries, ordered by sequence number.
    pub async fn list_journal_entries(&self) -> Result<Vec<JournalEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, account_kind, account_id, transaction_name, debit_amount, credit_amount, folio
            FROM journal_entries
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list journal entries")?;

        rows.iter().map(Self::row_to_journal_entry).collect()
    }

    fn row_to_journal_entry(row: &sqlx::sqlite::SqliteRow) -> Result<JournalEntry> {
        let kind: String = row.get("account_kind");
        let account_id: String = row.get("account_id");

        Ok(JournalEntry {
            id: row.get("id"),
            account: AccountRef::from_parts(&kind, &account_id).ok_or_else(|| {
                anyhow::anyhow!("Invalid account reference: {} {}", kind, account_id)
            })?,
            transaction_name: row.get("transaction_name"),
            debit_amount: row.get("debit_amount"),
            credit_amount: row.get("credit_amount"),
            folio: row.get("folio"),
        })
    }
}

#[async_trait]
impl BalanceStore for Repository {
    async fn get_by_id(&self, id: UserId) -> Result<UserBalance, StoreError> {
        self.get_user_balance(id).await?.ok_or(StoreError::NotFound)
    }

    async fn set_balance(&self, id: UserId, balance: Amount) -> Result<(), StoreError> {
        Ok(self.update_balance(id, balance).await?)
    }
}

#[async_trait]
impl LedgerStore for Repository {
    async fn append(&self, mut entry: JournalEntry) -> Result<JournalEntry, StoreError> {
        self.save_journal_entry(&mut entry).await?;
        Ok(entry)
    }
}
