use anyhow::Result;
use std::io::Write;

use crate::storage::Repository;

/// Exporter for writing wallet data as CSV
pub struct Exporter<'a> {
    repo: &'a Repository,
}

impl<'a> Exporter<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self { repo }
    }

    /// Export journal entries to CSV format
    pub async fn export_journal_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let entries = self.repo.list_journal_entries().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "account_kind",
            "account_id",
            "transaction_name",
            "debit_amount",
            "credit_amount",
            "folio",
        ])?;

        for entry in &entries {
            csv_writer.write_record([
                entry.id.to_string(),
                entry.account.kind().to_string(),
                entry.account.to_string(),
                entry.transaction_name.clone(),
                entry.debit_amount.to_string(),
                entry.credit_amount.to_string(),
                entry.folio.clone(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(entries.len())
    }

    /// Export balance records to CSV format, in the same shape the importer reads
    pub async fn export_user_balances_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let users = self.repo.list_user_balances().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "username",
            "balance",
            "bank_code",
            "account_no",
            "account_name",
        ])?;

        for user in &users {
            csv_writer.write_record([
                user.username.clone(),
                user.balance.to_string(),
                user.bank_code.clone(),
                user.account_no.clone(),
                user.account_name.clone(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(users.len())
    }
}
