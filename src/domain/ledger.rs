use std::collections::HashMap;

use super::{AccountRef, Amount, JournalEntry};

/// Net position of one account: sum of debits minus sum of credits.
pub fn account_balance(account: &AccountRef, entries: &[JournalEntry]) -> Amount {
    entries
        .iter()
        .filter(|entry| &entry.account == account)
        .fold(0, |balance, entry| {
            balance + entry.debit_amount - entry.credit_amount
        })
}

/// Net positions of every account that appears in the journal.
pub fn all_account_balances(entries: &[JournalEntry]) -> HashMap<AccountRef, Amount> {
    let mut balances: HashMap<AccountRef, Amount> = HashMap::new();

    for entry in entries {
        *balances.entry(entry.account.clone()).or_insert(0) +=
            entry.debit_amount - entry.credit_amount;
    }

    balances
}

/// Totals used to check that the journal is in balance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrialBalance {
    pub entry_count: usize,
    pub total_debits: Amount,
    pub total_credits: Amount,
    /// Entries that violate the one-sided debit/credit rule
    pub malformed_entries: usize,
}

impl TrialBalance {
    pub fn is_balanced(&self) -> bool {
        self.total_debits == self.total_credits && self.malformed_entries == 0
    }
}

pub fn trial_balance(entries: &[JournalEntry]) -> TrialBalance {
    entries
        .iter()
        .fold(TrialBalance::default(), |mut totals, entry| {
            totals.entry_count += 1;
            totals.total_debits += entry.debit_amount;
            totals.total_credits += entry.credit_amount;
            if !entry.is_well_formed() {
                totals.malformed_entries += 1;
            }
            totals
        })
}
