use serde::{Deserialize, Serialize};

use super::{Amount, UserId};

pub type EntryId = i64;

/// Label shared by both sides of a balance disbursement.
pub const DISBURSEMENT_TRANSACTION_NAME: &str = "Balance disbursement";

/// Which ledger account an entry is booked against.
///
/// Internal accounts are wallet users; external accounts are bank accounts
/// outside the system, identified by account number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum AccountRef {
    Internal(UserId),
    External(String),
}

impl AccountRef {
    pub fn kind(&self) -> &'static str {
        match self {
            AccountRef::Internal(_) => "internal",
            AccountRef::External(_) => "external",
        }
    }

    /// Rebuild a reference from its stored `(kind, id)` pair.
    pub fn from_parts(kind: &str, id: &str) -> Option<Self> {
        match kind {
            "internal" => id.parse().ok().map(AccountRef::Internal),
            "external" => Some(AccountRef::External(id.to_string())),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccountRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountRef::Internal(user_id) => write!(f, "{}", user_id),
            AccountRef::External(account_no) => write!(f, "{}", account_no),
        }
    }
}

/// One side of a double-entry booking. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Assigned by the ledger store on append; 0 until then
    pub id: EntryId,
    pub account: AccountRef,
    pub transaction_name: String,
    pub debit_amount: Amount,
    pub credit_amount: Amount,
    /// Reference tag linking the entry to its source document
    pub folio: String,
}

impl JournalEntry {
    pub fn debit(
        account: AccountRef,
        transaction_name: impl Into<String>,
        amount: Amount,
        folio: impl Into<String>,
    ) -> Self {
        assert!(amount > 0, "Journal entry amount must be positive");
        Self {
            id: 0,
            account,
            transaction_name: transaction_name.into(),
            debit_amount: amount,
            credit_amount: 0,
            folio: folio.into(),
        }
    }

    pub fn credit(
        account: AccountRef,
        transaction_name: impl Into<String>,
        amount: Amount,
        folio: impl Into<String>,
    ) -> Self {
        assert!(amount > 0, "Journal entry amount must be positive");
        Self {
            id: 0,
            account,
            transaction_name: transaction_name.into(),
            debit_amount: 0,
            credit_amount: amount,
            folio: folio.into(),
        }
    }

    pub fn is_debit(&self) -> bool {
        self.debit_amount > 0
    }

    /// Exactly one of debit and credit is non-zero, and neither is negative.
    pub fn is_well_formed(&self) -> bool {
        self.debit_amount >= 0
            && self.credit_amount >= 0
            && (self.debit_amount == 0) != (self.credit_amount == 0)
    }
}

/// The debit/credit pair recorded after a successful payout: the user's
/// internal account is debited and the destination bank account is credited
/// with the same amount.
pub fn disbursement_entries(
    user_id: UserId,
    destination_account_no: &str,
    amount: Amount,
    folio: &str,
) -> (JournalEntry, JournalEntry) {
    let debit = JournalEntry::debit(
        AccountRef::Internal(user_id),
        DISBURSEMENT_TRANSACTION_NAME,
        amount,
        folio,
    );
    let credit = JournalEntry::credit(
        AccountRef::External(destination_account_no.to_string()),
        DISBURSEMENT_TRANSACTION_NAME,
        amount,
        folio,
    );
    (debit, credit)
}
