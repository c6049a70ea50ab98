use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Amount, DestinationAccount};

pub type UserId = i64;

/// A user's cash balance together with the bank account it is paid out to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBalance {
    pub id: UserId,
    pub username: String,
    /// Smallest currency unit. Never negative once settled.
    pub balance: Amount,
    pub bank_code: String,
    pub account_no: String,
    /// Name of the bank account holder
    pub account_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserBalance {
    /// Returns true if there is anything to pay out.
    /// A zero balance is treated the same as a negative one.
    pub fn is_disbursable(&self) -> bool {
        self.balance > 0
    }

    /// The external bank account a disbursement for this user goes to.
    pub fn destination(&self) -> DestinationAccount {
        DestinationAccount {
            account_bank_code: self.bank_code.clone(),
            account_no: self.account_no.clone(),
            account_holder_name: self.account_name.clone(),
        }
    }
}

/// A balance record that has not been stored yet. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUserBalance {
    pub username: String,
    pub balance: Amount,
    pub bank_code: String,
    pub account_no: String,
    pub account_name: String,
}

impl NewUserBalance {
    pub fn new(
        username: impl Into<String>,
        balance: Amount,
        bank_code: impl Into<String>,
        account_no: impl Into<String>,
        account_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            balance,
            bank_code: bank_code.into(),
            account_no: account_no.into(),
            account_name: account_name.into(),
        }
    }

    /// Attach an id and timestamps, producing the stored shape of the record.
    pub fn into_record(self, id: UserId, now: DateTime<Utc>) -> UserBalance {
        UserBalance {
            id,
            username: self.username,
            balance: self.balance,
            bank_code: self.bank_code,
            account_no: self.account_no,
            account_name: self.account_name,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Users inserted by `seed` when no file is given.
pub fn demo_users() -> Vec<NewUserBalance> {
    vec![
        NewUserBalance::new("andy123", 10000, "arthagraha", "083012322138", "Andy Garcia"),
        NewUserBalance::new("brandy345", 15000, "bca", "0810123456878", "Brandy Joe"),
        NewUserBalance::new("cindy789", 8000, "cempakabank", "11298800345", "Cindy Kat"),
    ]
}
