use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Amount, DEFAULT_CURRENCY};

/// Top-level status the payout partner returns for an accepted disbursement.
pub const PARTNER_SUCCESS_STATUS: &str = "ok";

/// Bank account a disbursement is paid into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationAccount {
    pub account_bank_code: String,
    pub account_no: String,
    pub account_holder_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutAmount {
    pub total: Amount,
    pub currency: String,
}

/// Body of a create-disbursement call to the payout partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisbursementRequest {
    pub reference_id: String,
    pub account: DestinationAccount,
    pub amount: PayoutAmount,
}

impl DisbursementRequest {
    /// Build a request for `total` in the default currency with a fresh reference id.
    pub fn new(account: DestinationAccount, total: Amount) -> Self {
        Self {
            reference_id: new_reference_id(),
            account,
            amount: PayoutAmount {
                total,
                currency: DEFAULT_CURRENCY.to_string(),
            },
        }
    }

    /// Fill in the default currency if the caller left it blank.
    pub fn with_default_currency(mut self) -> Self {
        if self.amount.currency.trim().is_empty() {
            self.amount.currency = DEFAULT_CURRENCY.to_string();
        }
        self
    }
}

/// Reference ids are unique per workflow invocation, so a retried disbursement
/// is a new payout as far as the partner is concerned.
pub fn new_reference_id() -> String {
    format!("disb-{}", Uuid::new_v4())
}

/// Response of a create-disbursement call.
///
/// Only `status` is required; partners answering a failure often omit the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisbursementResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<DisbursementData>,
}

impl DisbursementResponse {
    pub fn is_success(&self) -> bool {
        self.status == PARTNER_SUCCESS_STATUS
    }

    /// Partner-assigned transaction id, if the partner sent one.
    pub fn partner_id(&self) -> Option<&str> {
        self.data
            .as_ref()
            .map(|data| data.id.as_str())
            .filter(|id| !id.is_empty())
    }
}

/// Partner's record of the disbursement, echoing the request fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisbursementData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub reference_id: String,
    #[serde(default)]
    pub account: Option<DestinationAccount>,
    #[serde(default)]
    pub amount: Option<PayoutAmount>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
