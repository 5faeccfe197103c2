use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type AccountId = String;
pub type TxId = String;

/// Account as held in the world state.
///
/// `bank` is fixed at creation; transfers only ever touch `balance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "ID")]
    pub id: AccountId,
    #[serde(rename = "Balance")]
    pub balance: Decimal,
    #[serde(rename = "Bank")]
    pub bank: String,
}

impl Account {
    pub fn new(id: impl Into<AccountId>, balance: Decimal, bank: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            balance,
            bank: bank.into(),
        }
    }

    /// Placeholder reported for a deleted version of `id`.
    pub fn tombstone(id: impl Into<AccountId>) -> Self {
        Self {
            id: id.into(),
            balance: Decimal::ZERO,
            bank: String::new(),
        }
    }

    /// Balance left after taking `amount` out, or `None` if it would go
    /// negative or out of range.
    pub fn remaining_after(&self, amount: Decimal) -> Option<Decimal> {
        self.balance
            .checked_sub(amount)
            .filter(|remaining| *remaining >= Decimal::ZERO)
    }

    /// Balance after adding `amount`, or `None` on overflow.
    pub fn credited_with(&self, amount: Decimal) -> Option<Decimal> {
        self.balance.checked_add(amount)
    }
}

/// One historical version of an account key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxRecord {
    #[serde(rename = "Record")]
    pub record: Account,
    #[serde(rename = "TxId")]
    pub tx_id: TxId,
    #[serde(rename = "Timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "IsDelete")]
    pub is_delete: bool,
}
