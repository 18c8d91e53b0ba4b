use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    account::{AccountId, Direction},
    command::CheckedEntry,
};

pub type TransactionId = String;
pub type EntryId = String;

/// Fresh random identifier for accounts, transactions and entries.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub account_id: AccountId,
    pub direction: Direction,
    pub amount: Decimal,
}

impl From<CheckedEntry> for LedgerEntry {
    fn from(entry: CheckedEntry) -> Self {
        Self {
            id: generate_id(),
            account_id: entry.account_id,
            direction: entry.direction,
            amount: entry.amount,
        }
    }
}

/// Committed, balanced transaction. Owns its entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub entries: Vec<LedgerEntry>,
}
