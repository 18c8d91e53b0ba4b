use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    account::{Account, Direction},
    command::{
        NewAccount, ValidationError, parse_account_direction, parse_opening_balance, supplied_id,
    },
    transaction::{Transaction, generate_id},
};

pub mod in_memory;

/// What to do when a caller supplies an id that is already taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Replace the existing record (last write wins).
    #[default]
    Overwrite,
    /// Fail with [`ValidationError::DuplicateAccount`] or
    /// [`ValidationError::DuplicateTransaction`].
    Reject,
}

#[derive(Debug, Error)]
#[error("Unknown duplicate id policy `{0}`, expected `overwrite` or `reject`")]
pub struct UnknownPolicy(String);

impl FromStr for DuplicatePolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "reject" => Ok(Self::Reject),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

/// Authoritative state of the ledger: accounts and committed transactions.
///
/// NOTE: the in-memory implementation is the only one, but this is the
/// seam where a persistent store would plug in.
pub trait LedgerStore {
    fn duplicate_policy(&self) -> DuplicatePolicy;

    fn account(&self, id: &str) -> Option<&Account>;

    /// Inserts the account, returning the record it replaced, if any.
    fn insert_account(&mut self, account: Account) -> Option<Account>;

    /// Adds `amount` to the balance when `direction` is the account's natural
    /// side, subtracts it otherwise. Unknown accounts are ignored, and so is an
    /// update that would overflow the balance (the engine rejects those
    /// before commit).
    fn apply_balance(&mut self, account_id: &str, direction: Direction, amount: Decimal);

    fn transaction(&self, id: &str) -> Option<&Transaction>;

    /// Inserts the transaction, returning the record it replaced, if any.
    fn insert_transaction(&mut self, transaction: Transaction) -> Option<Transaction>;

    fn accounts(&self) -> Box<dyn Iterator<Item = &Account> + '_>;

    fn contains_account(&self, id: &str) -> bool {
        self.account(id).is_some()
    }

    fn create_account(&mut self, request: NewAccount) -> Result<Account, ValidationError> {
        let direction = parse_account_direction(request.direction.as_deref())?;
        let balance = parse_opening_balance(request.balance.as_ref())?;
        let id = match supplied_id(request.id.as_deref()) {
            Some(id) => {
                if self.duplicate_policy() == DuplicatePolicy::Reject && self.contains_account(id)
                {
                    return Err(ValidationError::DuplicateAccount { id: id.to_string() });
                }
                id.to_string()
            }
            None => generate_id(),
        };
        let account = Account {
            id,
            name: request.name,
            balance,
            direction,
        };
        if self.insert_account(account.clone()).is_some() {
            tracing::warn!(account_id = %account.id, "Account replaced by a new one with the same id");
        }
        tracing::debug!(account_id = %account.id, direction = %account.direction, "Account created");
        Ok(account)
    }
}
