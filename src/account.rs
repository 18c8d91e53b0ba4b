use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::command::ValidationError;

pub type AccountId = String;

/// Side of the ledger. For an account it is the "natural" side, for an entry
/// it is the side the entry is posted to.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Debit => "debit",
            Direction::Credit => "credit",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ValidationError;

    /// Only the exact lowercase spellings are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debit" => Ok(Direction::Debit),
            "credit" => Ok(Direction::Credit),
            other => Err(ValidationError::InvalidDirection {
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: AccountId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub balance: Decimal,
    pub direction: Direction,
}

impl Account {
    /// Signed effect of an entry on this account: positive when the entry is
    /// posted on the account's natural side, negative otherwise.
    pub fn signed_amount(&self, direction: Direction, amount: Decimal) -> Decimal {
        if self.direction == direction {
            amount
        } else {
            -amount
        }
    }

    /// Posts the entry. Returns `false` and leaves the balance untouched if
    /// the result would overflow.
    pub fn apply(&mut self, direction: Direction, amount: Decimal) -> bool {
        match self
            .balance
            .checked_add(self.signed_amount(direction, amount))
        {
            Some(balance) => {
                self.balance = balance;
                true
            }
            None => false,
        }
    }
}
