use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use crate::account::{AccountId, Direction};

/// Money value as received. Only JSON numbers become [`RawAmount::Number`],
/// anything else (strings, booleans, objects) is kept so the ledger rules can
/// reject it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawAmount {
    Number(Decimal),
    Other(Value),
}

impl RawAmount {
    pub fn number(&self) -> Option<Decimal> {
        match self {
            RawAmount::Number(value) => Some(*value),
            RawAmount::Other(_) => None,
        }
    }
}

impl From<Decimal> for RawAmount {
    fn from(value: Decimal) -> Self {
        RawAmount::Number(value)
    }
}

impl<'de> Deserialize<'de> for RawAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let text = match value {
            Value::Number(ref number) => number.to_string(),
            other => return Ok(RawAmount::Other(other)),
        };
        // 1e30 style numbers need the scientific parser
        match text
            .parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(&text))
        {
            Ok(number) => Ok(RawAmount::Number(number)),
            Err(_) => Ok(RawAmount::Other(value)),
        }
    }
}

/// Request to open an account. Fields are kept raw so that bad input is
/// rejected by the ledger rules with a [`ValidationError`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAccount {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub balance: Option<RawAmount>,
    #[serde(default)]
    pub direction: Option<String>,
}

impl NewAccount {
    pub fn new(direction: &str) -> Self {
        Self {
            direction: Some(direction.to_string()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = Some(balance.into());
        self
    }
}

/// Proposed entry. Any caller-supplied `id` is dropped during deserialization,
/// entry ids are always generated on commit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryDraft {
    #[serde(default)]
    pub account_id: Option<AccountId>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub amount: Option<RawAmount>,
}

impl EntryDraft {
    pub fn new(account_id: &str, direction: &str, amount: Decimal) -> Self {
        Self {
            account_id: Some(account_id.to_string()),
            direction: Some(direction.to_string()),
            amount: Some(amount.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTransaction {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub entries: Vec<EntryDraft>,
}

impl NewTransaction {
    pub fn new(entries: Vec<EntryDraft>) -> Self {
        Self {
            entries,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

/// Entry that passed the shape check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedEntry {
    pub account_id: AccountId,
    pub direction: Direction,
    pub amount: Decimal,
}

/// The only error the ledger returns. Every variant is caused by caller input
/// and its message is meant to be shown to the caller as is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("direction must be either 'debit' or 'credit', got '{value}'")]
    InvalidDirection { value: String },
    #[error("direction is required")]
    MissingDirection,
    #[error("no entries")]
    NoEntries,
    #[error("entry {index} is missing account_id")]
    MissingAccountId { index: usize },
    #[error("entry {index} direction must be either 'debit' or 'credit', got '{value}'")]
    InvalidEntryDirection { index: usize, value: String },
    #[error("balance must be a number")]
    InvalidBalance,
    #[error("entry {index} amount must be a positive number")]
    NonPositiveAmount { index: usize },
    #[error("account does not exist: {id}")]
    AccountNotFound { id: AccountId },
    #[error("entries do not balance (debits {debits}, credits {credits})")]
    Unbalanced { debits: Decimal, credits: Decimal },
    #[error("amount overflow while posting to account {id}")]
    AmountOverflow { id: AccountId },
    #[error("account already exists: {id}")]
    DuplicateAccount { id: AccountId },
    #[error("transaction already exists: {id}")]
    DuplicateTransaction { id: String },
}

/// Parses the direction of a new account.
pub fn parse_account_direction(direction: Option<&str>) -> Result<Direction, ValidationError> {
    direction
        .ok_or(ValidationError::MissingDirection)?
        .parse()
}

/// Shape check for a whole entry list. Stops at the first violation.
pub fn check_entries(entries: &[EntryDraft]) -> Result<Vec<CheckedEntry>, ValidationError> {
    if entries.is_empty() {
        return Err(ValidationError::NoEntries);
    }
    entries
        .iter()
        .enumerate()
        .map(|(index, draft)| check_entry(index, draft))
        .collect()
}

fn check_entry(index: usize, draft: &EntryDraft) -> Result<CheckedEntry, ValidationError> {
    let account_id = match draft.account_id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return Err(ValidationError::MissingAccountId { index }),
    };
    let raw_direction = draft.direction.as_deref().unwrap_or_default();
    let direction = raw_direction
        .parse::<Direction>()
        .map_err(|_| ValidationError::InvalidEntryDirection {
            index,
            value: raw_direction.to_string(),
        })?;
    let amount = match draft.amount.as_ref().and_then(RawAmount::number) {
        Some(amount) if amount > Decimal::ZERO => amount,
        _ => return Err(ValidationError::NonPositiveAmount { index }),
    };
    Ok(CheckedEntry {
        account_id,
        direction,
        amount,
    })
}

/// Opening balance of a new account, zero when omitted.
pub fn parse_opening_balance(balance: Option<&RawAmount>) -> Result<Decimal, ValidationError> {
    match balance {
        None => Ok(Decimal::ZERO),
        Some(raw) => raw.number().ok_or(ValidationError::InvalidBalance),
    }
}

/// Treats an empty supplied id the same as a missing one.
pub(crate) fn supplied_id(id: Option<&str>) -> Option<&str> {
    id.filter(|id| !id.is_empty())
}
