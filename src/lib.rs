/// Accounts and the sign convention used to post entries to them.
pub mod account;

/// Raw requests as callers send them, the shape checks run on them and
/// [`command::ValidationError`], the one error the ledger reports.
pub mod command;

/// Committed transactions and their entries.
pub mod transaction;

/// Ledger store interface, plus "in memory" implementation.
pub mod store;

/// Validates and commits transactions against a [`store::LedgerStore`].
pub mod engine;

/// Thread safe handle around the engine.
pub mod shared;

/// Request/response boundary used by the binary. Lives in the library so the
/// integration tests can drive it.
pub mod bin_utils;

pub use account::{Account, Direction};
pub use command::{EntryDraft, NewAccount, NewTransaction, ValidationError};
pub use engine::TransactionEngine;
pub use shared::SharedLedger;
pub use store::{DuplicatePolicy, LedgerStore};
pub use transaction::{LedgerEntry, Transaction};
