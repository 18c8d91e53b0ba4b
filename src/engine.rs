use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::{
    account::{Account, Direction},
    command::{
        CheckedEntry, NewAccount, NewTransaction, ValidationError, check_entries, supplied_id,
    },
    store::{DuplicatePolicy, LedgerStore, in_memory::InMemoryLedgerStore},
    transaction::{LedgerEntry, Transaction, generate_id},
};

/// Largest accepted difference between the debit and credit sums (0.0001).
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// Validates proposed transactions against the store and commits them.
///
/// Nothing is written until every check has passed, so a rejected
/// transaction leaves no trace in the store.
#[derive(Debug, Default)]
pub struct TransactionEngine<S = InMemoryLedgerStore> {
    store: S,
}

impl TransactionEngine<InMemoryLedgerStore> {
    pub fn in_memory(policy: DuplicatePolicy) -> Self {
        Self::new(InMemoryLedgerStore::new(policy))
    }
}

impl<S: LedgerStore> TransactionEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn create_account(&mut self, request: NewAccount) -> Result<Account, ValidationError> {
        self.store.create_account(request)
    }

    pub fn get_account(&self, id: &str) -> Option<&Account> {
        self.store.account(id)
    }

    pub fn get_transaction(&self, id: &str) -> Option<&Transaction> {
        self.store.transaction(id)
    }

    pub fn create_transaction(
        &mut self,
        request: NewTransaction,
    ) -> Result<Transaction, ValidationError> {
        let entries = match self.validate(&request) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!(error = %err, "Transaction rejected");
                return Err(err);
            }
        };
        Ok(self.commit(request, entries))
    }

    /// Runs every check in order and returns the checked entries. Reads the
    /// store, never writes it.
    fn validate(&self, request: &NewTransaction) -> Result<Vec<CheckedEntry>, ValidationError> {
        let entries = check_entries(&request.entries)?;

        if let Some(missing) = entries
            .iter()
            .find(|e| !self.store.contains_account(&e.account_id))
        {
            return Err(ValidationError::AccountNotFound {
                id: missing.account_id.clone(),
            });
        }

        let debits = sum(&entries, Direction::Debit)?;
        let credits = sum(&entries, Direction::Credit)?;
        if (debits - credits).abs() > BALANCE_TOLERANCE {
            return Err(ValidationError::Unbalanced { debits, credits });
        }

        if let Some(id) = supplied_id(request.id.as_deref()) {
            if self.store.duplicate_policy() == DuplicatePolicy::Reject
                && self.store.transaction(id).is_some()
            {
                return Err(ValidationError::DuplicateTransaction { id: id.to_string() });
            }
        }

        self.check_projected_balances(&entries)?;
        Ok(entries)
    }

    /// Makes sure no account balance overflows once all entries are posted.
    fn check_projected_balances(&self, entries: &[CheckedEntry]) -> Result<(), ValidationError> {
        let mut projected: HashMap<&str, Decimal> = HashMap::new();
        for entry in entries {
            let Some(acc) = self.store.account(&entry.account_id) else {
                continue;
            };
            let balance = projected
                .entry(entry.account_id.as_str())
                .or_insert(acc.balance);
            *balance = balance
                .checked_add(acc.signed_amount(entry.direction, entry.amount))
                .ok_or_else(|| ValidationError::AmountOverflow {
                    id: entry.account_id.clone(),
                })?;
        }
        Ok(())
    }

    fn commit(&mut self, request: NewTransaction, entries: Vec<CheckedEntry>) -> Transaction {
        let transaction = Transaction {
            id: supplied_id(request.id.as_deref())
                .map(ToOwned::to_owned)
                .unwrap_or_else(generate_id),
            name: request.name,
            entries: entries.into_iter().map(LedgerEntry::from).collect(),
        };

        for entry in &transaction.entries {
            self.store
                .apply_balance(&entry.account_id, entry.direction, entry.amount);
        }

        if self.store.insert_transaction(transaction.clone()).is_some() {
            tracing::warn!(transaction_id = %transaction.id, "Transaction replaced by a new one with the same id");
        }
        tracing::debug!(
            transaction_id = %transaction.id,
            entries = transaction.entries.len(),
            "Transaction committed"
        );
        transaction
    }
}

fn sum(entries: &[CheckedEntry], direction: Direction) -> Result<Decimal, ValidationError> {
    entries
        .iter()
        .filter(|e| e.direction == direction)
        .try_fold(Decimal::ZERO, |total, e| {
            total
                .checked_add(e.amount)
                .ok_or_else(|| ValidationError::AmountOverflow {
                    id: e.account_id.clone(),
                })
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rust_decimal::prelude::FromPrimitive;

    use crate::command::EntryDraft;

    use super::*;

    fn dec(value: u32) -> Decimal {
        Decimal::from_u32(value).unwrap()
    }

    fn engine_with_accounts(policy: DuplicatePolicy) -> TransactionEngine {
        let mut engine = TransactionEngine::in_memory(policy);
        engine
            .create_account(NewAccount::new("debit").with_id("A"))
            .unwrap();
        engine
            .create_account(NewAccount::new("credit").with_id("B"))
            .unwrap();
        engine
    }

    fn balances(engine: &TransactionEngine) -> Vec<(String, Decimal)> {
        let mut balances: Vec<_> = engine
            .store()
            .accounts()
            .map(|acc| (acc.id.clone(), acc.balance))
            .collect();
        balances.sort();
        balances
    }

    #[test]
    fn balanced_transaction_updates_both_accounts() {
        let mut engine = engine_with_accounts(DuplicatePolicy::Overwrite);
        let tx = engine
            .create_transaction(
                NewTransaction::new(vec![
                    EntryDraft::new("A", "debit", dec(100)),
                    EntryDraft::new("B", "credit", dec(100)),
                ])
                .with_name("opening"),
            )
            .unwrap();

        assert_eq!(tx.entries.len(), 2);
        assert_ne!(tx.entries[0].id, tx.entries[1].id);
        assert_eq!(tx.name.as_deref(), Some("opening"));
        assert_eq!(engine.get_account("A").unwrap().balance, dec(100));
        assert_eq!(engine.get_account("B").unwrap().balance, dec(100));
        assert_eq!(engine.get_transaction(&tx.id), Some(&tx));
    }

    #[test]
    fn opposite_side_entries_decrease_balances() {
        let mut engine = engine_with_accounts(DuplicatePolicy::Overwrite);
        engine
            .create_transaction(NewTransaction::new(vec![
                EntryDraft::new("A", "credit", dec(40)),
                EntryDraft::new("B", "debit", dec(40)),
            ]))
            .unwrap();
        assert_eq!(engine.get_account("A").unwrap().balance, -dec(40));
        assert_eq!(engine.get_account("B").unwrap().balance, -dec(40));
    }

    #[test]
    fn unbalanced_transaction_changes_nothing() {
        let mut engine = engine_with_accounts(DuplicatePolicy::Overwrite);
        let before = balances(&engine);
        let err = engine
            .create_transaction(
                NewTransaction::new(vec![
                    EntryDraft::new("A", "debit", dec(100)),
                    EntryDraft::new("B", "credit", dec(99)),
                ])
                .with_id("t1"),
            )
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::Unbalanced {
                debits: dec(100),
                credits: dec(99)
            }
        );
        assert_eq!(balances(&engine), before);
        assert_eq!(engine.get_transaction("t1"), None);
        assert_eq!(engine.store().transaction_count(), 0);
    }

    #[test]
    fn balance_tolerance_value() {
        assert_eq!(BALANCE_TOLERANCE, Decimal::new(1, 4));
        assert_eq!(BALANCE_TOLERANCE.to_string(), "0.0001");
    }

    #[test]
    fn balance_tolerance_is_inclusive() {
        let mut engine = engine_with_accounts(DuplicatePolicy::Overwrite);
        engine
            .create_transaction(NewTransaction::new(vec![
                EntryDraft::new("A", "debit", Decimal::new(1_000_001, 4)),
                EntryDraft::new("B", "credit", dec(100)),
            ]))
            .unwrap();

        let err = engine
            .create_transaction(NewTransaction::new(vec![
                EntryDraft::new("A", "debit", Decimal::new(1_000_002, 4)),
                EntryDraft::new("B", "credit", dec(100)),
            ]))
            .unwrap_err();
        assert!(matches!(err, ValidationError::Unbalanced { .. }));
    }

    #[test]
    fn missing_account_is_rejected() {
        let mut engine = engine_with_accounts(DuplicatePolicy::Overwrite);
        let before = balances(&engine);
        let err = engine
            .create_transaction(NewTransaction::new(vec![
                EntryDraft::new("A", "debit", dec(10)),
                EntryDraft::new("nope", "credit", dec(10)),
            ]))
            .unwrap_err();
        assert_eq!(err.to_string(), "account does not exist: nope");
        assert_eq!(balances(&engine), before);
    }

    #[test]
    fn shape_errors_come_before_existence_errors() {
        let mut engine = engine_with_accounts(DuplicatePolicy::Overwrite);
        let err = engine
            .create_transaction(NewTransaction::new(vec![
                EntryDraft::new("nope", "debit", dec(10)),
                EntryDraft::new("B", "credit", Decimal::ZERO),
            ]))
            .unwrap_err();
        assert_eq!(err, ValidationError::NonPositiveAmount { index: 1 });
    }

    #[test]
    fn empty_transaction_is_rejected() {
        let mut engine = engine_with_accounts(DuplicatePolicy::Overwrite);
        let err = engine
            .create_transaction(NewTransaction::new(vec![]))
            .unwrap_err();
        assert_eq!(err, ValidationError::NoEntries);
    }

    #[test]
    fn single_entry_cannot_balance() {
        let mut engine = engine_with_accounts(DuplicatePolicy::Overwrite);
        let err = engine
            .create_transaction(NewTransaction::new(vec![EntryDraft::new(
                "A",
                "debit",
                dec(1),
            )]))
            .unwrap_err();
        assert!(matches!(err, ValidationError::Unbalanced { .. }));
    }

    #[test]
    fn generated_transaction_ids_are_unique() {
        let mut engine = engine_with_accounts(DuplicatePolicy::Overwrite);
        let ids: HashSet<String> = (0..50)
            .map(|_| {
                engine
                    .create_transaction(NewTransaction::new(vec![
                        EntryDraft::new("A", "debit", dec(1)),
                        EntryDraft::new("B", "credit", dec(1)),
                    ]))
                    .unwrap()
                    .id
            })
            .collect();
        assert_eq!(ids.len(), 50);
        assert_eq!(engine.store().transaction_count(), 50);
        assert_eq!(engine.get_account("A").unwrap().balance, dec(50));
    }

    #[test]
    fn duplicate_transaction_id_overwrites_but_keeps_both_effects() {
        let mut engine = engine_with_accounts(DuplicatePolicy::Overwrite);
        for amount in [dec(10), dec(20)] {
            engine
                .create_transaction(
                    NewTransaction::new(vec![
                        EntryDraft::new("A", "debit", amount),
                        EntryDraft::new("B", "credit", amount),
                    ])
                    .with_id("t"),
                )
                .unwrap();
        }
        assert_eq!(engine.store().transaction_count(), 1);
        assert_eq!(
            engine.get_transaction("t").unwrap().entries[0].amount,
            dec(20)
        );
        assert_eq!(engine.get_account("A").unwrap().balance, dec(30));
    }

    #[test]
    fn duplicate_transaction_id_rejected_by_policy() {
        let mut engine = engine_with_accounts(DuplicatePolicy::Reject);
        let request = NewTransaction::new(vec![
            EntryDraft::new("A", "debit", dec(10)),
            EntryDraft::new("B", "credit", dec(10)),
        ])
        .with_id("t");
        engine.create_transaction(request.clone()).unwrap();
        let err = engine.create_transaction(request).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicateTransaction {
                id: "t".to_string()
            }
        );
        assert_eq!(engine.get_account("A").unwrap().balance, dec(10));
    }

    #[test]
    fn overflowing_balance_is_rejected_before_commit() {
        let mut engine = TransactionEngine::in_memory(DuplicatePolicy::Overwrite);
        engine
            .create_account(
                NewAccount::new("debit")
                    .with_id("A")
                    .with_balance(Decimal::MAX),
            )
            .unwrap();
        engine
            .create_account(NewAccount::new("credit").with_id("B"))
            .unwrap();

        let err = engine
            .create_transaction(NewTransaction::new(vec![
                EntryDraft::new("B", "credit", dec(1)),
                EntryDraft::new("A", "debit", dec(1)),
            ]))
            .unwrap_err();
        assert_eq!(err, ValidationError::AmountOverflow { id: "A".to_string() });
        assert_eq!(engine.get_account("B").unwrap().balance, Decimal::ZERO);
        assert_eq!(engine.get_account("A").unwrap().balance, Decimal::MAX);
    }
}
