use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::{
    account::{Account, AccountId, Direction},
    transaction::{Transaction, TransactionId},
};

use super::{DuplicatePolicy, LedgerStore};

#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    policy: DuplicatePolicy,
    accounts: HashMap<AccountId, Account>,
    transactions: HashMap<TransactionId, Transaction>,
}

impl InMemoryLedgerStore {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn duplicate_policy(&self) -> DuplicatePolicy {
        self.policy
    }

    fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.get(id)
    }

    fn insert_account(&mut self, account: Account) -> Option<Account> {
        self.accounts.insert(account.id.clone(), account)
    }

    fn apply_balance(&mut self, account_id: &str, direction: Direction, amount: Decimal) {
        if let Some(acc) = self.accounts.get_mut(account_id) {
            if !acc.apply(direction, amount) {
                tracing::warn!(account_id, %direction, %amount, "Balance update skipped, it would overflow");
            }
        }
    }

    fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.get(id)
    }

    fn insert_transaction(&mut self, transaction: Transaction) -> Option<Transaction> {
        self.transactions.insert(transaction.id.clone(), transaction)
    }

    fn accounts(&self) -> Box<dyn Iterator<Item = &Account> + '_> {
        Box::new(self.accounts.values())
    }
}
