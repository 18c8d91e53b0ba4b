use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    account::Account,
    command::{NewAccount, NewTransaction, ValidationError},
    engine::TransactionEngine,
    store::{DuplicatePolicy, LedgerStore, in_memory::InMemoryLedgerStore},
    transaction::Transaction,
};

/// Cloneable handle to one ledger.
///
/// Every operation holds a single lock for its whole duration, so the
/// validate-then-commit pipeline of one transaction never interleaves with
/// another commit or with account creation.
#[derive(Debug)]
pub struct SharedLedger<S = InMemoryLedgerStore> {
    engine: Arc<Mutex<TransactionEngine<S>>>,
}

impl<S> Clone for SharedLedger<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl SharedLedger<InMemoryLedgerStore> {
    pub fn in_memory(policy: DuplicatePolicy) -> Self {
        Self::new(TransactionEngine::in_memory(policy))
    }
}

impl<S: LedgerStore> SharedLedger<S> {
    pub fn new(engine: TransactionEngine<S>) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    /// Committed state is never left half-written (writes only happen after
    /// validation), so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, TransactionEngine<S>> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_account(&self, request: NewAccount) -> Result<Account, ValidationError> {
        self.lock().create_account(request)
    }

    pub fn get_account(&self, id: &str) -> Option<Account> {
        self.lock().get_account(id).cloned()
    }

    pub fn create_transaction(
        &self,
        request: NewTransaction,
    ) -> Result<Transaction, ValidationError> {
        self.lock().create_transaction(request)
    }

    pub fn get_transaction(&self, id: &str) -> Option<Transaction> {
        self.lock().get_transaction(id).cloned()
    }

    /// Consistent snapshot of all accounts, sorted by id.
    pub fn accounts(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self.lock().store().accounts().cloned().collect();
        accounts.sort_by(|a, b| a.id.cmp(&b.id));
        accounts
    }
}
