use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{Account, AccountId, NewAccount, NewTransaction, Transaction, TransactionId};

use super::{AccountStore, Store, TransactionStore, UnitOfWork};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
    next_account_id: i64,
    next_transaction_id: i64,
}

/// In-process store. A unit of work holds the store lock for its whole
/// lifetime and edits a private copy that replaces the shared state on commit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Unit = MemoryUnit;

    async fn begin(&self) -> Result<MemoryUnit> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(MemoryUnit { guard, working })
    }
}

pub struct MemoryUnit {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl UnitOfWork for MemoryUnit {
    async fn commit(self) -> Result<()> {
        let MemoryUnit { mut guard, working } = self;
        *guard = working;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryUnit {
    async fn find_account_by_username(&mut self, username: &str) -> Result<Option<Account>> {
        Ok(self
            .working
            .accounts
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn find_account_by_id(&mut self, id: AccountId) -> Result<Option<Account>> {
        Ok(self.working.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn insert_account(&mut self, account: NewAccount) -> Result<Account> {
        if self
            .working
            .accounts
            .iter()
            .any(|a| a.username == account.username)
        {
            anyhow::bail!("Username already taken: {}", account.username);
        }

        self.working.next_account_id += 1;
        let account = account.into_account(AccountId::new(self.working.next_account_id));
        self.working.accounts.push(account.clone());
        Ok(account)
    }

    async fn update_account(&mut self, account: &Account) -> Result<()> {
        let stored = self
            .working
            .accounts
            .iter_mut()
            .find(|a| a.id == account.id)
            .ok_or_else(|| anyhow::anyhow!("Account {} does not exist", account.id))?;
        stored.balance = account.balance;
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for MemoryUnit {
    async fn insert_transaction(&mut self, transaction: NewTransaction) -> Result<Transaction> {
        if !self
            .working
            .accounts
            .iter()
            .any(|a| a.id == transaction.account_id)
        {
            anyhow::bail!("Account {} does not exist", transaction.account_id);
        }

        self.working.next_transaction_id += 1;
        let transaction =
            transaction.into_transaction(TransactionId::new(self.working.next_transaction_id));
        self.working.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn find_transactions_by_account_id(
        &mut self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>> {
        Ok(self
            .working
            .transactions
            .iter()
            .filter(|t| t.account_id == account_id)
            .cloned()
            .collect())
    }
}
