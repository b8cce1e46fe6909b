//! Persistence seams used by the ledger service.
//!
//! Every read and write goes through a unit of work obtained from
//! [Store::begin]. A unit only becomes visible to others once
//! [UnitOfWork::commit] succeeds; dropping it without committing discards all
//! of its writes.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{Account, AccountId, NewAccount, NewTransaction, Transaction};

#[async_trait]
pub trait AccountStore: Send {
    async fn find_account_by_username(&mut self, username: &str) -> Result<Option<Account>>;

    async fn find_account_by_id(&mut self, id: AccountId) -> Result<Option<Account>>;

    /// Insert a new account; the store assigns its id.
    async fn insert_account(&mut self, account: NewAccount) -> Result<Account>;

    /// Persist the mutable state (balance) of an existing account.
    async fn update_account(&mut self, account: &Account) -> Result<()>;
}

#[async_trait]
pub trait TransactionStore: Send {
    /// Insert a new transaction record; the store assigns its id.
    async fn insert_transaction(&mut self, transaction: NewTransaction) -> Result<Transaction>;

    /// All records owned by `account_id`, in recording order.
    async fn find_transactions_by_account_id(
        &mut self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>>;
}

/// A scoped, atomic view over both stores.
#[async_trait]
pub trait UnitOfWork: AccountStore + TransactionStore {
    async fn commit(self) -> Result<()>;
}

#[async_trait]
pub trait Store: Send + Sync {
    type Unit: UnitOfWork;

    /// Open a unit of work. Units are serialized: while one is open, the
    /// balances it has read cannot change underneath it.
    async fn begin(&self) -> Result<Self::Unit>;
}
