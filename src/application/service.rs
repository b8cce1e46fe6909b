use std::future::Future;
use std::sync::Arc;

use anyhow::anyhow;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use crate::config::LedgerConfig;
use crate::domain::{
    Account, AccountAudit, AccountId, Amount, NewAccount, NewTransaction, PasswordHash, Principal,
    Transaction, audit_account,
};
use crate::storage::{AccountStore, Repository, Store, TransactionStore, UnitOfWork};

use super::{AppError, BcryptHasher, CredentialHasher};

/// Application service providing the ledger operations.
/// This is the primary interface for any client (CLI, API, TUI, etc.).
///
/// Every operation runs inside one unit of work bounded by the configured
/// store timeout. Failures before commit leave the store untouched.
pub struct LedgerService<S = Repository, H = BcryptHasher> {
    store: S,
    hasher: Arc<H>,
    config: LedgerConfig,
}

/// Result of a transfer between two accounts
#[derive(Debug, Clone)]
pub struct TransferReceipt {
    pub sender: Account,
    pub receiver: Account,
    pub debit: Transaction,
    pub credit: Transaction,
}

impl LedgerService<Repository, BcryptHasher> {
    /// Initialize a new database at the configured path.
    pub async fn init(config: LedgerConfig) -> Result<Self, AppError> {
        let repo = Repository::init(&config.create_database_url(), config.store_timeout).await?;
        let hasher = BcryptHasher::new(config.bcrypt_cost);
        Ok(Self::new(repo, hasher, config))
    }

    /// Connect to an existing database.
    pub async fn connect(config: LedgerConfig) -> Result<Self, AppError> {
        let repo = Repository::connect(&config.database_url(), config.store_timeout).await?;
        let hasher = BcryptHasher::new(config.bcrypt_cost);
        Ok(Self::new(repo, hasher, config))
    }
}

impl<S, H> LedgerService<S, H>
where
    S: Store,
    H: CredentialHasher,
{
    /// Create a new ledger service over the given store and hasher.
    pub fn new(store: S, hasher: H, config: LedgerConfig) -> Self {
        Self {
            store,
            hasher: Arc::new(hasher),
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ========================
    // Account operations
    // ========================

    /// Get an account by username.
    #[instrument(skip(self))]
    pub async fn find_account_by_username(&self, username: &str) -> Result<Account, AppError> {
        self.bounded(self.lookup(username)).await
    }

    /// Register a new account with a zero balance.
    #[instrument(skip(self, raw_password))]
    pub async fn register_account(
        &self,
        username: &str,
        raw_password: &str,
    ) -> Result<Account, AppError> {
        // Hash before opening the unit so the store is not held during bcrypt.
        let raw_password = raw_password.to_owned();
        let password_hash = self
            .off_runtime(move |hasher| hasher.hash(&raw_password))
            .await?;
        let account = self
            .bounded(self.insert_new_account(username, password_hash))
            .await?;

        info!(account_id = %account.id, "registered account");
        Ok(account)
    }

    // ========================
    // Balance operations
    // ========================

    /// Pay `amount` into the account.
    #[instrument(skip(self, account), fields(username = %account.username))]
    pub async fn deposit(&self, account: &Account, amount: Amount) -> Result<Account, AppError> {
        ensure_positive(amount)?;
        let updated = self.bounded(self.apply_deposit(account, amount)).await?;

        info!(balance = %updated.balance, "deposit recorded");
        Ok(updated)
    }

    /// Take `amount` out of the account.
    #[instrument(skip(self, account), fields(username = %account.username))]
    pub async fn withdraw(&self, account: &Account, amount: Amount) -> Result<Account, AppError> {
        ensure_positive(amount)?;
        let updated = self.bounded(self.apply_withdrawal(account, amount)).await?;

        info!(balance = %updated.balance, "withdrawal recorded");
        Ok(updated)
    }

    /// Move `amount` from `sender` to the account named `receiver_username`.
    ///
    /// Both balance updates and both transaction records commit together. The
    /// debit record is filed against the sender and the credit record against
    /// the receiver.
    #[instrument(skip(self, sender), fields(sender = %sender.username))]
    pub async fn transfer_amount(
        &self,
        sender: &Account,
        receiver_username: &str,
        amount: Amount,
    ) -> Result<TransferReceipt, AppError> {
        ensure_positive(amount)?;
        let receipt = self
            .bounded(self.apply_transfer(sender, receiver_username, amount))
            .await?;

        info!(receiver = %receipt.receiver.username, "transfer recorded");
        Ok(receipt)
    }

    // ========================
    // History and audit
    // ========================

    /// All transactions owned by the account, oldest first.
    #[instrument(skip(self, account), fields(username = %account.username))]
    pub async fn get_transaction_history(
        &self,
        account: &Account,
    ) -> Result<Vec<Transaction>, AppError> {
        self.bounded(self.history_for(account.id)).await
    }

    /// An account and its full history, read together in one unit so the
    /// balance always matches the transactions.
    #[instrument(skip(self))]
    pub async fn find_account_with_history(
        &self,
        username: &str,
    ) -> Result<(Account, Vec<Transaction>), AppError> {
        self.bounded(self.snapshot(username)).await
    }

    /// Replay an account's history and compare it with the stored balance.
    #[instrument(skip(self))]
    pub async fn audit_account(&self, username: &str) -> Result<AccountAudit, AppError> {
        let (account, transactions) = self.find_account_with_history(username).await?;
        let audit = audit_account(&account, &transactions);

        if !audit.is_consistent() {
            warn!(
                stored = %audit.stored_balance,
                replayed = %audit.replayed_balance,
                "account balance does not match its history"
            );
        }
        Ok(audit)
    }

    // ========================
    // Authentication
    // ========================

    /// Build the principal an authentication layer needs for `username`.
    #[instrument(skip(self))]
    pub async fn authentication_principal_for(
        &self,
        username: &str,
    ) -> Result<Principal, AppError> {
        let account = self.find_account_by_username(username).await?;
        Ok(Principal::from(&account))
    }

    /// Check a username/password pair and return the matching principal.
    ///
    /// Unknown users and wrong passwords are indistinguishable to the caller.
    #[instrument(skip(self, raw_password))]
    pub async fn authenticate(
        &self,
        username: &str,
        raw_password: &str,
    ) -> Result<Principal, AppError> {
        let principal = match self.authentication_principal_for(username).await {
            Ok(principal) => principal,
            Err(AppError::NotFound(_)) => return Err(AppError::InvalidCredentials),
            Err(e) => return Err(e),
        };

        let raw_password = raw_password.to_owned();
        let stored_hash = principal.password_hash.clone();
        let accepted = self
            .off_runtime(move |hasher| hasher.verify(&raw_password, &stored_hash))
            .await?;

        if accepted {
            debug!("credentials accepted");
            Ok(principal)
        } else {
            debug!("credentials rejected");
            Err(AppError::InvalidCredentials)
        }
    }

    // ========================
    // Units of work
    // ========================

    async fn lookup(&self, username: &str) -> Result<Account, AppError> {
        let mut unit = self.store.begin().await?;
        unit.find_account_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(username.to_string()))
    }

    async fn insert_new_account(
        &self,
        username: &str,
        password_hash: PasswordHash,
    ) -> Result<Account, AppError> {
        let mut unit = self.store.begin().await?;
        if unit.find_account_by_username(username).await?.is_some() {
            return Err(AppError::AlreadyExists(username.to_string()));
        }

        let account = unit
            .insert_account(NewAccount::new(username, password_hash))
            .await?;
        unit.commit().await?;
        Ok(account)
    }

    async fn apply_deposit(&self, account: &Account, amount: Amount) -> Result<Account, AppError> {
        let mut unit = self.store.begin().await?;
        let mut current = reload(&mut unit, account).await?;

        current.balance = credited(&current, amount)?;
        unit.update_account(&current).await?;
        unit.insert_transaction(NewTransaction::deposit(current.id, amount)?)
            .await?;
        unit.commit().await?;
        Ok(current)
    }

    async fn apply_withdrawal(
        &self,
        account: &Account,
        amount: Amount,
    ) -> Result<Account, AppError> {
        let mut unit = self.store.begin().await?;
        let mut current = reload(&mut unit, account).await?;

        current.balance = debited(&current, amount)?;
        unit.update_account(&current).await?;
        unit.insert_transaction(NewTransaction::withdrawal(current.id, amount)?)
            .await?;
        unit.commit().await?;
        Ok(current)
    }

    async fn apply_transfer(
        &self,
        sender: &Account,
        receiver_username: &str,
        amount: Amount,
    ) -> Result<TransferReceipt, AppError> {
        let mut unit = self.store.begin().await?;
        let mut sender = reload(&mut unit, sender).await?;
        let sender_balance = debited(&sender, amount)?;

        let mut receiver = unit
            .find_account_by_username(receiver_username)
            .await?
            .ok_or_else(|| AppError::NotFound(receiver_username.to_string()))?;
        if receiver.id == sender.id {
            return Err(AppError::SelfTransfer(sender.username));
        }

        let receiver_balance = credited(&receiver, amount)?;

        sender.balance = sender_balance;
        unit.update_account(&sender).await?;

        receiver.balance = receiver_balance;
        unit.update_account(&receiver).await?;

        let debit = unit
            .insert_transaction(NewTransaction::transfer_out(
                sender.id,
                &receiver.username,
                amount,
            )?)
            .await?;
        let credit = unit
            .insert_transaction(NewTransaction::transfer_in(
                receiver.id,
                &sender.username,
                amount,
            )?)
            .await?;

        unit.commit().await?;
        Ok(TransferReceipt {
            sender,
            receiver,
            debit,
            credit,
        })
    }

    async fn history_for(&self, account_id: AccountId) -> Result<Vec<Transaction>, AppError> {
        let mut unit = self.store.begin().await?;
        Ok(unit.find_transactions_by_account_id(account_id).await?)
    }

    async fn snapshot(&self, username: &str) -> Result<(Account, Vec<Transaction>), AppError> {
        let mut unit = self.store.begin().await?;
        let account = unit
            .find_account_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(username.to_string()))?;
        let transactions = unit.find_transactions_by_account_id(account.id).await?;
        Ok((account, transactions))
    }

    /// Run a hasher call on the blocking pool.
    async fn off_runtime<T, F>(&self, work: F) -> Result<T, AppError>
    where
        F: FnOnce(&H) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || work(&*hasher))
            .await
            .map_err(|e| AppError::Hashing(e.to_string()))?
    }

    /// Run one unit of work under the store timeout.
    async fn bounded<T, F>(&self, work: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        let timeout = self.config.store_timeout;
        match tokio::time::timeout(timeout, work).await {
            Ok(result) => result,
            Err(_) => {
                warn!(?timeout, "store did not respond in time");
                Err(AppError::StoreUnavailable(anyhow!(
                    "store did not respond within {:?}",
                    timeout
                )))
            }
        }
    }
}

/// Load the current state of `account` inside the unit, ignoring whatever
/// balance the caller's copy carries.
async fn reload<U: AccountStore>(unit: &mut U, account: &Account) -> Result<Account, AppError> {
    unit.find_account_by_id(account.id)
        .await?
        .ok_or_else(|| AppError::NotFound(account.username.clone()))
}

fn ensure_positive(amount: Amount) -> Result<(), AppError> {
    if amount <= Decimal::ZERO {
        return Err(AppError::InvalidAmount(amount));
    }
    Ok(())
}

/// Balance after paying `amount` in.
fn credited(account: &Account, amount: Amount) -> Result<Amount, AppError> {
    account
        .balance
        .checked_add(amount)
        .ok_or_else(|| AppError::AmountOverflow(account.username.clone()))
}

/// Balance after taking `amount` out, refusing to go below zero.
fn debited(account: &Account, amount: Amount) -> Result<Amount, AppError> {
    if !account.can_cover(amount) {
        return Err(AppError::InsufficientFunds {
            username: account.username.clone(),
            balance: account.balance,
            requested: amount,
        });
    }
    account
        .balance
        .checked_sub(amount)
        .ok_or_else(|| AppError::AmountOverflow(account.username.clone()))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::TransactionKind;
    use crate::storage::{MemoryStore, MemoryUnit};

    /// Memory store whose units fail to record the credit side of a transfer,
    /// after the sender and receiver balances have already been written.
    #[derive(Clone, Default)]
    struct CreditFailingStore {
        inner: MemoryStore,
    }

    struct CreditFailingUnit(MemoryUnit);

    #[async_trait]
    impl Store for CreditFailingStore {
        type Unit = CreditFailingUnit;

        async fn begin(&self) -> anyhow::Result<CreditFailingUnit> {
            Ok(CreditFailingUnit(self.inner.begin().await?))
        }
    }

    #[async_trait]
    impl UnitOfWork for CreditFailingUnit {
        async fn commit(self) -> anyhow::Result<()> {
            self.0.commit().await
        }
    }

    #[async_trait]
    impl AccountStore for CreditFailingUnit {
        async fn find_account_by_username(
            &mut self,
            username: &str,
        ) -> anyhow::Result<Option<Account>> {
            self.0.find_account_by_username(username).await
        }

        async fn find_account_by_id(&mut self, id: AccountId) -> anyhow::Result<Option<Account>> {
            self.0.find_account_by_id(id).await
        }

        async fn insert_account(&mut self, account: NewAccount) -> anyhow::Result<Account> {
            self.0.insert_account(account).await
        }

        async fn update_account(&mut self, account: &Account) -> anyhow::Result<()> {
            self.0.update_account(account).await
        }
    }

    #[async_trait]
    impl TransactionStore for CreditFailingUnit {
        async fn insert_transaction(
            &mut self,
            transaction: NewTransaction,
        ) -> anyhow::Result<Transaction> {
            if transaction.kind == TransactionKind::TransferIn {
                anyhow::bail!("disk I/O error");
            }
            self.0.insert_transaction(transaction).await
        }

        async fn find_transactions_by_account_id(
            &mut self,
            account_id: AccountId,
        ) -> anyhow::Result<Vec<Transaction>> {
            self.0.find_transactions_by_account_id(account_id).await
        }
    }

    fn service() -> LedgerService<MemoryStore, BcryptHasher> {
        service_with(MemoryStore::new(), Duration::from_secs(5))
    }

    fn service_with(
        store: MemoryStore,
        timeout: Duration,
    ) -> LedgerService<MemoryStore, BcryptHasher> {
        let config = LedgerConfig::default()
            .with_bcrypt_cost(4)
            .with_store_timeout(timeout);
        LedgerService::new(store, BcryptHasher::new(4), config)
    }

    fn amount(s: &str) -> Amount {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_register_starts_at_zero_and_hashes_password() {
        let service = service();

        let alice = service.register_account("alice", "pw1").await.unwrap();

        assert_eq!(alice.balance, Decimal::ZERO);
        assert_ne!(alice.password_hash.as_str(), "pw1");
        assert_eq!(
            service.find_account_by_username("alice").await.unwrap().id,
            alice.id
        );
    }

    #[tokio::test]
    async fn test_register_twice_fails() {
        let service = service();
        service.register_account("alice", "pw1").await.unwrap();

        let err = service.register_account("alice", "other").await.unwrap_err();

        assert!(matches!(err, AppError::AlreadyExists(name) if name == "alice"));
    }

    #[tokio::test]
    async fn test_find_unknown_account() {
        let err = service().find_account_by_username("nobody").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_deposit_uses_stored_balance_not_callers_copy() {
        let service = service();
        let stale = service.register_account("alice", "pw1").await.unwrap();

        service.deposit(&stale, amount("10.00")).await.unwrap();
        // `stale` still says 0.00; the second deposit must build on 10.00
        let updated = service.deposit(&stale, amount("5.00")).await.unwrap();

        assert_eq!(updated.balance, amount("15.00"));
    }

    #[tokio::test]
    async fn test_non_positive_amounts_rejected() {
        let service = service();
        let alice = service.register_account("alice", "pw1").await.unwrap();
        service.register_account("bob", "pw2").await.unwrap();

        for bad in [Decimal::ZERO, amount("-1.00")] {
            assert!(matches!(
                service.deposit(&alice, bad).await,
                Err(AppError::InvalidAmount(_))
            ));
            assert!(matches!(
                service.withdraw(&alice, bad).await,
                Err(AppError::InvalidAmount(_))
            ));
            assert!(matches!(
                service.transfer_amount(&alice, "bob", bad).await,
                Err(AppError::InvalidAmount(_))
            ));
        }

        let history = service.get_transaction_history(&alice).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_balance_overflow_is_an_error() {
        let service = service();
        let alice = service.register_account("alice", "pw1").await.unwrap();
        let bob = service.register_account("bob", "pw2").await.unwrap();
        service.deposit(&alice, Decimal::MAX).await.unwrap();
        service.deposit(&bob, Decimal::ONE).await.unwrap();

        let err = service.deposit(&alice, Decimal::ONE).await.unwrap_err();
        assert!(matches!(err, AppError::AmountOverflow(ref name) if name == "alice"));

        let err = service
            .transfer_amount(&bob, "alice", Decimal::ONE)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AmountOverflow(_)));

        let alice = service.find_account_by_username("alice").await.unwrap();
        let bob = service.find_account_by_username("bob").await.unwrap();
        assert_eq!(alice.balance, Decimal::MAX);
        assert_eq!(bob.balance, Decimal::ONE);
        assert_eq!(service.get_transaction_history(&alice).await.unwrap().len(), 1);
        assert_eq!(service.get_transaction_history(&bob).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sub_cent_amounts_reported_exactly() {
        let service = service();
        let alice = service.register_account("alice", "pw1").await.unwrap();
        service.deposit(&alice, amount("0.001")).await.unwrap();
        service.withdraw(&alice, amount("0.001")).await.unwrap();

        let history = service.get_transaction_history(&alice).await.unwrap();
        assert_eq!(history[1].description, "Withdrawn an amount of 0.001");

        let err = service.withdraw(&alice, amount("0.004")).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Insufficient balance for alice: current balance is 0.000, requested 0.004"
        );
    }

    #[tokio::test]
    async fn test_failed_credit_rolls_back_whole_transfer() {
        let config = LedgerConfig::default().with_bcrypt_cost(4);
        let service =
            LedgerService::new(CreditFailingStore::default(), BcryptHasher::new(4), config);
        let alice = service.register_account("alice", "pw1").await.unwrap();
        let bob = service.register_account("bob", "pw2").await.unwrap();
        let alice = service.deposit(&alice, amount("70.00")).await.unwrap();

        let err = service
            .transfer_amount(&alice, "bob", amount("50.00"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::StoreUnavailable(_)));
        let alice = service.find_account_by_username("alice").await.unwrap();
        let bob = service.find_account_by_username("bob").await.unwrap();
        assert_eq!(alice.balance, amount("70.00"));
        assert_eq!(bob.balance, Decimal::ZERO);
        assert_eq!(service.get_transaction_history(&alice).await.unwrap().len(), 1);
        assert!(service.get_transaction_history(&bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_account_with_history_is_consistent() {
        let service = service();
        let alice = service.register_account("alice", "pw1").await.unwrap();
        let alice = service.deposit(&alice, amount("100.00")).await.unwrap();
        service.withdraw(&alice, amount("30.00")).await.unwrap();

        let (account, transactions) = service.find_account_with_history("alice").await.unwrap();

        assert_eq!(account.balance, amount("70.00"));
        assert_eq!(transactions.len(), 2);
        assert_eq!(crate::domain::replay_balance(&transactions), account.balance);
        assert!(matches!(
            service.find_account_with_history("nobody").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_hashing_leaves_runtime_free() {
        let config = LedgerConfig::default().with_bcrypt_cost(10);
        let service = Arc::new(LedgerService::new(
            MemoryStore::new(),
            BcryptHasher::new(10),
            config,
        ));

        let registering = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.register_account("alice", "pw1").await })
        };
        // Single-threaded runtime: this timer only fires on time if bcrypt is
        // running elsewhere.
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(!registering.is_finished());

        let alice = registering.await.unwrap().unwrap();
        assert_eq!(alice.username, "alice");
    }

    #[tokio::test]
    async fn test_withdraw_overdraft_leaves_balance() {
        let service = service();
        let alice = service.register_account("alice", "pw1").await.unwrap();
        let alice = service.deposit(&alice, amount("20.00")).await.unwrap();

        let err = service.withdraw(&alice, amount("20.01")).await.unwrap_err();

        match err {
            AppError::InsufficientFunds {
                balance, requested, ..
            } => {
                assert_eq!(balance, amount("20.00"));
                assert_eq!(requested, amount("20.01"));
            }
            other => panic!("unexpected error: {other}"),
        }
        let alice = service.find_account_by_username("alice").await.unwrap();
        assert_eq!(alice.balance, amount("20.00"));
        assert_eq!(service.get_transaction_history(&alice).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_transfer_files_credit_against_receiver() {
        let service = service();
        let alice = service.register_account("alice", "pw1").await.unwrap();
        let bob = service.register_account("bob", "pw2").await.unwrap();
        let alice = service.deposit(&alice, amount("70.00")).await.unwrap();

        let receipt = service
            .transfer_amount(&alice, "bob", amount("50.00"))
            .await
            .unwrap();

        assert_eq!(receipt.sender.balance, amount("20.00"));
        assert_eq!(receipt.receiver.balance, amount("50.00"));
        assert_eq!(receipt.debit.account_id, alice.id);
        assert_eq!(receipt.debit.kind, TransactionKind::TransferOut);
        assert_eq!(receipt.credit.account_id, bob.id);
        assert_eq!(receipt.credit.kind, TransactionKind::TransferIn);
    }

    #[tokio::test]
    async fn test_transfer_checks_funds_before_receiver() {
        let service = service();
        let alice = service.register_account("alice", "pw1").await.unwrap();

        let err = service
            .transfer_amount(&alice, "nobody", amount("1.00"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InsufficientFunds { .. }));
    }

    #[tokio::test]
    async fn test_transfer_to_self_rejected() {
        let service = service();
        let alice = service.register_account("alice", "pw1").await.unwrap();
        let alice = service.deposit(&alice, amount("10.00")).await.unwrap();

        let err = service
            .transfer_amount(&alice, "alice", amount("5.00"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::SelfTransfer(_)));
        let alice = service.find_account_by_username("alice").await.unwrap();
        assert_eq!(alice.balance, amount("10.00"));
    }

    #[tokio::test]
    async fn test_held_store_times_out() {
        let store = MemoryStore::new();
        let service = service_with(store.clone(), Duration::from_millis(50));
        let alice = service.register_account("alice", "pw1").await.unwrap();

        let _held = store.begin().await.unwrap();
        let err = service.deposit(&alice, amount("1.00")).await.unwrap_err();

        assert!(matches!(err, AppError::StoreUnavailable(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_authenticate() {
        let service = service();
        service.register_account("alice", "pw1").await.unwrap();

        let principal = service.authenticate("alice", "pw1").await.unwrap();
        assert_eq!(principal.username, "alice");

        assert!(matches!(
            service.authenticate("alice", "wrong").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            service.authenticate("nobody", "pw1").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_audit_after_mixed_operations() {
        let service = service();
        let alice = service.register_account("alice", "pw1").await.unwrap();
        service.register_account("bob", "pw2").await.unwrap();
        service.deposit(&alice, amount("100.00")).await.unwrap();
        service.withdraw(&alice, amount("30.00")).await.unwrap();
        service
            .transfer_amount(&alice, "bob", amount("50.00"))
            .await
            .unwrap();

        let alice_audit = service.audit_account("alice").await.unwrap();
        let bob_audit = service.audit_account("bob").await.unwrap();

        assert!(alice_audit.is_consistent());
        assert_eq!(alice_audit.replayed_balance, amount("20.00"));
        assert!(bob_audit.is_consistent());
        assert_eq!(bob_audit.replayed_balance, amount("50.00"));
    }
}
