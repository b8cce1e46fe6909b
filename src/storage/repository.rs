use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool};

use crate::domain::{
    Account, AccountId, NewAccount, NewTransaction, PasswordHash, Transaction, TransactionId,
    TransactionKind,
};

use super::{AccountStore, MIGRATION_001_INITIAL, Store, TransactionStore, UnitOfWork};

/// SQLite-backed store for accounts and their transactions.
///
/// The pool holds a single connection. SQLite admits one writer at a time, and
/// funnelling every unit of work through one connection serializes the
/// read-modify-write of balances without relying on busy retries.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    ///
    /// `acquire_timeout` bounds how long a caller waits for the connection
    /// while another unit of work holds it.
    pub async fn connect(database_url: &str, acquire_timeout: Duration) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str, acquire_timeout: Duration) -> Result<Self> {
        let repo = Self::connect(database_url, acquire_timeout).await?;
        repo.migrate().await?;
        Ok(repo)
    }
}

#[async_trait]
impl Store for Repository {
    type Unit = SqliteUnit;

    async fn begin(&self) -> Result<SqliteUnit> {
        let tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin database transaction")?;
        Ok(SqliteUnit { tx })
    }
}

/// A database transaction. Rolled back by sqlx when dropped uncommitted.
pub struct SqliteUnit {
    tx: sqlx::Transaction<'static, Sqlite>,
}

#[async_trait]
impl UnitOfWork for SqliteUnit {
    async fn commit(self) -> Result<()> {
        self.tx
            .commit()
            .await
            .context("Failed to commit database transaction")
    }
}

#[async_trait]
impl AccountStore for SqliteUnit {
    async fn find_account_by_username(&mut self, username: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, balance, created_at
            FROM accounts
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to fetch account by username")?;

        row.as_ref().map(row_to_account).transpose()
    }

    async fn find_account_by_id(&mut self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, balance, created_at
            FROM accounts
            WHERE id = ?
            "#,
        )
        .bind(id.get())
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to fetch account")?;

        row.as_ref().map(row_to_account).transpose()
    }

    async fn insert_account(&mut self, account: NewAccount) -> Result<Account> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (username, password_hash, balance, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&account.username)
        .bind(account.password_hash.as_str())
        .bind(account.balance.to_string())
        .bind(format_timestamp(account.created_at))
        .execute(&mut *self.tx)
        .await
        .context("Failed to save account")?;

        Ok(account.into_account(AccountId::new(result.last_insert_rowid())))
    }

    async fn update_account(&mut self, account: &Account) -> Result<()> {
        let result = sqlx::query("UPDATE accounts SET balance = ? WHERE id = ?")
            .bind(account.balance.to_string())
            .bind(account.id.get())
            .execute(&mut *self.tx)
            .await
            .context("Failed to update account")?;

        if result.rows_affected() == 0 {
            anyhow::bail!("Account {} does not exist", account.id);
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for SqliteUnit {
    async fn insert_transaction(&mut self, transaction: NewTransaction) -> Result<Transaction> {
        let result = sqlx::query(
            r#"
            INSERT INTO transactions (account_id, amount, kind, description, timestamp)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(transaction.account_id.get())
        .bind(transaction.amount.to_string())
        .bind(transaction.kind.as_str())
        .bind(&transaction.description)
        .bind(format_timestamp(transaction.timestamp))
        .execute(&mut *self.tx)
        .await
        .context("Failed to save transaction")?;

        Ok(transaction.into_transaction(TransactionId::new(result.last_insert_rowid())))
    }

    async fn find_transactions_by_account_id(
        &mut self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, account_id, amount, kind, description, timestamp
            FROM transactions
            WHERE account_id = ?
            ORDER BY id
            "#,
        )
        .bind(account_id.get())
        .fetch_all(&mut *self.tx)
        .await
        .context("Failed to list transactions for account")?;

        rows.iter().map(row_to_transaction).collect()
    }
}

/// Fixed-width RFC 3339 so stored timestamps also sort lexically.
fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid timestamp: {}", raw))?
        .with_timezone(&Utc))
}

fn parse_amount_column(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).with_context(|| format!("Invalid stored amount: {}", raw))
}

fn row_to_account(row: &SqliteRow) -> Result<Account> {
    let balance_str: String = row.get("balance");
    let created_at_str: String = row.get("created_at");
    let password_hash: String = row.get("password_hash");

    Ok(Account {
        id: AccountId::new(row.get("id")),
        username: row.get("username"),
        password_hash: PasswordHash::new_unchecked(password_hash),
        balance: parse_amount_column(&balance_str)?,
        created_at: parse_timestamp(&created_at_str)?,
    })
}

fn row_to_transaction(row: &SqliteRow) -> Result<Transaction> {
    let amount_str: String = row.get("amount");
    let kind_str: String = row.get("kind");
    let timestamp_str: String = row.get("timestamp");

    Ok(Transaction {
        id: TransactionId::new(row.get("id")),
        account_id: AccountId::new(row.get("account_id")),
        amount: parse_amount_column(&amount_str)?,
        kind: TransactionKind::from_str(&kind_str)
            .ok_or_else(|| anyhow::anyhow!("Invalid transaction kind: {}", kind_str))?,
        description: row.get("description"),
        timestamp: parse_timestamp(&timestamp_str)?,
    })
}
