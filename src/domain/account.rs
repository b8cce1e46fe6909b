use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Amount, PasswordHash};

/// Store-assigned identity of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(i64);

impl AccountId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A ledger subject. Mutated in place by every balance-changing operation,
/// never deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
    pub balance: Amount,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Returns true if the account holds at least `amount`.
    pub fn can_cover(&self, amount: Amount) -> bool {
        self.balance >= amount
    }
}

/// An account that has not been persisted yet; the store assigns its id.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: PasswordHash,
    pub balance: Amount,
    pub created_at: DateTime<Utc>,
}

impl NewAccount {
    /// A freshly registered account always opens with a zero balance.
    pub fn new(username: impl Into<String>, password_hash: PasswordHash) -> Self {
        Self {
            username: username.into(),
            password_hash,
            balance: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    pub fn into_account(self, id: AccountId) -> Account {
        Account {
            id,
            username: self.username,
            password_hash: self.password_hash,
            balance: self.balance,
            created_at: self.created_at,
        }
    }
}
