use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountId, Amount, format_amount};

/// Store-assigned identity of a transaction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(i64);

impl TransactionId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money paid into the account
    Deposit,
    /// Money taken out of the account
    Withdrawal,
    /// Debit side of a transfer to another account
    TransferOut,
    /// Credit side of a transfer from another account
    TransferIn,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::TransferOut => "transfer_out",
            TransactionKind::TransferIn => "transfer_in",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deposit" => Some(TransactionKind::Deposit),
            "withdrawal" => Some(TransactionKind::Withdrawal),
            "transfer_out" => Some(TransactionKind::TransferOut),
            "transfer_in" => Some(TransactionKind::TransferIn),
            _ => None,
        }
    }

    /// Returns true if this kind increases the owning account's balance.
    pub fn is_credit(&self) -> bool {
        matches!(self, TransactionKind::Deposit | TransactionKind::TransferIn)
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable audit record of a single balance-affecting event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// Account this record is filed against
    pub account_id: AccountId,
    /// Always positive; the direction comes from `kind`
    pub amount: Amount,
    pub kind: TransactionKind,
    pub description: String,
    /// When the service recorded the event
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Effect of this record on the owning account's balance.
    pub fn signed_amount(&self) -> Amount {
        if self.kind.is_credit() {
            self.amount
        } else {
            -self.amount
        }
    }
}

/// A transaction record that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: AccountId,
    pub amount: Amount,
    pub kind: TransactionKind,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl NewTransaction {
    fn new(
        account_id: AccountId,
        amount: Amount,
        kind: TransactionKind,
        description: String,
    ) -> Result<Self, NonPositiveAmount> {
        if amount <= Amount::ZERO {
            return Err(NonPositiveAmount(amount));
        }
        Ok(Self {
            account_id,
            amount,
            kind,
            description,
            timestamp: Utc::now(),
        })
    }

    pub fn deposit(account_id: AccountId, amount: Amount) -> Result<Self, NonPositiveAmount> {
        Self::new(
            account_id,
            amount,
            TransactionKind::Deposit,
            "Deposit".to_string(),
        )
    }

    pub fn withdrawal(account_id: AccountId, amount: Amount) -> Result<Self, NonPositiveAmount> {
        Self::new(
            account_id,
            amount,
            TransactionKind::Withdrawal,
            format!("Withdrawn an amount of {}", format_amount(amount)),
        )
    }

    /// Debit record filed against the sender.
    pub fn transfer_out(
        sender: AccountId,
        receiver_username: &str,
        amount: Amount,
    ) -> Result<Self, NonPositiveAmount> {
        Self::new(
            sender,
            amount,
            TransactionKind::TransferOut,
            format!(
                "Debited with money of {} to {}",
                format_amount(amount),
                receiver_username
            ),
        )
    }

    /// Credit record filed against the receiver.
    pub fn transfer_in(
        receiver: AccountId,
        sender_username: &str,
        amount: Amount,
    ) -> Result<Self, NonPositiveAmount> {
        Self::new(
            receiver,
            amount,
            TransactionKind::TransferIn,
            format!(
                "Credited with money of {} from {}",
                format_amount(amount),
                sender_username
            ),
        )
    }

    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            account_id: self.account_id,
            amount: self.amount,
            kind: self.kind,
            description: self.description,
            timestamp: self.timestamp,
        }
    }
}

/// Returned when a transaction record is built with a zero or negative amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonPositiveAmount(pub Amount);

impl std::fmt::Display for NonPositiveAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "transaction amount must be positive, got {}", self.0)
    }
}

impl std::error::Error for NonPositiveAmount {}
