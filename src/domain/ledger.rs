use rust_decimal::Decimal;
use serde::Serialize;

use super::{Account, Amount, Transaction};

/// Replay a transaction history into a balance.
/// Balance = sum of credits - sum of debits
pub fn replay_balance(transactions: &[Transaction]) -> Amount {
    transactions
        .iter()
        .fold(Decimal::ZERO, |balance, tx| balance + tx.signed_amount())
}

/// Lowest balance reached while replaying the history in order.
pub fn lowest_running_balance(transactions: &[Transaction]) -> Amount {
    let mut balance = Decimal::ZERO;
    let mut lowest = Decimal::ZERO;
    for tx in transactions {
        balance += tx.signed_amount();
        lowest = lowest.min(balance);
    }
    lowest
}

/// Comparison of an account's stored balance with its replayed history.
#[derive(Debug, Clone, Serialize)]
pub struct AccountAudit {
    pub username: String,
    pub stored_balance: Amount,
    pub replayed_balance: Amount,
    pub transaction_count: usize,
    pub went_negative: bool,
}

impl AccountAudit {
    pub fn is_consistent(&self) -> bool {
        self.stored_balance == self.replayed_balance && !self.went_negative
    }
}

pub fn audit_account(account: &Account, transactions: &[Transaction]) -> AccountAudit {
    AccountAudit {
        username: account.username.clone(),
        stored_balance: account.balance,
        replayed_balance: replay_balance(transactions),
        transaction_count: transactions.len(),
        went_negative: lowest_running_balance(transactions) < Decimal::ZERO,
    }
}
