use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::{CredentialHasher, LedgerService};
use crate::domain::{Account, Transaction};
use crate::storage::Store;

/// An account together with its full history, as written by JSON export
#[derive(Debug, Clone, Serialize)]
pub struct AccountStatement {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub account: Account,
    pub transactions: Vec<Transaction>,
}

/// Exporter for converting an account's history to various formats
pub struct Exporter<'a, S, H> {
    service: &'a LedgerService<S, H>,
}

impl<'a, S, H> Exporter<'a, S, H>
where
    S: Store,
    H: CredentialHasher,
{
    pub fn new(service: &'a LedgerService<S, H>) -> Self {
        Self { service }
    }

    /// Export an account's transactions to CSV format
    pub async fn export_history_csv<W: Write>(&self, username: &str, writer: W) -> Result<usize> {
        let (_, transactions) = self.service.find_account_with_history(username).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        // Write header
        csv_writer.write_record([
            "id",
            "timestamp",
            "kind",
            "amount",
            "signed_amount",
            "description",
        ])?;

        let mut count = 0;
        for tx in &transactions {
            csv_writer.write_record([
                tx.id.to_string(),
                tx.timestamp.to_rfc3339(),
                tx.kind.as_str().to_string(),
                tx.amount.to_string(),
                tx.signed_amount().to_string(),
                tx.description.clone(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export an account and its history as a JSON statement
    pub async fn export_statement_json<W: Write>(
        &self,
        username: &str,
        mut writer: W,
    ) -> Result<AccountStatement> {
        let (account, transactions) = self.service.find_account_with_history(username).await?;

        let statement = AccountStatement {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            account,
            transactions,
        };

        let json = serde_json::to_string_pretty(&statement)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(statement)
    }
}
