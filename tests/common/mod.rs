// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::time::Duration;

use anyhow::Result;
use arca::application::LedgerService;
use arca::config::LedgerConfig;
use arca::domain::{Account, Amount, parse_amount};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let config = LedgerConfig::new(db_path.to_str().unwrap())
        .with_bcrypt_cost(4)
        .with_store_timeout(Duration::from_secs(10));
    let service = LedgerService::init(config).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a decimal literal like "100.00"
pub fn amount(s: &str) -> Amount {
    parse_amount(s).unwrap()
}

/// Test fixture: standard customers
pub struct StandardAccounts;

impl StandardAccounts {
    /// Register alice and bob with empty balances
    pub async fn create_basic(service: &LedgerService) -> Result<(Account, Account)> {
        let alice = service.register_account("alice", "pw1").await?;
        let bob = service.register_account("bob", "pw2").await?;
        Ok((alice, bob))
    }

    /// Register an account and pay `initial` into it
    pub async fn create_funded(
        service: &LedgerService,
        username: &str,
        initial: &str,
    ) -> Result<Account> {
        let account = service.register_account(username, "pw").await?;
        Ok(service.deposit(&account, amount(initial)).await?)
    }
}
