use std::time::Duration;

use crate::application::BcryptHasher;

/// Runtime settings for the ledger.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// SQLite database file path
    pub database_path: String,
    /// Upper bound on a single unit of work, including waiting for the store
    pub store_timeout: Duration,
    /// bcrypt cost used when registering accounts
    pub bcrypt_cost: u32,
}

impl LedgerConfig {
    pub const DEFAULT_DATABASE: &'static str = "arca.db";
    pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            ..Self::default()
        }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// URL for an existing database.
    pub fn database_url(&self) -> String {
        format!("sqlite:{}", self.database_path)
    }

    /// URL that creates the database file when missing.
    pub fn create_database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.database_path)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            database_path: Self::DEFAULT_DATABASE.to_string(),
            store_timeout: Self::DEFAULT_STORE_TIMEOUT,
            bcrypt_cost: BcryptHasher::DEFAULT_COST,
        }
    }
}
