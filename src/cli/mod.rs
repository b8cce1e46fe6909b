use std::fs::File;
use std::io::{self, BufWriter};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::application::{BcryptHasher, LedgerService};
use crate::config::LedgerConfig;
use crate::domain::{Amount, format_amount, parse_amount};
use crate::io::Exporter;

/// Arca - a small banking ledger
#[derive(Parser)]
#[command(name = "arca")]
#[command(about = "Accounts, deposits, withdrawals and transfers over a local SQLite ledger")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = LedgerConfig::DEFAULT_DATABASE)]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Give up on the store after this many milliseconds
    #[arg(long, global = true, default_value_t = 5000)]
    pub store_timeout_ms: u64,

    /// bcrypt cost used when registering accounts
    #[arg(long, global = true, default_value_t = BcryptHasher::DEFAULT_COST)]
    pub bcrypt_cost: u32,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Register a new account
    Register {
        /// Username (must be unique)
        username: String,

        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Check a username and password
    Login {
        username: String,

        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Deposit money into an account
    Deposit {
        username: String,

        /// Amount to deposit (e.g., "50.00" or "50")
        amount: String,
    },

    /// Withdraw money from an account
    Withdraw {
        username: String,

        /// Amount to withdraw (e.g., "50.00" or "50")
        amount: String,
    },

    /// Transfer money between accounts
    Transfer {
        /// Amount to transfer (e.g., "50.00" or "50")
        amount: String,

        /// Sending account
        #[arg(long)]
        from: String,

        /// Receiving account
        #[arg(long)]
        to: String,
    },

    /// Show the balance of an account
    Balance { username: String },

    /// List the transactions of an account
    History { username: String },

    /// Export an account's history
    Export {
        username: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
    },

    /// Verify an account's balance against its history
    Audit { username: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl Cli {
    fn config(&self) -> LedgerConfig {
        LedgerConfig::new(&self.database)
            .with_store_timeout(Duration::from_millis(self.store_timeout_ms))
            .with_bcrypt_cost(self.bcrypt_cost)
    }

    pub async fn run(self) -> Result<()> {
        let config = self.config();

        if matches!(self.command, Commands::Init) {
            LedgerService::init(config).await?;
            println!("Database initialized: {}", self.database);
            return Ok(());
        }

        let service = LedgerService::connect(config)
            .await
            .with_context(|| format!("Cannot open {}; run `arca init` first", self.database))?;

        match self.command {
            Commands::Init => unreachable!("handled above"),

            Commands::Register { username, password } => {
                let password = read_password(password)?;
                let account = service.register_account(&username, &password).await?;
                println!("Registered account {} (id {})", account.username, account.id);
            }

            Commands::Login { username, password } => {
                let password = read_password(password)?;
                let principal = service.authenticate(&username, &password).await?;
                let authorities: Vec<&str> =
                    principal.authorities.iter().map(|a| a.as_str()).collect();
                println!(
                    "Authenticated {} [{}]",
                    principal.username,
                    authorities.join(", ")
                );
            }

            Commands::Deposit { username, amount } => {
                let amount = read_amount(&amount)?;
                let account = service.find_account_by_username(&username).await?;
                let account = service.deposit(&account, amount).await?;
                println!(
                    "Deposited {} into {}. Balance: {}",
                    format_amount(amount),
                    account.username,
                    format_amount(account.balance)
                );
            }

            Commands::Withdraw { username, amount } => {
                let amount = read_amount(&amount)?;
                let account = service.find_account_by_username(&username).await?;
                let account = service.withdraw(&account, amount).await?;
                println!(
                    "Withdrew {} from {}. Balance: {}",
                    format_amount(amount),
                    account.username,
                    format_amount(account.balance)
                );
            }

            Commands::Transfer { amount, from, to } => {
                let amount = read_amount(&amount)?;
                let sender = service.find_account_by_username(&from).await?;
                let receipt = service.transfer_amount(&sender, &to, amount).await?;
                println!(
                    "Transferred {} {} -> {}",
                    format_amount(amount),
                    receipt.sender.username,
                    receipt.receiver.username
                );
                println!(
                    "  {}: {}",
                    receipt.sender.username,
                    format_amount(receipt.sender.balance)
                );
                println!(
                    "  {}: {}",
                    receipt.receiver.username,
                    format_amount(receipt.receiver.balance)
                );
            }

            Commands::Balance { username } => {
                let account = service.find_account_by_username(&username).await?;
                println!("{}: {}", account.username, format_amount(account.balance));
            }

            Commands::History { username } => {
                run_history_command(&service, &username).await?;
            }

            Commands::Export {
                username,
                output,
                format,
            } => {
                run_export_command(&service, &username, output, format).await?;
            }

            Commands::Audit { username } => {
                let audit = service.audit_account(&username).await?;
                println!("Account:      {}", audit.username);
                println!("Transactions: {}", audit.transaction_count);
                println!("Stored:       {}", format_amount(audit.stored_balance));
                println!("Replayed:     {}", format_amount(audit.replayed_balance));
                if audit.is_consistent() {
                    println!("\nOK: balance matches history");
                } else {
                    if audit.went_negative {
                        println!("\nERROR: history drives the balance below zero");
                    }
                    anyhow::bail!("balance of {} does not match its history", audit.username);
                }
            }
        }

        Ok(())
    }
}

async fn run_history_command(service: &LedgerService, username: &str) -> Result<()> {
    let account = service.find_account_by_username(username).await?;
    let transactions = service.get_transaction_history(&account).await?;

    if transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!(
        "{:<20} {:<13} {:>12} DESCRIPTION",
        "DATE", "KIND", "AMOUNT"
    );
    println!("{}", "-".repeat(70));
    for tx in &transactions {
        println!(
            "{:<20} {:<13} {:>12} {}",
            tx.timestamp.format("%Y-%m-%d %H:%M:%S"),
            tx.kind.as_str(),
            format_amount(tx.signed_amount()),
            truncate(&tx.description, 40)
        );
    }
    println!("{}", "-".repeat(70));
    println!("Balance: {}", format_amount(account.balance));
    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    username: &str,
    output: Option<String>,
    format: ExportFormat,
) -> Result<()> {
    let exporter = Exporter::new(service);

    let writer: Box<dyn io::Write> = match &output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Cannot create {}", path))?,
        )),
        None => Box::new(io::stdout()),
    };

    match format {
        ExportFormat::Csv => {
            let count = exporter.export_history_csv(username, writer).await?;
            if output.is_some() {
                eprintln!("Exported {} transactions", count);
            }
        }
        ExportFormat::Json => {
            let statement = exporter.export_statement_json(username, writer).await?;
            if output.is_some() {
                eprintln!(
                    "Exported statement with {} transactions",
                    statement.transactions.len()
                );
            }
        }
    }
    Ok(())
}

fn read_amount(input: &str) -> Result<Amount> {
    parse_amount(input).with_context(|| format!("Invalid amount '{}'. Use '50.00' or '50'", input))
}

fn read_password(given: Option<String>) -> Result<String> {
    match given {
        Some(password) => Ok(password),
        None => rpassword::prompt_password("Password: ").context("Failed to read password"),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
