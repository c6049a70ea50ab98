use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::application::WalletService;
use crate::config::{AppConfig, PartnerConfig, ServerConfig};
use crate::domain::{
    all_account_balances, demo_users, format_amount, trial_balance, AccountRef, Amount,
    JournalEntry, UserId, DEFAULT_CURRENCY,
};
use crate::io::{Exporter, ImportOptions, Importer};
use crate::partner::PartnerClient;
use crate::server::{self, AppState};
use crate::storage::Repository;

/// ppr-wallet - read and disburse user balances
#[derive(Parser)]
#[command(name = "ppr-wallet")]
#[command(about = "A minimal wallet service that pays user balances out to their bank accounts")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(
        short,
        long,
        env = "DATABASE_PATH",
        default_value = "ppr-wallet.db",
        global = true
    )]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Load balance records from a CSV file, or the demo users if no file is given
    Seed {
        /// CSV file with columns username,balance,bank_code,account_no,account_name
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Validate the file without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Start the HTTP API
    Serve {
        #[command(flatten)]
        server: ServerConfig,

        #[command(flatten)]
        partner: PartnerConfig,
    },

    /// Show a user's balance record
    Balance {
        /// User ID
        id: UserId,
    },

    /// Pay a user's whole balance out to their bank account
    Disburse {
        /// User ID
        id: UserId,

        #[command(flatten)]
        partner: PartnerConfig,
    },

    /// List journal entries
    Journal {
        /// Write the entries as CSV to stdout
        #[arg(long)]
        csv: bool,
    },

    /// Write all balance records as CSV to stdout, in the format `seed` reads
    Export,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                init_repository(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Seed { file, dry_run } => {
                let repo = connect_repository(&self.database).await?;
                run_seed_command(&repo, file, dry_run).await?;
            }

            Commands::Serve { server, partner } => {
                let config = AppConfig {
                    database: self.database,
                    server,
                    partner,
                };
                run_serve_command(config).await?;
            }

            Commands::Balance { id } => {
                let repo = connect_repository(&self.database).await?;
                let user = repo
                    .get_user_balance(id)
                    .await?
                    .with_context(|| format!("User {} not found", id))?;

                println!("User: {} ({})", user.username, user.id);
                println!(
                    "  Balance:        {} {}",
                    format_amount(user.balance),
                    DEFAULT_CURRENCY
                );
                println!("  Bank:           {}", user.bank_code);
                println!("  Account no:     {}", user.account_no);
                println!("  Account name:   {}", user.account_name);
                println!(
                    "  Updated:        {}",
                    user.updated_at.format("%Y-%m-%d %H:%M:%S")
                );
            }

            Commands::Disburse { id, partner } => {
                let repo = connect_repository(&self.database).await?;
                let service = wallet_service(repo, &partner)?;
                let disbursement = service.disburse_balance(id).await?;

                println!(
                    "Disbursed {} {} for user {} (reference {}{})",
                    format_amount(disbursement.amount),
                    DEFAULT_CURRENCY,
                    disbursement.user_id,
                    disbursement.reference_id,
                    disbursement
                        .partner_id
                        .map(|id| format!(", partner transaction {}", id))
                        .unwrap_or_default()
                );
            }

            Commands::Journal { csv } => {
                let repo = connect_repository(&self.database).await?;
                run_journal_command(&repo, csv).await?;
            }

            Commands::Export => {
                let repo = connect_repository(&self.database).await?;
                let count = Exporter::new(&repo)
                    .export_user_balances_csv(std::io::stdout())
                    .await?;
                eprintln!("Exported {} balance records", count);
            }
        }

        Ok(())
    }
}

/// Create the database file if needed and run migrations.
async fn init_repository(database_path: &str) -> Result<Repository> {
    Repository::init(&format!("sqlite:{}?mode=rwc", database_path)).await
}

/// Connect to an existing database.
async fn connect_repository(database_path: &str) -> Result<Repository> {
    Repository::connect(&format!("sqlite:{}", database_path))
        .await
        .with_context(|| format!("Run `ppr-wallet init` to create {}", database_path))
}

fn wallet_service(repo: Repository, partner: &PartnerConfig) -> Result<WalletService> {
    let client = PartnerClient::new(partner).context("Failed to build payout partner client")?;
    let repo = Arc::new(repo);

    Ok(WalletService::new(repo.clone(), repo, Arc::new(client)))
}

async fn run_serve_command(config: AppConfig) -> Result<()> {
    let repo = init_repository(&config.database).await?;
    let service = wallet_service(repo, &config.partner)?;

    tracing::info!(
        database = %config.database,
        partner = %config.partner.disbursement_url(),
        "starting wallet service"
    );
    server::run(AppState::new(service), &config.server).await
}

async fn run_seed_command(repo: &Repository, file: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let Some(path) = file else {
        for user in demo_users() {
            let user = repo.insert_user_balance(&user).await?;
            println!(
                "Created user {} ({}) with balance {}",
                user.username,
                user.id,
                format_amount(user.balance)
            );
        }
        return Ok(());
    };

    let reader = std::fs::File::open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let result = Importer::new(repo)
        .import_user_balances_csv(reader, ImportOptions { dry_run })
        .await?;

    for error in &result.errors {
        match &error.field {
            Some(field) => eprintln!("Line {} ({}): {}", error.line, field, error.error),
            None => eprintln!("Line {}: {}", error.line, error.error),
        }
    }

    let verb = if dry_run { "Validated" } else { "Imported" };
    println!(
        "{} {} balance records ({} errors)",
        verb,
        result.imported,
        result.errors.len()
    );
    Ok(())
}

async fn run_journal_command(repo: &Repository, csv: bool) -> Result<()> {
    if csv {
        let count = Exporter::new(repo)
            .export_journal_csv(std::io::stdout())
            .await?;
        eprintln!("Exported {} journal entries", count);
        return Ok(());
    }

    let entries = repo.list_journal_entries().await?;
    if entries.is_empty() {
        println!("No journal entries found.");
        return Ok(());
    }

    println!(
        "{:<6} {:<9} {:<16} {:<22} {:>12} {:>12}  {}",
        "ID", "KIND", "ACCOUNT", "TRANSACTION", "DEBIT", "CREDIT", "FOLIO"
    );
    println!("{}", "-".repeat(100));
    for entry in &entries {
        println!(
            "{:<6} {:<9} {:<16} {:<22} {:>12} {:>12}  {}",
            entry.id,
            entry.account.kind(),
            entry.account.to_string(),
            entry.transaction_name,
            format_amount(entry.debit_amount),
            format_amount(entry.credit_amount),
            entry.folio
        );
    }

    println!();
    println!("{:<9} {:<16} {:>12}", "KIND", "ACCOUNT", "NET");
    for (account, net) in account_positions(&entries) {
        println!(
            "{:<9} {:<16} {:>12}",
            account.kind(),
            account.to_string(),
            format_amount(net)
        );
    }

    let totals = trial_balance(&entries);
    println!();
    println!(
        "Total debits: {}  Total credits: {}  {}",
        format_amount(totals.total_debits),
        format_amount(totals.total_credits),
        if totals.is_balanced() {
            "(balanced)"
        } else {
            "(NOT BALANCED)"
        }
    );

    Ok(())
}

/// Net position per account, grouped by kind, then by id.
fn account_positions(entries: &[JournalEntry]) -> Vec<(AccountRef, Amount)> {
    let mut positions: Vec<_> = all_account_balances(entries).into_iter().collect();
    positions.sort_by_key(|(account, _)| (account.kind(), account.to_string()));
    positions
}
