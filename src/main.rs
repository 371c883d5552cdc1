use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gestion::cli::{
    handle_audit_command, handle_backup_command, handle_balance_command,
    handle_carrier_command, handle_category_command, handle_courier_command,
    handle_dashboard_command, handle_deposit_command, handle_expense_command,
    handle_product_command, handle_provider_command, handle_transfer_command, RangeArgs,
};
use gestion::config::{GestionPaths, Settings};
use gestion::events::EventBus;
use gestion::storage::Storage;

/// Environment variable holding a tracing filter, e.g. `gestion=debug`
const LOG_ENV: &str = "GESTION_LOG";

#[derive(Parser)]
#[command(
    name = "gestion",
    version,
    about = "Bookkeeping for a small shop: catalogue, expenses, transfers and backups",
    long_about = "Gestion keeps a shop's providers, products, delivery expenses, \
                  incoming transfers and cash deposits in a local database, \
                  reports the cash balance and takes snapshot backups."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory, database and default settings
    Init,

    /// Show current configuration and paths
    Config,

    /// Provider management commands
    #[command(subcommand)]
    Provider(gestion::cli::ProviderCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(gestion::cli::CategoryCommands),

    /// Product management commands
    #[command(subcommand)]
    Product(gestion::cli::ProductCommands),

    /// Carrier management commands
    #[command(subcommand)]
    Carrier(gestion::cli::CarrierCommands),

    /// Courier management commands
    #[command(subcommand)]
    Courier(gestion::cli::CourierCommands),

    /// Expense commands
    #[command(subcommand)]
    Expense(gestion::cli::ExpenseCommands),

    /// Cash deposit commands
    #[command(subcommand)]
    Deposit(gestion::cli::DepositCommands),

    /// Incoming transfer commands
    #[command(subcommand)]
    Transfer(gestion::cli::TransferCommands),

    /// Cash balance: deposits minus expenses
    Balance {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Catalogue counts and the last 30 days of activity
    Dashboard,

    /// Backup and restore commands
    #[command(subcommand)]
    Backup(gestion::cli::BackupCommands),

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        count: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = GestionPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    init_tracing(&settings.log_level);

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("Gestion - bookkeeping for a small shop");
            println!();
            println!("Run 'gestion --help' for usage information.");
            println!("Run 'gestion init' to set up the data directory.");
            return Ok(());
        }
    };

    if let Commands::Config = command {
        print_config(&paths, &settings);
        return Ok(());
    }

    let storage = Storage::open(paths.clone(), Arc::new(EventBus::new()))?;

    match command {
        Commands::Init => {
            settings.save(&paths)?;
            let report = storage.schema_report();
            println!("Initialized Gestion at: {}", paths.base_dir().display());
            println!("Database: {}", paths.database_file().display());
            if report.tables_created.is_empty() && report.columns_added.is_empty() {
                println!("Schema already up to date (version {}).", report.current_version);
            } else {
                println!(
                    "Schema version {} -> {} ({} table(s) created, {} column(s) added)",
                    report.previous_version,
                    report.current_version,
                    report.tables_created.len(),
                    report.columns_added.len()
                );
            }
        }
        Commands::Config => {}
        Commands::Provider(cmd) => handle_provider_command(&storage, &settings, cmd)?,
        Commands::Category(cmd) => handle_category_command(&storage, &settings, cmd)?,
        Commands::Product(cmd) => handle_product_command(&storage, &settings, cmd)?,
        Commands::Carrier(cmd) => handle_carrier_command(&storage, &settings, cmd)?,
        Commands::Courier(cmd) => handle_courier_command(&storage, &settings, cmd)?,
        Commands::Expense(cmd) => handle_expense_command(&storage, &settings, cmd)?,
        Commands::Deposit(cmd) => handle_deposit_command(&storage, &settings, cmd)?,
        Commands::Transfer(cmd) => handle_transfer_command(&storage, &settings, cmd)?,
        Commands::Balance { range } => handle_balance_command(&storage, &settings, range)?,
        Commands::Dashboard => handle_dashboard_command(&storage, &settings)?,
        Commands::Backup(cmd) => handle_backup_command(&storage, &settings, cmd)?,
        Commands::Audit { count } => handle_audit_command(&storage, count)?,
    }

    Ok(())
}

/// Log to stderr, filtered by `GESTION_LOG` or the configured level
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_config(paths: &GestionPaths, settings: &Settings) {
    println!("Gestion Configuration");
    println!("=====================");
    println!("Base directory:   {}", paths.base_dir().display());
    println!("Database:         {}", paths.database_file().display());
    println!("Backup directory: {}", paths.backup_dir().display());
    println!("Audit log:        {}", paths.audit_log().display());
    println!();
    println!("Settings:");
    println!("  Currency symbol: {}", settings.currency_symbol);
    println!("  Date format:     {}", settings.date_format);
    println!("  Log level:       {}", settings.log_level);
    println!(
        "  Backup retention: {} daily, {} monthly",
        settings.backup_retention.daily_count, settings.backup_retention.monthly_count
    );
}
