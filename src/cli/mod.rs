//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod audit;
pub mod backup;
pub mod carrier;
pub mod category;
pub mod courier;
pub mod deposit;
pub mod expense;
pub mod product;
pub mod provider;
pub mod report;
pub mod transfer;

pub use audit::handle_audit_command;
pub use backup::{handle_backup_command, BackupCommands};
pub use carrier::{handle_carrier_command, CarrierCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use courier::{handle_courier_command, CourierCommands};
pub use deposit::{handle_deposit_command, DepositCommands};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use product::{handle_product_command, ProductCommands};
pub use provider::{handle_provider_command, ProviderCommands};
pub use report::{handle_balance_command, handle_dashboard_command};
pub use transfer::{handle_transfer_command, TransferCommands};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::Args;

use crate::error::{GestionError, GestionResult};
use crate::models::Money;
use crate::storage::DateRange;

/// `--from` / `--to` date bounds shared by the list and report commands
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,
    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
}

impl RangeArgs {
    pub fn to_range(&self) -> GestionResult<DateRange> {
        let from = self.from.as_deref().map(parse_date).transpose()?;
        let to = self.to.as_deref().map(parse_date).transpose()?;
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(GestionError::Validation(format!(
                    "--from {} is after --to {}",
                    from, to
                )));
            }
        }
        Ok(DateRange::days(from, to))
    }
}

pub(crate) fn parse_money(field: &str, input: &str) -> GestionResult<Money> {
    Money::parse(input).map_err(|e| GestionError::Validation(format!("Invalid {}: {}", field, e)))
}

pub(crate) fn parse_date(input: &str) -> GestionResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        GestionError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", input))
    })
}

/// The given day at midnight UTC, or now when no date is given
pub(crate) fn occurred_at(date: Option<&str>) -> GestionResult<DateTime<Utc>> {
    match date {
        Some(date) => Ok(parse_date(date)?.and_time(NaiveTime::MIN).and_utc()),
        None => Ok(Utc::now()),
    }
}
