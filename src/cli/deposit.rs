//! Cash deposit CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_deposit_details, format_deposit_list};
use crate::error::{GestionError, GestionResult};
use crate::models::{CashDeposit, CashDepositDraft, CashDepositId};
use crate::services::CashDepositService;
use crate::storage::{CashDepositFilter, Storage};

use super::{occurred_at, parse_money, RangeArgs};

/// Cash deposit subcommands
#[derive(Subcommand)]
pub enum DepositCommands {
    /// Record cash put into the till
    Add {
        /// Amount deposited
        amount: String,
        /// Day of the deposit (YYYY-MM-DD), defaults to now
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List deposits, newest first
    List {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show deposit details
    Show {
        /// Deposit ID
        id: String,
    },

    /// Edit a deposit
    Edit {
        /// Deposit ID
        id: String,
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete a deposit
    Delete {
        /// Deposit ID
        id: String,
    },
}

pub fn handle_deposit_command(
    storage: &Storage,
    settings: &Settings,
    cmd: DepositCommands,
) -> GestionResult<()> {
    let service = CashDepositService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        DepositCommands::Add {
            amount,
            date,
            notes,
        } => {
            let mut draft =
                CashDepositDraft::new(parse_money("amount", &amount)?, occurred_at(date.as_deref())?);
            draft.observations = notes;
            let deposit = service.create(draft)?;
            println!(
                "Recorded cash deposit of {}",
                deposit.amount.format_with_symbol(symbol)
            );
            println!("  ID: {}", deposit.id);
        }

        DepositCommands::List {
            range,
            search,
            limit,
        } => {
            let filter = CashDepositFilter {
                range: range.to_range()?,
                search,
                limit,
            };
            print!("{}", format_deposit_list(&service.list(&filter)?, symbol));
        }

        DepositCommands::Show { id } => {
            print!("{}", format_deposit_details(&lookup(&service, &id)?, symbol));
        }

        DepositCommands::Edit {
            id,
            amount,
            date,
            notes,
        } => {
            let current = lookup(&service, &id)?;
            let draft = CashDepositDraft {
                amount: match amount {
                    Some(a) => parse_money("amount", &a)?,
                    None => current.amount,
                },
                observations: notes.or(current.observations),
                occurred_at: match date {
                    Some(d) => occurred_at(Some(&d))?,
                    None => current.occurred_at,
                },
            };
            let updated = service.update(current.id, draft)?;
            println!("Updated cash deposit: {}", updated.id);
        }

        DepositCommands::Delete { id } => {
            let deposit = lookup(&service, &id)?;
            service.delete(deposit.id)?;
            println!(
                "Deleted cash deposit {} ({})",
                deposit.id,
                deposit.amount.format_with_symbol(symbol)
            );
        }
    }

    Ok(())
}

fn lookup(service: &CashDepositService, identifier: &str) -> GestionResult<CashDeposit> {
    let id: CashDepositId = identifier
        .parse()
        .map_err(|_| GestionError::Validation(format!("Invalid deposit ID: {}", identifier)))?;
    service
        .get(id)?
        .ok_or_else(|| GestionError::not_found("Cash deposit", identifier))
}
