//! Transfer CLI commands

use clap::Subcommand;
use tracing::warn;

use crate::config::Settings;
use crate::display::{format_transfer_details, format_transfer_list};
use crate::error::{GestionError, GestionResult};
use crate::models::{Transfer, TransferDraft, TransferId, KNOWN_ACCOUNT_TYPES};
use crate::services::TransferService;
use crate::storage::{Storage, TransferFilter};

use super::{occurred_at, parse_money, RangeArgs};

/// Transfer subcommands
#[derive(Subcommand)]
pub enum TransferCommands {
    /// Record an incoming transfer
    Add {
        /// Amount received
        amount: String,
        /// Receiving account (Nequi, Daviplata, Bancolombia, Datafono, Otro)
        #[arg(short, long)]
        account: String,
        /// Who sent the money
        #[arg(short, long)]
        sender: String,
        /// Day of the transfer (YYYY-MM-DD), defaults to now
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List transfers, newest first
    List {
        #[command(flatten)]
        range: RangeArgs,
        /// Only this receiving account
        #[arg(short, long)]
        account: Option<String>,
        /// Only transfers whose sender or notes contain this text
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show transfer details
    Show {
        /// Transfer ID
        id: String,
    },

    /// Edit a transfer
    Edit {
        /// Transfer ID
        id: String,
        #[arg(long)]
        amount: Option<String>,
        #[arg(short, long)]
        account: Option<String>,
        #[arg(short, long)]
        sender: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete a transfer
    Delete {
        /// Transfer ID
        id: String,
    },
}

pub fn handle_transfer_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TransferCommands,
) -> GestionResult<()> {
    let service = TransferService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        TransferCommands::Add {
            amount,
            account,
            sender,
            date,
            notes,
        } => {
            note_unknown_account(&account);
            let mut draft = TransferDraft::new(
                parse_money("amount", &amount)?,
                account,
                sender,
                occurred_at(date.as_deref())?,
            );
            draft.observations = notes;
            let transfer = service.create(draft)?;
            println!(
                "Recorded transfer of {} to {} from {}",
                transfer.amount.format_with_symbol(symbol),
                transfer.account_type,
                transfer.sender_name
            );
            println!("  ID: {}", transfer.id);
        }

        TransferCommands::List {
            range,
            account,
            search,
            limit,
        } => {
            let filter = TransferFilter {
                range: range.to_range()?,
                account_type: account,
                search,
                limit,
            };
            print!("{}", format_transfer_list(&service.list(&filter)?, symbol));
        }

        TransferCommands::Show { id } => {
            print!("{}", format_transfer_details(&lookup(&service, &id)?, symbol));
        }

        TransferCommands::Edit {
            id,
            amount,
            account,
            sender,
            date,
            notes,
        } => {
            let current = lookup(&service, &id)?;
            if let Some(account) = &account {
                note_unknown_account(account);
            }
            let draft = TransferDraft {
                amount: match amount {
                    Some(a) => parse_money("amount", &a)?,
                    None => current.amount,
                },
                account_type: account.unwrap_or(current.account_type),
                sender_name: sender.unwrap_or(current.sender_name),
                observations: notes.or(current.observations),
                occurred_at: match date {
                    Some(d) => occurred_at(Some(&d))?,
                    None => current.occurred_at,
                },
            };
            let updated = service.update(current.id, draft)?;
            println!("Updated transfer: {}", updated.id);
        }

        TransferCommands::Delete { id } => {
            let transfer = lookup(&service, &id)?;
            service.delete(transfer.id)?;
            println!(
                "Deleted transfer {} ({})",
                transfer.id,
                transfer.amount.format_with_symbol(symbol)
            );
        }
    }

    Ok(())
}

fn lookup(service: &TransferService, identifier: &str) -> GestionResult<Transfer> {
    let id: TransferId = identifier
        .parse()
        .map_err(|_| GestionError::Validation(format!("Invalid transfer ID: {}", identifier)))?;
    service
        .get(id)?
        .ok_or_else(|| GestionError::not_found("Transfer", identifier))
}

/// Account labels are free text; an unfamiliar one is allowed but logged
fn note_unknown_account(account: &str) {
    if !KNOWN_ACCOUNT_TYPES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(account.trim()))
    {
        warn!(account, "transfer uses an account type outside the usual list");
    }
}
