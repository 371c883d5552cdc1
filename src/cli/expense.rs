//! Expense CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_expense_details, format_expense_list};
use crate::error::{GestionError, GestionResult};
use crate::models::{
    CarrierId, CourierId, Expense, ExpenseDraft, ExpenseId, ExpenseListing, ExpenseType,
};
use crate::services::{CarrierService, CourierService, ExpenseService};
use crate::storage::{ExpenseFilter, Storage};

use super::{occurred_at, parse_money, RangeArgs};

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense
    Add {
        /// Amount (e.g., "15000")
        amount: String,
        /// Freight, Delivery, Carrier or Other
        #[arg(short = 't', long = "type", default_value = "Other")]
        expense_type: String,
        /// Day of the expense (YYYY-MM-DD), defaults to now
        #[arg(short, long)]
        date: Option<String>,
        /// Carrier name or ID
        #[arg(long)]
        carrier: Option<String>,
        /// Courier name or ID
        #[arg(long)]
        courier: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List expenses, newest first
    List {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(short = 't', long = "type")]
        expense_type: Option<String>,
        #[arg(long)]
        carrier: Option<String>,
        #[arg(long)]
        courier: Option<String>,
        /// Only expenses whose notes contain this text
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show expense details
    Show {
        /// Expense ID
        id: String,
    },

    /// Edit an expense
    Edit {
        /// Expense ID
        id: String,
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(short = 't', long = "type")]
        expense_type: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(long)]
        carrier: Option<String>,
        #[arg(long)]
        courier: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete an expense
    Delete {
        /// Expense ID
        id: String,
    },
}

pub fn handle_expense_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ExpenseCommands,
) -> GestionResult<()> {
    let service = ExpenseService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        ExpenseCommands::Add {
            amount,
            expense_type,
            date,
            carrier,
            courier,
            notes,
        } => {
            let draft = ExpenseDraft {
                expense_type: parse_type(&expense_type)?,
                amount: parse_money("amount", &amount)?,
                observations: notes,
                occurred_at: occurred_at(date.as_deref())?,
                carrier_id: carrier_id(storage, carrier.as_deref())?,
                courier_id: courier_id(storage, courier.as_deref())?,
            };
            let expense = service.create(draft)?;
            println!(
                "Recorded {} expense of {}",
                expense.expense_type,
                expense.amount.format_with_symbol(symbol)
            );
            println!("  ID: {}", expense.id);
        }

        ExpenseCommands::List {
            range,
            expense_type,
            carrier,
            courier,
            search,
            limit,
        } => {
            let filter = ExpenseFilter {
                range: range.to_range()?,
                expense_type: expense_type.as_deref().map(parse_type).transpose()?,
                carrier_id: carrier_id(storage, carrier.as_deref())?,
                courier_id: courier_id(storage, courier.as_deref())?,
                search,
                limit,
            };
            print!("{}", format_expense_list(&service.list(&filter)?, symbol));
        }

        ExpenseCommands::Show { id } => {
            let expense = lookup(&service, &id)?;
            print!("{}", format_expense_details(&listing(storage, expense)?, symbol));
        }

        ExpenseCommands::Edit {
            id,
            amount,
            expense_type,
            date,
            carrier,
            courier,
            notes,
        } => {
            let current = lookup(&service, &id)?;
            let draft = ExpenseDraft {
                expense_type: match expense_type {
                    Some(t) => parse_type(&t)?,
                    None => current.expense_type,
                },
                amount: match amount {
                    Some(a) => parse_money("amount", &a)?,
                    None => current.amount,
                },
                observations: notes.or(current.observations),
                occurred_at: match date {
                    Some(d) => occurred_at(Some(&d))?,
                    None => current.occurred_at,
                },
                carrier_id: match carrier {
                    Some(c) => carrier_id(storage, Some(&c))?,
                    None => current.carrier_id,
                },
                courier_id: match courier {
                    Some(c) => courier_id(storage, Some(&c))?,
                    None => current.courier_id,
                },
            };
            let updated = service.update(current.id, draft)?;
            println!("Updated expense: {}", updated.id);
        }

        ExpenseCommands::Delete { id } => {
            let expense = lookup(&service, &id)?;
            service.delete(expense.id)?;
            println!(
                "Deleted expense {} ({})",
                expense.id,
                expense.amount.format_with_symbol(symbol)
            );
        }
    }

    Ok(())
}

fn parse_type(input: &str) -> GestionResult<ExpenseType> {
    input.parse().map_err(GestionError::Validation)
}

fn lookup(service: &ExpenseService, identifier: &str) -> GestionResult<Expense> {
    let id: ExpenseId = identifier
        .parse()
        .map_err(|_| GestionError::Validation(format!("Invalid expense ID: {}", identifier)))?;
    service
        .get(id)?
        .ok_or_else(|| GestionError::not_found("Expense", identifier))
}

fn carrier_id(
    storage: &Storage,
    identifier: Option<&str>,
) -> GestionResult<Option<CarrierId>> {
    identifier
        .map(|i| super::carrier::lookup(&CarrierService::new(storage), i).map(|c| c.id))
        .transpose()
}

fn courier_id(
    storage: &Storage,
    identifier: Option<&str>,
) -> GestionResult<Option<CourierId>> {
    identifier
        .map(|i| super::courier::lookup(&CourierService::new(storage), i).map(|c| c.id))
        .transpose()
}

fn listing(storage: &Storage, expense: Expense) -> GestionResult<ExpenseListing> {
    let carrier_name = match expense.carrier_id {
        Some(id) => CarrierService::new(storage).get(id)?.map(|c| c.name),
        None => None,
    };
    let courier_name = match expense.courier_id {
        Some(id) => CourierService::new(storage).get(id)?.map(|c| c.name),
        None => None,
    };
    Ok(ExpenseListing {
        expense,
        carrier_name,
        courier_name,
    })
}
