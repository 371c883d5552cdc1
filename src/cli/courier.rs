//! Courier CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_courier_details, format_courier_list};
use crate::error::{GestionError, GestionResult};
use crate::models::{Courier, CourierDraft};
use crate::services::CourierService;
use crate::storage::{NameFilter, Storage};

/// Courier subcommands
#[derive(Subcommand)]
pub enum CourierCommands {
    /// Add a courier
    Add {
        /// Courier name
        name: String,
        /// Contact phone
        #[arg(short, long)]
        phone: Option<String>,
        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List couriers
    List {
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show courier details
    Show {
        /// Courier name or ID
        courier: String,
    },

    /// Edit a courier
    Edit {
        /// Courier name or ID
        courier: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        phone: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete a courier that no expense references
    Delete {
        /// Courier name or ID
        courier: String,
    },
}

pub fn handle_courier_command(
    storage: &Storage,
    _settings: &Settings,
    cmd: CourierCommands,
) -> GestionResult<()> {
    let service = CourierService::new(storage);

    match cmd {
        CourierCommands::Add { name, phone, notes } => {
            let courier = service.create(CourierDraft {
                name,
                phone,
                observations: notes,
            })?;
            println!("Created courier: {}", courier.name);
            println!("  ID: {}", courier.id);
        }

        CourierCommands::List { search } => {
            let filter = NameFilter {
                search,
                limit: None,
            };
            print!("{}", format_courier_list(&service.list(&filter)?));
        }

        CourierCommands::Show { courier } => {
            print!("{}", format_courier_details(&lookup(&service, &courier)?));
        }

        CourierCommands::Edit {
            courier,
            name,
            phone,
            notes,
        } => {
            let current = lookup(&service, &courier)?;
            if name.is_none() && phone.is_none() && notes.is_none() {
                println!("No changes specified. Use --name, --phone or --notes.");
                return Ok(());
            }
            let updated = service.update(
                current.id,
                CourierDraft {
                    name: name.unwrap_or(current.name),
                    phone: phone.or(current.phone),
                    observations: notes.or(current.observations),
                },
            )?;
            println!("Updated courier: {}", updated.name);
        }

        CourierCommands::Delete { courier } => {
            let courier = lookup(&service, &courier)?;
            service.delete(courier.id)?;
            println!("Deleted courier: {}", courier.name);
        }
    }

    Ok(())
}

pub(crate) fn lookup(service: &CourierService, identifier: &str) -> GestionResult<Courier> {
    service
        .find(identifier)?
        .ok_or_else(|| GestionError::not_found("Courier", identifier))
}
