//! Carrier CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_carrier_details, format_carrier_list};
use crate::error::{GestionError, GestionResult};
use crate::models::{Carrier, CarrierDraft};
use crate::services::CarrierService;
use crate::storage::{NameFilter, Storage};

/// Carrier subcommands
#[derive(Subcommand)]
pub enum CarrierCommands {
    /// Add a carrier
    Add {
        /// Carrier name
        name: String,
        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List carriers
    List {
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show carrier details
    Show {
        /// Carrier name or ID
        carrier: String,
    },

    /// Edit a carrier
    Edit {
        /// Carrier name or ID
        carrier: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete a carrier that no expense references
    Delete {
        /// Carrier name or ID
        carrier: String,
    },
}

pub fn handle_carrier_command(
    storage: &Storage,
    _settings: &Settings,
    cmd: CarrierCommands,
) -> GestionResult<()> {
    let service = CarrierService::new(storage);

    match cmd {
        CarrierCommands::Add { name, notes } => {
            let carrier = service.create(CarrierDraft {
                name,
                observations: notes,
            })?;
            println!("Created carrier: {}", carrier.name);
            println!("  ID: {}", carrier.id);
        }

        CarrierCommands::List { search } => {
            let filter = NameFilter {
                search,
                limit: None,
            };
            print!("{}", format_carrier_list(&service.list(&filter)?));
        }

        CarrierCommands::Show { carrier } => {
            print!("{}", format_carrier_details(&lookup(&service, &carrier)?));
        }

        CarrierCommands::Edit {
            carrier,
            name,
            notes,
        } => {
            let current = lookup(&service, &carrier)?;
            if name.is_none() && notes.is_none() {
                println!("No changes specified. Use --name or --notes.");
                return Ok(());
            }
            let updated = service.update(
                current.id,
                CarrierDraft {
                    name: name.unwrap_or(current.name),
                    observations: notes.or(current.observations),
                },
            )?;
            println!("Updated carrier: {}", updated.name);
        }

        CarrierCommands::Delete { carrier } => {
            let carrier = lookup(&service, &carrier)?;
            service.delete(carrier.id)?;
            println!("Deleted carrier: {}", carrier.name);
        }
    }

    Ok(())
}

pub(crate) fn lookup(service: &CarrierService, identifier: &str) -> GestionResult<Carrier> {
    service
        .find(identifier)?
        .ok_or_else(|| GestionError::not_found("Carrier", identifier))
}
