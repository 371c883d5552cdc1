//! Provider CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_provider_details, format_provider_list};
use crate::error::{GestionError, GestionResult};
use crate::models::{Provider, ProviderDraft};
use crate::services::ProviderService;
use crate::storage::{NameFilter, Storage};

/// Provider subcommands
#[derive(Subcommand)]
pub enum ProviderCommands {
    /// Add a provider
    Add {
        /// Provider name
        name: String,
        /// Contact phone
        #[arg(short, long)]
        phone: Option<String>,
        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List providers
    List {
        /// Only providers whose name contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show provider details
    Show {
        /// Provider name or ID
        provider: String,
    },

    /// Edit a provider
    Edit {
        /// Provider name or ID
        provider: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New phone
        #[arg(short, long)]
        phone: Option<String>,
        /// New notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete a provider that no product references
    Delete {
        /// Provider name or ID
        provider: String,
    },
}

pub fn handle_provider_command(
    storage: &Storage,
    _settings: &Settings,
    cmd: ProviderCommands,
) -> GestionResult<()> {
    let service = ProviderService::new(storage);

    match cmd {
        ProviderCommands::Add { name, phone, notes } => {
            let provider = service.create(ProviderDraft { name, phone, notes })?;
            println!("Created provider: {}", provider.name);
            println!("  ID: {}", provider.id);
        }

        ProviderCommands::List { search } => {
            let filter = NameFilter {
                search,
                limit: None,
            };
            print!("{}", format_provider_list(&service.list(&filter)?));
        }

        ProviderCommands::Show { provider } => {
            let provider = lookup(&service, &provider)?;
            print!("{}", format_provider_details(&provider));
        }

        ProviderCommands::Edit {
            provider,
            name,
            phone,
            notes,
        } => {
            let current = lookup(&service, &provider)?;
            if name.is_none() && phone.is_none() && notes.is_none() {
                println!("No changes specified. Use --name, --phone or --notes.");
                return Ok(());
            }

            let updated = service.update(
                current.id,
                ProviderDraft {
                    name: name.unwrap_or(current.name),
                    phone: phone.or(current.phone),
                    notes: notes.or(current.notes),
                },
            )?;
            println!("Updated provider: {}", updated.name);
        }

        ProviderCommands::Delete { provider } => {
            let provider = lookup(&service, &provider)?;
            service.delete(provider.id)?;
            println!("Deleted provider: {}", provider.name);
        }
    }

    Ok(())
}

pub(crate) fn lookup(service: &ProviderService, identifier: &str) -> GestionResult<Provider> {
    service
        .find(identifier)?
        .ok_or_else(|| GestionError::not_found("Provider", identifier))
}
