//! Category CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_category_details, format_category_list};
use crate::error::{GestionError, GestionResult};
use crate::models::{Category, CategoryDraft};
use crate::services::{CategoryService, ProductService};
use crate::storage::{NameFilter, ProductFilter, Storage};

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Add a category
    Add {
        /// Category name (unique, ignoring case)
        name: String,
    },

    /// List categories
    List {
        /// Only categories whose name contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show category details
    Show {
        /// Category name or ID
        category: String,
    },

    /// Rename a category
    Rename {
        /// Category name or ID
        category: String,
        /// New name
        name: String,
    },

    /// Delete a category that no product references
    Delete {
        /// Category name or ID
        category: String,
    },
}

pub fn handle_category_command(
    storage: &Storage,
    _settings: &Settings,
    cmd: CategoryCommands,
) -> GestionResult<()> {
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::Add { name } => {
            let category = service.create(CategoryDraft::new(name))?;
            println!("Created category: {}", category.name);
            println!("  ID: {}", category.id);
        }

        CategoryCommands::List { search } => {
            let filter = NameFilter {
                search,
                limit: None,
            };
            print!("{}", format_category_list(&service.list(&filter)?));
        }

        CategoryCommands::Show { category } => {
            let category = lookup(&service, &category)?;
            let products = ProductService::new(storage).list(&ProductFilter {
                category_id: Some(category.id),
                ..ProductFilter::default()
            })?;
            print!("{}", format_category_details(&category, products.len()));
        }

        CategoryCommands::Rename { category, name } => {
            let current = lookup(&service, &category)?;
            let renamed = service.rename(current.id, CategoryDraft::new(name))?;
            println!("Renamed category: {} -> {}", current.name, renamed.name);
        }

        CategoryCommands::Delete { category } => {
            let category = lookup(&service, &category)?;
            service.delete(category.id)?;
            println!("Deleted category: {}", category.name);
        }
    }

    Ok(())
}

fn lookup(service: &CategoryService, identifier: &str) -> GestionResult<Category> {
    service
        .find(identifier)?
        .ok_or_else(|| GestionError::not_found("Category", identifier))
}
