//! Product CLI commands
//!
//! `--provider` and `--category` take an ID or a name. A name that matches
//! no row creates the parent along with the product.

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_product_details, format_product_list};
use crate::error::{GestionError, GestionResult};
use crate::models::{CategoryId, ParentRef, ProductDraft, ProductListing, ProviderId};
use crate::services::{CategoryService, ProductService, ProviderService};
use crate::storage::{ProductFilter, Storage};

use super::parse_money;

/// Product subcommands
#[derive(Subcommand)]
pub enum ProductCommands {
    /// Add a product
    Add {
        /// Product name
        name: String,
        /// Unit price (e.g., "49.99")
        #[arg(short, long)]
        price: String,
        /// Provider name or ID
        #[arg(long)]
        provider: Option<String>,
        /// Category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List products
    List {
        /// Only products whose name or notes contain this text
        #[arg(short, long)]
        search: Option<String>,
        /// Only products from this provider (name or ID)
        #[arg(long)]
        provider: Option<String>,
        /// Only products in this category (name or ID)
        #[arg(short, long)]
        category: Option<String>,
        /// Maximum number of rows
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show product details
    Show {
        /// Product name or ID
        product: String,
    },

    /// Edit a product
    Edit {
        /// Product name or ID
        product: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        price: Option<String>,
        #[arg(long)]
        provider: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete a product
    Delete {
        /// Product name or ID
        product: String,
    },
}

pub fn handle_product_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ProductCommands,
) -> GestionResult<()> {
    let service = ProductService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        ProductCommands::Add {
            name,
            price,
            provider,
            category,
            notes,
        } => {
            let draft = ProductDraft {
                name,
                price: parse_money("price", &price)?,
                provider: provider.as_deref().map(provider_ref),
                category: category.as_deref().map(category_ref),
                observations: notes,
            };
            let product = service.create(draft)?;
            let listing = lookup(&service, &product.id.to_string())?;
            println!("Created product: {}", product.name);
            print!("{}", format_product_details(&listing, symbol));
        }

        ProductCommands::List {
            search,
            provider,
            category,
            limit,
        } => {
            let provider_id = match provider {
                Some(p) => Some(super::provider::lookup(&ProviderService::new(storage), &p)?.id),
                None => None,
            };
            let category_id = match category {
                Some(c) => Some(
                    CategoryService::new(storage)
                        .find(&c)?
                        .ok_or_else(|| GestionError::not_found("Category", &c))?
                        .id,
                ),
                None => None,
            };

            let products = service.list(&ProductFilter {
                search,
                provider_id,
                category_id,
                limit,
            })?;
            print!("{}", format_product_list(&products, symbol));
        }

        ProductCommands::Show { product } => {
            print!("{}", format_product_details(&lookup(&service, &product)?, symbol));
        }

        ProductCommands::Edit {
            product,
            name,
            price,
            provider,
            category,
            notes,
        } => {
            let current = lookup(&service, &product)?.product;
            let draft = ProductDraft {
                name: name.unwrap_or(current.name),
                price: match price {
                    Some(p) => parse_money("price", &p)?,
                    None => current.price,
                },
                provider: provider
                    .as_deref()
                    .map(provider_ref)
                    .or(current.provider_id.map(ParentRef::Existing)),
                category: category
                    .as_deref()
                    .map(category_ref)
                    .or(current.category_id.map(ParentRef::Existing)),
                observations: notes.or(current.observations),
            };
            let updated = service.update(current.id, draft)?;
            println!("Updated product: {}", updated.name);
        }

        ProductCommands::Delete { product } => {
            let listing = lookup(&service, &product)?;
            service.delete(listing.product.id)?;
            println!("Deleted product: {}", listing.product.name);
        }
    }

    Ok(())
}

fn lookup(service: &ProductService, identifier: &str) -> GestionResult<ProductListing> {
    service
        .find(identifier)?
        .ok_or_else(|| GestionError::not_found("Product", identifier))
}

/// An ID refers to an existing provider; anything else is a name to find or create
fn provider_ref(input: &str) -> ParentRef<ProviderId> {
    match input.parse::<ProviderId>() {
        Ok(id) => ParentRef::Existing(id),
        Err(_) => ParentRef::ByName(input.to_string()),
    }
}

fn category_ref(input: &str) -> ParentRef<CategoryId> {
    match input.parse::<CategoryId>() {
        Ok(id) => ParentRef::Existing(id),
        Err(_) => ParentRef::ByName(input.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_refs() {
        assert_eq!(provider_ref("prv-3"), ParentRef::Existing(ProviderId::new(3)));
        assert_eq!(provider_ref("Acme"), ParentRef::ByName("Acme".into()));
        assert_eq!(category_ref("cat-1"), ParentRef::Existing(CategoryId::new(1)));
    }
}
