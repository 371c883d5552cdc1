//! Catalog display formatting
//!
//! Tables and detail views for providers, categories, products, carriers
//! and couriers.

use crate::models::{Carrier, Category, Courier, ProductListing, Provider};

use super::{column_width, or_dash};

/// Format providers as a table
pub fn format_provider_list(providers: &[Provider]) -> String {
    if providers.is_empty() {
        return "No providers found.\n".to_string();
    }

    let name_width = column_width("Provider", providers.iter().map(|p| p.name.as_str()));
    let mut output = String::new();
    output.push_str(&format!(
        "{:<width$}  {:<14}  {}\n",
        "Provider",
        "Phone",
        "ID",
        width = name_width
    ));
    output.push_str(&format!("{:-<width$}  {:-<14}  {:-<8}\n", "", "", "", width = name_width));

    for provider in providers {
        output.push_str(&format!(
            "{:<width$}  {:<14}  {}\n",
            provider.name,
            or_dash(provider.phone.as_deref()),
            provider.id,
            width = name_width
        ));
    }

    output
}

pub fn format_provider_details(provider: &Provider) -> String {
    let mut output = String::new();
    output.push_str(&format!("Provider: {}\n", provider.name));
    output.push_str(&format!("  ID:    {}\n", provider.id));
    output.push_str(&format!("  Phone: {}\n", or_dash(provider.phone.as_deref())));
    if let Some(notes) = &provider.notes {
        output.push_str(&format!("  Notes: {}\n", notes));
    }
    output
}

/// Format categories as a table
pub fn format_category_list(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories found.\n".to_string();
    }

    let name_width = column_width("Category", categories.iter().map(|c| c.name.as_str()));
    let mut output = String::new();
    output.push_str(&format!("{:<width$}  {}\n", "Category", "ID", width = name_width));
    output.push_str(&format!("{:-<width$}  {:-<8}\n", "", "", width = name_width));

    for category in categories {
        output.push_str(&format!(
            "{:<width$}  {}\n",
            category.name,
            category.id,
            width = name_width
        ));
    }

    output
}

pub fn format_category_details(category: &Category, product_count: usize) -> String {
    let mut output = String::new();
    output.push_str(&format!("Category: {}\n", category.name));
    output.push_str(&format!("  ID:       {}\n", category.id));
    output.push_str(&format!("  Products: {}\n", product_count));
    output
}

/// Format products with their provider and category names
pub fn format_product_list(products: &[ProductListing], symbol: &str) -> String {
    if products.is_empty() {
        return "No products found.\n".to_string();
    }

    let name_width = column_width("Product", products.iter().map(|p| p.product.name.as_str()));
    let provider_width = column_width(
        "Provider",
        products.iter().map(|p| or_dash(p.provider_name.as_deref())),
    );
    let category_width = column_width(
        "Category",
        products.iter().map(|p| or_dash(p.category_name.as_deref())),
    );

    let mut output = String::new();
    output.push_str(&format!(
        "{:<nw$}  {:>12}  {:<pw$}  {:<cw$}  {}\n",
        "Product",
        "Price",
        "Provider",
        "Category",
        "ID",
        nw = name_width,
        pw = provider_width,
        cw = category_width
    ));
    output.push_str(&format!(
        "{:-<nw$}  {:->12}  {:-<pw$}  {:-<cw$}  {:-<8}\n",
        "",
        "",
        "",
        "",
        "",
        nw = name_width,
        pw = provider_width,
        cw = category_width
    ));

    for listing in products {
        output.push_str(&format!(
            "{:<nw$}  {:>12}  {:<pw$}  {:<cw$}  {}\n",
            listing.product.name,
            listing.product.price.format_with_symbol(symbol),
            or_dash(listing.provider_name.as_deref()),
            or_dash(listing.category_name.as_deref()),
            listing.product.id,
            nw = name_width,
            pw = provider_width,
            cw = category_width
        ));
    }

    output
}

pub fn format_product_details(listing: &ProductListing, symbol: &str) -> String {
    let product = &listing.product;
    let mut output = String::new();
    output.push_str(&format!("Product: {}\n", product.name));
    output.push_str(&format!("  ID:       {}\n", product.id));
    output.push_str(&format!("  Price:    {}\n", product.price.format_with_symbol(symbol)));
    output.push_str(&format!("  Provider: {}\n", or_dash(listing.provider_name.as_deref())));
    output.push_str(&format!("  Category: {}\n", or_dash(listing.category_name.as_deref())));
    if let Some(observations) = &product.observations {
        output.push_str(&format!("  Notes:    {}\n", observations));
    }
    output
}

pub fn format_carrier_list(carriers: &[Carrier]) -> String {
    if carriers.is_empty() {
        return "No carriers found.\n".to_string();
    }

    let name_width = column_width("Carrier", carriers.iter().map(|c| c.name.as_str()));
    let mut output = String::new();
    output.push_str(&format!("{:<width$}  {}\n", "Carrier", "ID", width = name_width));
    output.push_str(&format!("{:-<width$}  {:-<8}\n", "", "", width = name_width));
    for carrier in carriers {
        output.push_str(&format!("{:<width$}  {}\n", carrier.name, carrier.id, width = name_width));
    }
    output
}

pub fn format_carrier_details(carrier: &Carrier) -> String {
    let mut output = String::new();
    output.push_str(&format!("Carrier: {}\n", carrier.name));
    output.push_str(&format!("  ID:    {}\n", carrier.id));
    if let Some(observations) = &carrier.observations {
        output.push_str(&format!("  Notes: {}\n", observations));
    }
    output
}

pub fn format_courier_list(couriers: &[Courier]) -> String {
    if couriers.is_empty() {
        return "No couriers found.\n".to_string();
    }

    let name_width = column_width("Courier", couriers.iter().map(|c| c.name.as_str()));
    let mut output = String::new();
    output.push_str(&format!(
        "{:<width$}  {:<14}  {}\n",
        "Courier",
        "Phone",
        "ID",
        width = name_width
    ));
    output.push_str(&format!("{:-<width$}  {:-<14}  {:-<8}\n", "", "", "", width = name_width));
    for courier in couriers {
        output.push_str(&format!(
            "{:<width$}  {:<14}  {}\n",
            courier.name,
            or_dash(courier.phone.as_deref()),
            courier.id,
            width = name_width
        ));
    }
    output
}

pub fn format_courier_details(courier: &Courier) -> String {
    let mut output = String::new();
    output.push_str(&format!("Courier: {}\n", courier.name));
    output.push_str(&format!("  ID:    {}\n", courier.id));
    output.push_str(&format!("  Phone: {}\n", or_dash(courier.phone.as_deref())));
    if let Some(observations) = &courier.observations {
        output.push_str(&format!("  Notes: {}\n", observations));
    }
    output
}
