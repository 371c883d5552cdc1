//! Display formatting for terminal output
//!
//! Formatters return `String`s so the CLI decides where they go and tests
//! can check them directly. Amounts are printed with the configured
//! currency symbol.

pub mod catalog;
pub mod ledger;

pub use catalog::{
    format_carrier_details, format_carrier_list, format_category_details, format_category_list,
    format_courier_details, format_courier_list, format_product_details, format_product_list,
    format_provider_details, format_provider_list,
};
pub use ledger::{
    format_deposit_details, format_deposit_list, format_expense_details, format_expense_list,
    format_transfer_details, format_transfer_list,
};

/// Column width: the longest value, never narrower than the header
pub(crate) fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|v| v.chars().count())
        .max()
        .unwrap_or(0)
        .max(header.len())
}

pub(crate) fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}
