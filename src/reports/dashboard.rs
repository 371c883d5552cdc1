//! Dashboard Summary
//!
//! Headline figures for the shop: catalogue size and value, the last 30 days
//! of expenses and transfers, and a short feed of recent activity.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::GestionResult;
use crate::models::{ExpenseListing, ExpenseType, Money, ProductListing, Transfer};
use crate::storage::{
    CategoryRepository, DateRange, ExpenseRepository, ProductRepository, ProviderRepository,
    Storage, TransferRepository,
};

/// Days covered by the expense and transfer figures
pub const DASHBOARD_WINDOW_DAYS: u64 = 30;

/// Rows per recent-activity list
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub struct DashboardSummary {
    pub generated_at: DateTime<Utc>,
    pub window: DateRange,
    pub product_count: i64,
    pub catalogue_value: Money,
    pub provider_count: i64,
    pub category_count: i64,
    pub expense_count: i64,
    pub expense_total: Money,
    pub expenses_by_type: BTreeMap<ExpenseType, Money>,
    pub transfer_count: i64,
    pub transfer_total: Money,
    pub transfers_by_account: BTreeMap<String, Money>,
    pub recent_products: Vec<ProductListing>,
    pub recent_expenses: Vec<ExpenseListing>,
    pub recent_transfers: Vec<Transfer>,
}

impl DashboardSummary {
    pub fn generate(storage: &Storage, now: DateTime<Utc>) -> GestionResult<Self> {
        let window = DateRange::last_days(DASHBOARD_WINDOW_DAYS, now);

        storage.db().read(|conn| {
            let products = ProductRepository::new(conn);
            let expenses = ExpenseRepository::new(conn);
            let transfers = TransferRepository::new(conn);

            Ok(Self {
                generated_at: now,
                window,
                product_count: products.count()?,
                catalogue_value: products.total_value()?,
                provider_count: ProviderRepository::new(conn).count()?,
                category_count: CategoryRepository::new(conn).count()?,
                expense_count: expenses.count(&window)?,
                expense_total: expenses.total(&window)?,
                expenses_by_type: expenses.totals_by_type(&window)?.into_iter().collect(),
                transfer_count: transfers.count(&window)?,
                transfer_total: transfers.total(&window)?,
                transfers_by_account: transfers.totals_by_account(&window)?.into_iter().collect(),
                recent_products: products.recent(RECENT_ACTIVITY_LIMIT)?,
                recent_expenses: expenses.recent(RECENT_ACTIVITY_LIMIT)?,
                recent_transfers: transfers.recent(RECENT_ACTIVITY_LIMIT)?,
            })
        })
    }

    /// Format the summary for terminal display
    pub fn format_terminal(&self, symbol: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Dashboard ({})\n",
            self.generated_at.format("%Y-%m-%d %H:%M")
        ));
        output.push_str(&"=".repeat(60));
        output.push('\n');

        output.push_str(&format!(
            "Products: {:<8} Catalogue value: {}\n",
            self.product_count,
            self.catalogue_value.format_with_symbol(symbol)
        ));
        output.push_str(&format!(
            "Providers: {:<7} Categories: {}\n\n",
            self.provider_count, self.category_count
        ));

        output.push_str(&format!("Last {} days\n", DASHBOARD_WINDOW_DAYS));
        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "Expenses: {} totalling {}\n",
            self.expense_count,
            self.expense_total.format_with_symbol(symbol)
        ));
        for (expense_type, amount) in &self.expenses_by_type {
            output.push_str(&format!(
                "  {:<20} {:>18}\n",
                expense_type.as_str(),
                amount.format_with_symbol(symbol)
            ));
        }
        output.push_str(&format!(
            "Transfers: {} totalling {}\n",
            self.transfer_count,
            self.transfer_total.format_with_symbol(symbol)
        ));
        for (account, amount) in &self.transfers_by_account {
            output.push_str(&format!(
                "  {:<20} {:>18}\n",
                account,
                amount.format_with_symbol(symbol)
            ));
        }

        if !self.recent_products.is_empty() {
            output.push_str("\nRecent products\n");
            for listing in &self.recent_products {
                output.push_str(&format!(
                    "  {:<30} {:>18}\n",
                    listing.product.name,
                    listing.product.price.format_with_symbol(symbol)
                ));
            }
        }

        if !self.recent_expenses.is_empty() {
            output.push_str("\nRecent expenses\n");
            for listing in &self.recent_expenses {
                let expense = &listing.expense;
                output.push_str(&format!(
                    "  {} {:<19} {:>18}\n",
                    expense.occurred_at.format("%Y-%m-%d"),
                    expense.expense_type.as_str(),
                    expense.amount.format_with_symbol(symbol)
                ));
            }
        }

        if !self.recent_transfers.is_empty() {
            output.push_str("\nRecent transfers\n");
            for transfer in &self.recent_transfers {
                output.push_str(&format!(
                    "  {} {:<19} {:>18}\n",
                    transfer.occurred_at.format("%Y-%m-%d"),
                    transfer.account_type,
                    transfer.amount.format_with_symbol(symbol)
                ));
            }
        }

        output
    }
}
