//! Cash Report
//!
//! Cash-box balance and breakdowns over a date range. Every figure is
//! recomputed from the current rows on each call.

use std::collections::BTreeMap;

use crate::error::GestionResult;
use crate::models::{ExpenseType, Money};
use crate::storage::{CashDepositRepository, ExpenseRepository, Storage, TransferRepository};

pub use crate::storage::DateRange;

/// Deposits minus expenses inside `range`
pub fn cash_balance(storage: &Storage, range: &DateRange) -> GestionResult<Money> {
    storage.db().read(|conn| {
        let deposits = CashDepositRepository::new(conn).total(range)?;
        let expenses = ExpenseRepository::new(conn).total(range)?;
        Ok(deposits - expenses)
    })
}

/// Expense totals per type; types with no expense in range are absent
pub fn expense_breakdown_by_type(
    storage: &Storage,
    range: &DateRange,
) -> GestionResult<BTreeMap<ExpenseType, Money>> {
    let totals = storage
        .db()
        .read(|conn| ExpenseRepository::new(conn).totals_by_type(range))?;
    Ok(totals.into_iter().collect())
}

/// Transfer totals per account label; accounts with no transfer in range are absent
pub fn transfer_breakdown_by_account(
    storage: &Storage,
    range: &DateRange,
) -> GestionResult<BTreeMap<String, Money>> {
    let totals = storage
        .db()
        .read(|conn| TransferRepository::new(conn).totals_by_account(range))?;
    Ok(totals.into_iter().collect())
}

pub fn expense_total(storage: &Storage, range: &DateRange) -> GestionResult<Money> {
    storage
        .db()
        .read(|conn| ExpenseRepository::new(conn).total(range))
}

pub fn deposit_total(storage: &Storage, range: &DateRange) -> GestionResult<Money> {
    storage
        .db()
        .read(|conn| CashDepositRepository::new(conn).total(range))
}

pub fn transfer_total(storage: &Storage, range: &DateRange) -> GestionResult<Money> {
    storage
        .db()
        .read(|conn| TransferRepository::new(conn).total(range))
}

/// Everything the `balance` command prints, read in one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashReport {
    pub range: DateRange,
    pub deposits: Money,
    pub expenses: Money,
    pub balance: Money,
    pub expenses_by_type: BTreeMap<ExpenseType, Money>,
    pub transfers: Money,
    pub transfers_by_account: BTreeMap<String, Money>,
}

impl CashReport {
    pub fn generate(storage: &Storage, range: DateRange) -> GestionResult<Self> {
        storage.db().read(|conn| {
            let deposits = CashDepositRepository::new(conn).total(&range)?;
            let expense_repo = ExpenseRepository::new(conn);
            let expenses = expense_repo.total(&range)?;
            let transfer_repo = TransferRepository::new(conn);

            Ok(Self {
                range,
                deposits,
                expenses,
                balance: deposits - expenses,
                expenses_by_type: expense_repo.totals_by_type(&range)?.into_iter().collect(),
                transfers: transfer_repo.total(&range)?,
                transfers_by_account: transfer_repo
                    .totals_by_account(&range)?
                    .into_iter()
                    .collect(),
            })
        })
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, symbol: &str) -> String {
        let mut output = String::new();

        let from = self
            .range
            .from
            .map_or_else(|| "beginning".to_string(), |d| d.format("%Y-%m-%d").to_string());
        let to = self
            .range
            .to
            .map_or_else(|| "now".to_string(), |d| d.format("%Y-%m-%d").to_string());
        output.push_str(&format!("Cash Report: {} to {}\n", from, to));
        output.push_str(&"=".repeat(50));
        output.push('\n');

        output.push_str(&format!(
            "{:<30} {:>18}\n",
            "Deposits",
            self.deposits.format_with_symbol(symbol)
        ));
        output.push_str(&format!(
            "{:<30} {:>18}\n",
            "Expenses",
            self.expenses.format_with_symbol(symbol)
        ));
        output.push_str(&"-".repeat(50));
        output.push('\n');
        output.push_str(&format!(
            "{:<30} {:>18}\n",
            "Balance",
            self.balance.format_with_symbol(symbol)
        ));

        if !self.expenses_by_type.is_empty() {
            output.push_str("\nExpenses by type\n");
            for (expense_type, amount) in &self.expenses_by_type {
                output.push_str(&format!(
                    "  {:<28} {:>18}\n",
                    expense_type.as_str(),
                    amount.format_with_symbol(symbol)
                ));
            }
        }

        if !self.transfers_by_account.is_empty() {
            output.push_str(&format!(
                "\nTransfers received: {}\n",
                self.transfers.format_with_symbol(symbol)
            ));
            for (account, amount) in &self.transfers_by_account {
                output.push_str(&format!(
                    "  {:<28} {:>18}\n",
                    account,
                    amount.format_with_symbol(symbol)
                ));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CashDepositDraft, ExpenseDraft, TransferDraft};
    use crate::services::{CashDepositService, ExpenseService, TransferService};
    use crate::storage::testing::{day, open_storage};

    #[test]
    fn test_balance_is_deposits_minus_expenses() {
        let (_temp, storage) = open_storage();
        CashDepositService::new(&storage)
            .create(CashDepositDraft::new(Money::from_cents(1_000_000), day(1)))
            .unwrap();
        ExpenseService::new(&storage)
            .create(ExpenseDraft::new(ExpenseType::Other, Money::from_cents(300_000), day(1)))
            .unwrap();

        assert_eq!(
            cash_balance(&storage, &DateRange::all()).unwrap(),
            Money::from_cents(700_000)
        );
    }

    #[test]
    fn test_breakdown_has_only_present_types() {
        let (_temp, storage) = open_storage();
        CashDepositService::new(&storage)
            .create(CashDepositDraft::new(Money::from_cents(500_000), day(1)))
            .unwrap();
        ExpenseService::new(&storage)
            .create(ExpenseDraft::new(ExpenseType::Freight, Money::from_cents(200_000), day(2)))
            .unwrap();

        let range = DateRange::between(day(1), day(2));
        assert_eq!(cash_balance(&storage, &range).unwrap(), Money::from_cents(300_000));

        let breakdown = expense_breakdown_by_type(&storage, &range).unwrap();
        assert_eq!(
            breakdown,
            BTreeMap::from([(ExpenseType::Freight, Money::from_cents(200_000))])
        );
    }

    #[test]
    fn test_empty_range_is_zero_not_error() {
        let (_temp, storage) = open_storage();
        ExpenseService::new(&storage)
            .create(ExpenseDraft::new(ExpenseType::Freight, Money::from_units(10), day(20)))
            .unwrap();

        let range = DateRange::between(day(1), day(2));
        assert_eq!(cash_balance(&storage, &range).unwrap(), Money::zero());
        assert!(expense_breakdown_by_type(&storage, &range).unwrap().is_empty());
        assert!(transfer_breakdown_by_account(&storage, &range).unwrap().is_empty());
    }

    #[test]
    fn test_range_applies_to_both_sides() {
        let (_temp, storage) = open_storage();
        let deposits = CashDepositService::new(&storage);
        deposits
            .create(CashDepositDraft::new(Money::from_units(100), day(1)))
            .unwrap();
        deposits
            .create(CashDepositDraft::new(Money::from_units(50), day(10)))
            .unwrap();
        ExpenseService::new(&storage)
            .create(ExpenseDraft::new(ExpenseType::Other, Money::from_units(30), day(2)))
            .unwrap();

        let range = DateRange::between(day(5), day(15));
        assert_eq!(cash_balance(&storage, &range).unwrap(), Money::from_units(50));
        assert_eq!(deposit_total(&storage, &range).unwrap(), Money::from_units(50));
        assert_eq!(expense_total(&storage, &range).unwrap(), Money::zero());
    }

    #[test]
    fn test_transfer_breakdown_by_account() {
        let (_temp, storage) = open_storage();
        let transfers = TransferService::new(&storage);
        transfers
            .create(TransferDraft::new(Money::from_units(10), "Nequi", "Ana", day(1)))
            .unwrap();
        transfers
            .create(TransferDraft::new(Money::from_units(15), "Nequi", "Luis", day(2)))
            .unwrap();
        transfers
            .create(TransferDraft::new(Money::from_units(7), "Bancolombia", "Ana", day(3)))
            .unwrap();

        let breakdown = transfer_breakdown_by_account(&storage, &DateRange::all()).unwrap();
        assert_eq!(breakdown.get("Nequi"), Some(&Money::from_units(25)));
        assert_eq!(breakdown.get("Bancolombia"), Some(&Money::from_units(7)));
        assert_eq!(breakdown.len(), 2);
        assert_eq!(
            transfer_total(&storage, &DateRange::all()).unwrap(),
            Money::from_units(32)
        );
    }

    #[test]
    fn test_report_format() {
        let (_temp, storage) = open_storage();
        CashDepositService::new(&storage)
            .create(CashDepositDraft::new(Money::from_units(500_000), day(1)))
            .unwrap();
        ExpenseService::new(&storage)
            .create(ExpenseDraft::new(ExpenseType::Freight, Money::from_units(200_000), day(2)))
            .unwrap();

        let report = CashReport::generate(&storage, DateRange::all()).unwrap();
        assert_eq!(report.balance, Money::from_units(300_000));

        let text = report.format_terminal("$");
        assert!(text.contains("Cash Report: beginning to now"));
        assert!(text.contains("$300,000.00"));
        assert!(text.contains("Freight"));
        assert!(!text.contains("Transfers received"));
    }
}
