//! Ledger display formatting
//!
//! Expenses, transfers and cash deposits. Each list ends with its total so
//! a filtered listing doubles as a quick sum.

use crate::models::{CashDeposit, ExpenseListing, Money, Transfer};

use super::{column_width, or_dash};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_expense_list(expenses: &[ExpenseListing], symbol: &str) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let party_width = column_width("Carrier/Courier", expenses.iter().map(party));
    let mut output = String::new();
    output.push_str(&format!(
        "{:<10}  {:<8}  {:>12}  {:<pw$}  {}\n",
        "Date",
        "Type",
        "Amount",
        "Carrier/Courier",
        "ID",
        pw = party_width
    ));
    output.push_str(&format!(
        "{:-<10}  {:-<8}  {:->12}  {:-<pw$}  {:-<8}\n",
        "",
        "",
        "",
        "",
        "",
        pw = party_width
    ));

    for listing in expenses {
        let expense = &listing.expense;
        output.push_str(&format!(
            "{:<10}  {:<8}  {:>12}  {:<pw$}  {}\n",
            expense.occurred_at.format(DATE_FORMAT),
            expense.expense_type,
            expense.amount.format_with_symbol(symbol),
            party(listing),
            expense.id,
            pw = party_width
        ));
    }

    let total: Money = expenses.iter().map(|l| l.expense.amount).sum();
    output.push_str(&format!(
        "\n{} expense(s), total {}\n",
        expenses.len(),
        total.format_with_symbol(symbol)
    ));
    output
}

fn party(listing: &ExpenseListing) -> &str {
    listing
        .carrier_name
        .as_deref()
        .or(listing.courier_name.as_deref())
        .unwrap_or("-")
}

pub fn format_expense_details(listing: &ExpenseListing, symbol: &str) -> String {
    let expense = &listing.expense;
    let mut output = String::new();
    output.push_str(&format!("Expense: {}\n", expense.id));
    output.push_str(&format!("  Date:    {}\n", expense.occurred_at.format("%Y-%m-%d %H:%M UTC")));
    output.push_str(&format!("  Type:    {}\n", expense.expense_type));
    output.push_str(&format!("  Amount:  {}\n", expense.amount.format_with_symbol(symbol)));
    output.push_str(&format!("  Carrier: {}\n", or_dash(listing.carrier_name.as_deref())));
    output.push_str(&format!("  Courier: {}\n", or_dash(listing.courier_name.as_deref())));
    if let Some(observations) = &expense.observations {
        output.push_str(&format!("  Notes:   {}\n", observations));
    }
    output
}

pub fn format_transfer_list(transfers: &[Transfer], symbol: &str) -> String {
    if transfers.is_empty() {
        return "No transfers found.\n".to_string();
    }

    let account_width = column_width("Account", transfers.iter().map(|t| t.account_type.as_str()));
    let sender_width = column_width("Sender", transfers.iter().map(|t| t.sender_name.as_str()));
    let mut output = String::new();
    output.push_str(&format!(
        "{:<10}  {:<aw$}  {:<sw$}  {:>12}  {}\n",
        "Date",
        "Account",
        "Sender",
        "Amount",
        "ID",
        aw = account_width,
        sw = sender_width
    ));
    output.push_str(&format!(
        "{:-<10}  {:-<aw$}  {:-<sw$}  {:->12}  {:-<8}\n",
        "",
        "",
        "",
        "",
        "",
        aw = account_width,
        sw = sender_width
    ));

    for transfer in transfers {
        output.push_str(&format!(
            "{:<10}  {:<aw$}  {:<sw$}  {:>12}  {}\n",
            transfer.occurred_at.format(DATE_FORMAT),
            transfer.account_type,
            transfer.sender_name,
            transfer.amount.format_with_symbol(symbol),
            transfer.id,
            aw = account_width,
            sw = sender_width
        ));
    }

    let total: Money = transfers.iter().map(|t| t.amount).sum();
    output.push_str(&format!(
        "\n{} transfer(s), total {}\n",
        transfers.len(),
        total.format_with_symbol(symbol)
    ));
    output
}

pub fn format_transfer_details(transfer: &Transfer, symbol: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("Transfer: {}\n", transfer.id));
    output.push_str(&format!("  Date:    {}\n", transfer.occurred_at.format("%Y-%m-%d %H:%M UTC")));
    output.push_str(&format!("  Account: {}\n", transfer.account_type));
    output.push_str(&format!("  Sender:  {}\n", transfer.sender_name));
    output.push_str(&format!("  Amount:  {}\n", transfer.amount.format_with_symbol(symbol)));
    if let Some(observations) = &transfer.observations {
        output.push_str(&format!("  Notes:   {}\n", observations));
    }
    output
}

pub fn format_deposit_list(deposits: &[CashDeposit], symbol: &str) -> String {
    if deposits.is_empty() {
        return "No cash deposits found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!("{:<10}  {:>12}  {:<8}  {}\n", "Date", "Amount", "ID", "Notes"));
    output.push_str(&format!("{:-<10}  {:->12}  {:-<8}  {:-<5}\n", "", "", "", ""));

    for deposit in deposits {
        output.push_str(&format!(
            "{:<10}  {:>12}  {:<8}  {}\n",
            deposit.occurred_at.format(DATE_FORMAT),
            deposit.amount.format_with_symbol(symbol),
            deposit.id.to_string(),
            or_dash(deposit.observations.as_deref())
        ));
    }

    let total: Money = deposits.iter().map(|d| d.amount).sum();
    output.push_str(&format!(
        "\n{} deposit(s), total {}\n",
        deposits.len(),
        total.format_with_symbol(symbol)
    ));
    output
}

pub fn format_deposit_details(deposit: &CashDeposit, symbol: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("Cash deposit: {}\n", deposit.id));
    output.push_str(&format!("  Date:   {}\n", deposit.occurred_at.format("%Y-%m-%d %H:%M UTC")));
    output.push_str(&format!("  Amount: {}\n", deposit.amount.format_with_symbol(symbol)));
    if let Some(observations) = &deposit.observations {
        output.push_str(&format!("  Notes:  {}\n", observations));
    }
    output
}
