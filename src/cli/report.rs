//! CLI commands for reports

use chrono::Utc;

use crate::config::Settings;
use crate::error::GestionResult;
use crate::reports::{CashReport, DashboardSummary};
use crate::storage::Storage;

use super::RangeArgs;

/// Print the cash balance for a date window
pub fn handle_balance_command(
    storage: &Storage,
    settings: &Settings,
    range: RangeArgs,
) -> GestionResult<()> {
    let report = CashReport::generate(storage, range.to_range()?)?;
    print!("{}", report.format_terminal(&settings.currency_symbol));
    Ok(())
}

/// Print the dashboard summary as of now
pub fn handle_dashboard_command(storage: &Storage, settings: &Settings) -> GestionResult<()> {
    let summary = DashboardSummary::generate(storage, Utc::now())?;
    print!("{}", summary.format_terminal(&settings.currency_symbol));
    Ok(())
}
