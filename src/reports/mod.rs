//! Reports module for Gestion
//!
//! Read-side aggregates over the current store state: the cash balance with
//! its breakdowns, and the dashboard summary.

pub mod cash;
pub mod dashboard;

pub use cash::{
    cash_balance, deposit_total, expense_breakdown_by_type, expense_total,
    transfer_breakdown_by_account, transfer_total, CashReport, DateRange,
};
pub use dashboard::{DashboardSummary, DASHBOARD_WINDOW_DAYS, RECENT_ACTIVITY_LIMIT};
