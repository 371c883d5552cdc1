//! Core data models for Gestion
//!
//! One typed record per table, plus the draft types the command API accepts.
//! Records derive serde with `deny_unknown_fields` so that snapshot rows of an
//! unexpected shape are rejected at the deserialization boundary.

pub mod carrier;
pub mod cash_deposit;
pub mod category;
pub mod expense;
pub mod ids;
pub mod money;
pub mod product;
pub mod provider;
pub mod setting;
pub mod transfer;
pub mod validation;

pub use carrier::{Carrier, CarrierDraft, Courier, CourierDraft};
pub use cash_deposit::{CashDeposit, CashDepositDraft};
pub use category::{Category, CategoryDraft};
pub use expense::{Expense, ExpenseDraft, ExpenseListing, ExpenseType};
pub use ids::{
    CarrierId, CashDepositId, CategoryId, CourierId, ExpenseId, ProductId, ProviderId, TransferId,
};
pub use money::Money;
pub use product::{ParentRef, Product, ProductDraft, ProductListing};
pub use provider::{Provider, ProviderDraft};
pub use setting::{Setting, LAST_BACKUP_KEY};
pub use transfer::{Transfer, TransferDraft, KNOWN_ACCOUNT_TYPES};
pub use validation::ValidationError;
