//! Service layer for Gestion
//!
//! The services are the command and query API over the storage layer. Each
//! command validates its input before touching the database, runs its writes
//! in one transaction, appends an audit entry and then publishes the entity's
//! topic followed by `AnyDataChanged`.

pub mod carrier;
pub mod cash_deposit;
pub mod category;
pub mod courier;
pub mod expense;
pub mod product;
pub mod provider;
pub mod setting;
pub mod transfer;

pub use carrier::CarrierService;
pub use cash_deposit::CashDepositService;
pub use category::CategoryService;
pub use courier::CourierService;
pub use expense::ExpenseService;
pub use product::ProductService;
pub use provider::ProviderService;
pub use setting::SettingService;
pub use transfer::TransferService;
