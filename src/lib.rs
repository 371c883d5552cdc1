//! Gestion - bookkeeping for a small shop
//!
//! This library keeps a shop's catalogue (providers, categories, products),
//! its delivery parties (carriers, couriers) and its cash ledger (expenses,
//! incoming transfers, cash deposits) in a local SQLite database, and takes
//! and restores whole-store snapshot backups.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models and their validation rules
//! - `storage`: SQLite schema, repositories and referential checks
//! - `events`: Change notifications delivered after each commit
//! - `services`: Commands and queries over the store
//! - `audit`: Audit logging system
//! - `backup`: Snapshot backup, retention and restore
//! - `reports`: Cash balance and dashboard aggregates
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gestion::config::GestionPaths;
//! use gestion::events::EventBus;
//! use gestion::storage::Storage;
//!
//! let paths = GestionPaths::new()?;
//! let storage = Storage::open(paths, Arc::new(EventBus::new()))?;
//! ```

pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod events;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{GestionError, GestionResult};
