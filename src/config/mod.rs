//! Configuration module for Gestion
//!
//! - XDG-compliant path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::GestionPaths;
pub use settings::{BackupRetention, Settings};
