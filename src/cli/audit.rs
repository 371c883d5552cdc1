//! Audit log CLI command

use crate::error::GestionResult;
use crate::storage::Storage;

/// Print the most recent audit entries, oldest first
pub fn handle_audit_command(storage: &Storage, count: usize) -> GestionResult<()> {
    let entries = storage.audit().read_recent(count)?;

    if entries.is_empty() {
        println!("The audit log is empty.");
        return Ok(());
    }

    println!("Audit Log (last {})", entries.len());
    println!("=========");
    for entry in &entries {
        println!("{}", entry.format_human_readable());
    }
    Ok(())
}
