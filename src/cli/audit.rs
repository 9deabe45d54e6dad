//! Audit log command

use crate::error::DompetResult;
use crate::storage::Storage;

/// Print the most recent audit entries, oldest first
pub fn handle_audit_command(storage: &Storage, limit: usize) -> DompetResult<()> {
    let entries = storage.audit().read_recent(limit)?;
    if entries.is_empty() {
        println!("The audit log is empty.");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", entry);
    }
    println!(
        "\nShowing {} of {} entries.",
        entries.len(),
        storage.audit().entry_count()?
    );
    Ok(())
}
