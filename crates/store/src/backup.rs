use std::fs;
use std::io::ErrorKind;

use bookstore_core::StoreError;
use tracing::info;

use crate::DataDir;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored { bytes: u64 },
    NoBackup,
}

/// Copies `backup` over `inventory` inside the data directory. A missing
/// backup is not an error.
pub fn restore_from_backup(
    data_dir: &DataDir,
    backup: &str,
    inventory: &str,
) -> Result<RestoreOutcome, StoreError> {
    let from = data_dir.path(backup);
    let to = data_dir.path(inventory);

    match fs::copy(&from, &to) {
        Ok(bytes) => {
            info!(
                event_name = "bookstore.store.inventory_restored",
                backup = %from.display(),
                inventory = %to.display(),
                bytes,
                "inventory restored from backup"
            );
            Ok(RestoreOutcome::Restored { bytes })
        }
        Err(error) if error.kind() == ErrorKind::NotFound && !from.exists() => {
            info!(
                event_name = "bookstore.store.backup_absent",
                backup = %from.display(),
                "no inventory backup found"
            );
            Ok(RestoreOutcome::NoBackup)
        }
        Err(source) => Err(StoreError::Io { path: to, source }),
    }
}
