use bookstore_core::config::LoadOptions;
use bookstore_store::{restore_from_backup, DataDir, RestoreOutcome};

use crate::commands::{load_config, CommandResult, EXIT_DATA_DIR, EXIT_STORE_IO};

pub fn run(options: LoadOptions) -> CommandResult {
    let config = match load_config("restore", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let data_dir = match DataDir::open(&config.store.data_dir) {
        Ok(data_dir) => data_dir,
        Err(error) => return CommandResult::failure(
                "restore",
                "data_dir",
                error.to_string(),
                EXIT_DATA_DIR,
            ),
    };

    match restore_from_backup(&data_dir, &config.store.backup_file, &config.store.inventory_file) {
        Ok(RestoreOutcome::Restored { bytes }) => CommandResult::success(
            "restore",
            format!(
                "{} restored from {} ({bytes} bytes)",
                config.store.inventory_file, config.store.backup_file
            ),
        ),
        Ok(RestoreOutcome::NoBackup) => CommandResult::success(
            "restore",
            format!("no backup found at {}; inventory left unchanged", config.store.backup_file),
        ),
        Err(error) => {
            CommandResult::failure("restore", "store_io", error.to_string(), EXIT_STORE_IO)
        }
    }
}
