use bookstore_core::config::LoadOptions;
use bookstore_store::{csv_catalog_service, DataDir};

use crate::commands::{load_config, CommandResult, EXIT_MALFORMED_STORE, EXIT_STORE_IO};
use crate::render::catalog_table;

/// Prints the inventory table; a malformed store is reported after the rows
/// that could be read.
pub fn run(options: LoadOptions) -> CommandResult {
    let config = match load_config("catalog", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let service = csv_catalog_service(
        &DataDir::new(&config.store.data_dir),
        &config.store.inventory_file,
    );
    match service.load_inventory() {
        Ok((inventory, None)) => CommandResult::text(catalog_table(&inventory)),
        Ok((inventory, Some(issue))) => CommandResult {
            exit_code: EXIT_MALFORMED_STORE,
            output: format!("{}\n{issue}", catalog_table(&inventory)),
        },
        Err(error) => {
            CommandResult::failure("catalog", "store_io", error.to_string(), EXIT_STORE_IO)
        }
    }
}
