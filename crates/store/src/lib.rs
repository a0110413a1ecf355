pub mod backup;
pub mod data_dir;
pub mod repositories;

pub use backup::{restore_from_backup, RestoreOutcome};
pub use data_dir::{cart_file_name, DataDir};
pub use repositories::{CsvCartStore, CsvInventoryStore};

use bookstore_core::CatalogService;

pub type CsvCatalogService = CatalogService<CsvInventoryStore, CsvCartStore>;

/// Wires both CSV stores over one data directory.
pub fn csv_catalog_service(data_dir: &DataDir, inventory_file: &str) -> CsvCatalogService {
    CatalogService::new(
        CsvInventoryStore::new(data_dir.clone()),
        CsvCartStore::new(data_dir.clone()),
        inventory_file,
    )
}
