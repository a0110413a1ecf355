pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod store;

pub use catalog::{CatalogService, ShopSession, ADD_TO_CART_PRICE_ADJUSTMENT};
pub use domain::book::{Book, BookId};
pub use domain::cart::{validate_username, Cart};
pub use domain::inventory::Inventory;
pub use domain::order::{OrderId, OrderReceipt};
pub use errors::{ApplicationError, CatalogError, MalformedStore, StoreError};
pub use store::{
    CartStore, InMemoryCartStore, InMemoryInventoryStore, InventoryLoad, InventoryStore,
    INVENTORY_HEADER,
};
