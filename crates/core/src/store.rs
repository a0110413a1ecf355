use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::book::Book;
use crate::errors::{MalformedStore, StoreError};

/// Column header every inventory store starts with.
pub const INVENTORY_HEADER: [&str; 4] = ["Book ID", "Title", "Author", "Price"];

/// Result of reading an inventory store. `issue` is set when reading stopped
/// early; `books` then holds only the rows read before the problem.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InventoryLoad {
    pub books: Vec<Book>,
    pub issue: Option<MalformedStore>,
}

impl InventoryLoad {
    pub fn complete(books: Vec<Book>) -> Self {
        Self { books, issue: None }
    }

    pub fn truncated(books: Vec<Book>, issue: MalformedStore) -> Self {
        Self { books, issue: Some(issue) }
    }
}

pub trait InventoryStore: Send + Sync {
    /// Reads every book from `source`. A missing store yields an empty load.
    fn load(&self, source: &str) -> Result<InventoryLoad, StoreError>;

    /// Replaces the whole of `destination` with `books`.
    fn save(&self, books: &[Book], destination: &str) -> Result<(), StoreError>;
}

pub trait CartStore: Send + Sync {
    fn load(&self, username: &str) -> Result<Vec<Book>, StoreError>;
    fn save(&self, cart: &[Book], username: &str) -> Result<(), StoreError>;
    fn clear(&self, username: &str) -> Result<(), StoreError>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Clone, Default)]
pub struct InMemoryInventoryStore {
    stores: Arc<Mutex<HashMap<String, Vec<Book>>>>,
}

impl InMemoryInventoryStore {
    pub fn with_books(name: impl Into<String>, books: Vec<Book>) -> Self {
        let store = Self::default();
        lock(&store.stores).insert(name.into(), books);
        store
    }

    pub fn books(&self, name: &str) -> Option<Vec<Book>> {
        lock(&self.stores).get(name).cloned()
    }
}

impl InventoryStore for InMemoryInventoryStore {
    fn load(&self, source: &str) -> Result<InventoryLoad, StoreError> {
        let books = lock(&self.stores).get(source).cloned().unwrap_or_default();
        Ok(InventoryLoad::complete(books))
    }

    fn save(&self, books: &[Book], destination: &str) -> Result<(), StoreError> {
        lock(&self.stores).insert(destination.to_string(), books.to_vec());
        Ok(())
    }
}

/// Keeps the same lossy shape as the file-backed cart: author is not retained.
#[derive(Clone, Default)]
pub struct InMemoryCartStore {
    carts: Arc<Mutex<HashMap<String, Vec<Book>>>>,
}

impl InMemoryCartStore {
    pub fn contains(&self, username: &str) -> bool {
        lock(&self.carts).contains_key(username)
    }

    pub fn items(&self, username: &str) -> Option<Vec<Book>> {
        lock(&self.carts).get(username).cloned()
    }
}

impl CartStore for InMemoryCartStore {
    fn load(&self, username: &str) -> Result<Vec<Book>, StoreError> {
        Ok(lock(&self.carts).get(username).cloned().unwrap_or_default())
    }

    fn save(&self, cart: &[Book], username: &str) -> Result<(), StoreError> {
        let items = cart.iter().map(Book::cart_copy).collect();
        lock(&self.carts).insert(username.to_string(), items);
        Ok(())
    }

    fn clear(&self, username: &str) -> Result<(), StoreError> {
        lock(&self.carts).remove(username);
        Ok(())
    }
}
