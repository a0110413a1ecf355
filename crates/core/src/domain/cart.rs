use rust_decimal::Decimal;

use crate::domain::book::{Book, BookId};
use crate::errors::CatalogError;

/// One user's pending purchases. Items are snapshots taken at add time and are
/// never linked back to inventory entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cart {
    username: String,
    items: Vec<Book>,
}

impl Cart {
    pub fn new(username: impl Into<String>) -> Self {
        Self { username: username.into(), items: Vec::new() }
    }

    pub fn with_items(username: impl Into<String>, items: Vec<Book>) -> Self {
        Self { username: username.into(), items }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn items(&self) -> &[Book] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, book_id: BookId) -> bool {
        self.items.iter().any(|item| item.id == book_id)
    }

    /// Exact sum of item prices, or `None` if it does not fit in a `Decimal`.
    pub fn total(&self) -> Option<Decimal> {
        self.items.iter().try_fold(Decimal::ZERO, |total, item| total.checked_add(item.price))
    }

    pub(crate) fn push(&mut self, item: Book) {
        self.items.push(item);
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}

/// Usernames name the per-user cart file, so they must be usable as a file
/// name component.
pub fn validate_username(raw: &str) -> Result<String, CatalogError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(CatalogError::InvalidUsername {
            username: raw.to_string(),
            reason: "username must not be empty".to_string(),
        });
    }
    if username.contains(['/', '\\']) || username.contains("..") {
        return Err(CatalogError::InvalidUsername {
            username: raw.to_string(),
            reason: "username must not contain path separators or `..`".to_string(),
        });
    }
    Ok(username.to_string())
}
