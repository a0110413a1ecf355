use std::path::PathBuf;

use thiserror::Error;

use crate::domain::book::BookId;

/// Requests the catalog refuses. None of these change inventory or cart state.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("book {book_id} was not found in the inventory")]
    NotFound { book_id: BookId },
    #[error("book {book_id} (`{title}`) is out of stock")]
    OutOfStock { book_id: BookId, title: String },
    #[error("book {book_id} (`{title}`) is already in the cart")]
    DuplicateInCart { book_id: BookId, title: String },
    #[error("cart is empty")]
    EmptyCart,
    #[error("cart total is too large to represent")]
    TotalOverflow,
    #[error("invalid username `{username}`: {reason}")]
    InvalidUsername { username: String, reason: String },
}

impl CatalogError {
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { .. } => "Book not found. Please enter a valid Book ID.".to_string(),
            Self::OutOfStock { .. } => {
                "Book is out of stock. Please select another book.".to_string()
            }
            Self::DuplicateInCart { title, .. } => format!("{title} is already in your cart."),
            Self::EmptyCart => {
                "Your cart is empty. Add books before placing an order.".to_string()
            }
            Self::TotalOverflow => {
                "Your cart total is too large to process. Remove a book and try again."
                    .to_string()
            }
            Self::InvalidUsername { reason, .. } => format!("Invalid name: {reason}."),
        }
    }
}

/// Shape problems found while loading the inventory store. Loading stops at
/// the first one and keeps the rows parsed before it.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MalformedStore {
    #[error("Invalid CSV file format: the store has no header row")]
    MissingHeader,
    #[error("Invalid CSV file format: unexpected header `{}`", .found.join(","))]
    HeaderMismatch { found: Vec<String> },
    #[error("Invalid data in CSV file at line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not access store `{path}`: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("could not encode or decode store `{path}`: {message}")]
    Encoding { path: PathBuf, message: String },
    #[error("malformed store `{path}` at line {line}: {reason}")]
    Malformed { path: PathBuf, line: u64, reason: String },
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("persistence failure: {0}")]
    Store(#[from] StoreError),
}

impl ApplicationError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Catalog(error) => error.user_message(),
            Self::Store(_) => "The bookstore data could not be saved or loaded.".to_string(),
        }
    }

    /// Store failures are not recoverable inside a session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}
