
use crate::domain::book::{Book, BookId};

/// Ordered catalog of books. Lookups scan linearly and return the first match,
/// so a duplicated id shadows later entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    books: Vec<Book>,
}

impl Inventory {
    pub fn new(books: Vec<Book>) -> Self {
        Self { books }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn find(&self, book_id: BookId) -> Option<&Book> {
        self.books.iter().find(|book| book.id == book_id)
    }

    pub(crate) fn find_mut(&mut self, book_id: BookId) -> Option<&mut Book> {
        self.books.iter_mut().find(|book| book.id == book_id)
    }

    pub fn into_books(self) -> Vec<Book> {
        self.books
    }
}

impl From<Vec<Book>> for Inventory {
    fn from(books: Vec<Book>) -> Self {
        Self::new(books)
    }
}
