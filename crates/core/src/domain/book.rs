use std::fmt;

use rust_decimal::Decimal;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(pub u64);

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub price: Decimal,
}

impl Book {
    pub fn new(
        id: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self { id, title: title.into(), author: author.into(), price }
    }

    /// A book with a non-positive price is treated as out of stock.
    pub fn is_in_stock(&self) -> bool {
        self.price > Decimal::ZERO
    }

    /// Snapshot stored in a cart. Carts never carry the author.
    pub fn cart_copy(&self) -> Self {
        Self { id: self.id, title: self.title.clone(), author: String::new(), price: self.price }
    }
}
