use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::book::Book;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Itemized result of a checkout, returned for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub username: String,
    pub lines: Vec<Book>,
    pub total: Decimal,
    pub placed_at: DateTime<Utc>,
}

impl OrderReceipt {
    pub fn new(username: impl Into<String>, lines: Vec<Book>, total: Decimal) -> Self {
        Self {
            order_id: OrderId::generate(),
            username: username.into(),
            lines,
            total,
            placed_at: Utc::now(),
        }
    }
}
