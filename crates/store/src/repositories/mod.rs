use std::path::Path;
use std::str::FromStr;

use bookstore_core::{BookId, StoreError};
use rust_decimal::Decimal;

pub mod cart;
pub mod inventory;

pub use cart::CsvCartStore;
pub use inventory::CsvInventoryStore;

pub(crate) fn csv_error(path: &Path, error: csv::Error) -> StoreError {
    let message = error.to_string();
    match error.into_kind() {
        csv::ErrorKind::Io(source) => StoreError::Io { path: path.to_path_buf(), source },
        _ => StoreError::Encoding { path: path.to_path_buf(), message },
    }
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io { path: path.to_path_buf(), source }
}

/// Ids are plain digit strings: no sign, no whitespace.
pub(crate) fn parse_book_id(field: &str) -> Result<BookId, String> {
    if field.is_empty() || !field.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(format!("book id `{field}` is not a number"));
    }
    field.parse::<u64>().map(BookId).map_err(|_| format!("book id `{field}` is out of range"))
}

pub(crate) fn parse_price(field: &str) -> Result<Decimal, String> {
    let trimmed = field.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| format!("price `{field}` is not a decimal number"))
}

#[cfg(test)]
mod tests {
    use bookstore_core::BookId;
    use rust_decimal::Decimal;

    use super::{parse_book_id, parse_price};

    #[test]
    fn book_ids_must_be_unsigned_digits() {
        assert_eq!(parse_book_id("42"), Ok(BookId(42)));
        assert_eq!(parse_book_id("007"), Ok(BookId(7)));
        assert_eq!(parse_book_id("4294967296"), Ok(BookId(4_294_967_296)));
        for bad in ["", "-1", "+3", " 4", "4a", "1.0", "99999999999999999999999"] {
            assert!(parse_book_id(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn prices_accept_plain_and_scientific_notation() {
        assert_eq!(parse_price("9.99"), Ok(Decimal::new(999, 2)));
        assert_eq!(parse_price(" 10.0 "), Ok(Decimal::new(100, 1)));
        assert_eq!(parse_price("-1.5"), Ok(Decimal::new(-15, 1)));
        assert_eq!(parse_price("1e-2"), Ok(Decimal::new(1, 2)));
        assert!(parse_price("free").is_err());
        assert!(parse_price("").is_err());
    }
}
