use std::fs::{self, File};
use std::io::ErrorKind;

use bookstore_core::{Book, CartStore, StoreError};
use csv::{ReaderBuilder, StringRecord, Writer};
use tracing::debug;

use super::{csv_error, io_error, parse_book_id, parse_price};
use crate::DataDir;

const CART_COLUMNS: usize = 3;

/// Per-user cart files: `cart-<username>.csv`, no header, `id,title,price`.
/// Author is not written, so reloaded items always carry an empty author.
#[derive(Clone, Debug)]
pub struct CsvCartStore {
    data_dir: DataDir,
}

impl CsvCartStore {
    pub fn new(data_dir: DataDir) -> Self {
        Self { data_dir }
    }
}

impl CartStore for CsvCartStore {
    fn load(&self, username: &str) -> Result<Vec<Book>, StoreError> {
        let path = self.data_dir.cart_path(username);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(io_error(&path, error)),
        };

        let mut reader = ReaderBuilder::new().has_headers(false).flexible(true).from_reader(file);
        let mut items = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|error| csv_error(&path, error))?;
            let item = parse_row(&record).map_err(|reason| StoreError::Malformed {
                path: path.clone(),
                line: record.position().map(|position| position.line()).unwrap_or(0),
                reason,
            })?;
            items.push(item);
        }
        Ok(items)
    }

    fn save(&self, cart: &[Book], username: &str) -> Result<(), StoreError> {
        let path = self.data_dir.cart_path(username);
        let file = File::create(&path).map_err(|error| io_error(&path, error))?;
        let mut writer = Writer::from_writer(file);

        for item in cart {
            writer
                .write_record([item.id.to_string(), item.title.clone(), item.price.to_string()])
                .map_err(|error| csv_error(&path, error))?;
        }
        writer.flush().map_err(|error| io_error(&path, error))?;

        debug!(
            event_name = "bookstore.store.cart_written",
            path = %path.display(),
            items = cart.len(),
            "cart store rewritten"
        );
        Ok(())
    }

    fn clear(&self, username: &str) -> Result<(), StoreError> {
        let path = self.data_dir.cart_path(username);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(
                    event_name = "bookstore.store.cart_removed",
                    path = %path.display(),
                    "cart store removed"
                );
                Ok(())
            }
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(io_error(&path, error)),
        }
    }
}

fn parse_row(record: &StringRecord) -> Result<Book, String> {
    if record.len() != CART_COLUMNS {
        return Err(format!("expected {CART_COLUMNS} columns, found {}", record.len()));
    }

    let id = parse_book_id(&record[0])?;
    let price = parse_price(&record[2])?;
    Ok(Book::new(id, &record[1], "", price))
}
