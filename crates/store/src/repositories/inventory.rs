use std::fs::{self, File};
use std::io::ErrorKind;

use bookstore_core::{
    Book, InventoryLoad, InventoryStore, MalformedStore, StoreError, INVENTORY_HEADER,
};
use csv::{ReaderBuilder, StringRecord, Writer};
use tracing::debug;

use super::{csv_error, io_error, parse_book_id, parse_price};
use crate::DataDir;

/// Inventory kept as a headed four-column CSV file inside the data directory.
#[derive(Clone, Debug)]
pub struct CsvInventoryStore {
    data_dir: DataDir,
}

impl CsvInventoryStore {
    pub fn new(data_dir: DataDir) -> Self {
        Self { data_dir }
    }
}

impl InventoryStore for CsvInventoryStore {
    fn load(&self, source: &str) -> Result<InventoryLoad, StoreError> {
        let path = self.data_dir.path(source);
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!(
                    event_name = "bookstore.store.inventory_absent",
                    path = %path.display(),
                    "inventory store does not exist yet"
                );
                return Ok(InventoryLoad::default());
            }
            Err(error) => return Err(io_error(&path, error)),
        };

        let mut reader =
            ReaderBuilder::new().has_headers(false).flexible(true).from_reader(raw.as_slice());
        let mut record = StringRecord::new();

        if blank_line_at(&raw, 0).is_some() {
            return Ok(InventoryLoad::truncated(
                Vec::new(),
                MalformedStore::HeaderMismatch { found: Vec::new() },
            ));
        }
        if !reader.read_record(&mut record).map_err(|error| csv_error(&path, error))? {
            return Ok(InventoryLoad::truncated(Vec::new(), MalformedStore::MissingHeader));
        }
        if !record.iter().eq(INVENTORY_HEADER) {
            let found = record.iter().map(str::to_string).collect();
            return Ok(InventoryLoad::truncated(
                Vec::new(),
                MalformedStore::HeaderMismatch { found },
            ));
        }

        let mut books = Vec::new();
        loop {
            // The reader skips empty lines; each one ends the load as an empty row.
            let next_start = reader.position().byte();
            if let Some(line) = blank_line_at(&raw, next_start) {
                return Ok(InventoryLoad::truncated(
                    books,
                    MalformedStore::InvalidRow { line, reason: "row has no columns".to_string() },
                ));
            }
            if !reader.read_record(&mut record).map_err(|error| csv_error(&path, error))? {
                break;
            }
            match parse_row(&record) {
                Ok(book) => books.push(book),
                Err(reason) => {
                    let line = line_of(&raw, next_start);
                    return Ok(InventoryLoad::truncated(
                        books,
                        MalformedStore::InvalidRow { line, reason },
                    ));
                }
            }
        }

        debug!(
            event_name = "bookstore.store.inventory_loaded",
            path = %path.display(),
            books = books.len(),
            "inventory store loaded"
        );
        Ok(InventoryLoad::complete(books))
    }

    fn save(&self, books: &[Book], destination: &str) -> Result<(), StoreError> {
        let path = self.data_dir.path(destination);
        let file = File::create(&path).map_err(|error| io_error(&path, error))?;
        let mut writer = Writer::from_writer(file);

        writer.write_record(INVENTORY_HEADER).map_err(|error| csv_error(&path, error))?;
        for book in books {
            writer
                .write_record([
                    book.id.to_string(),
                    book.title.clone(),
                    book.author.clone(),
                    book.price.to_string(),
                ])
                .map_err(|error| csv_error(&path, error))?;
        }
        writer.flush().map_err(|error| io_error(&path, error))?;

        debug!(
            event_name = "bookstore.store.inventory_written",
            path = %path.display(),
            books = books.len(),
            "inventory store rewritten"
        );
        Ok(())
    }
}

/// Start of the next line after `offset`. A record ended by `\r\n` stops the
/// reader between the two bytes.
fn line_start(raw: &[u8], offset: u64) -> usize {
    let offset = usize::try_from(offset).unwrap_or(raw.len()).min(raw.len());
    if offset > 0 && raw[offset - 1] == b'\r' && raw.get(offset) == Some(&b'\n') {
        offset + 1
    } else {
        offset
    }
}

/// 1-based line number of the line beginning at `offset`.
fn line_of(raw: &[u8], offset: u64) -> u64 {
    let start = line_start(raw, offset);
    raw[..start].iter().filter(|&&byte| byte == b'\n').count() as u64 + 1
}

/// Line number of an empty line beginning at `offset`, if there is one.
fn blank_line_at(raw: &[u8], offset: u64) -> Option<u64> {
    let start = line_start(raw, offset);
    matches!(raw.get(start), Some(b'\n' | b'\r')).then(|| line_of(raw, offset))
}

fn parse_row(record: &StringRecord) -> Result<Book, String> {
    if record.len() != INVENTORY_HEADER.len() {
        return Err(format!(
            "expected {} columns, found {}",
            INVENTORY_HEADER.len(),
            record.len()
        ));
    }

    let id = parse_book_id(&record[0])?;
    let price = parse_price(&record[3])?;
    Ok(Book::new(id, &record[1], &record[2], price))
}
