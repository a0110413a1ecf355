use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use bookstore_core::config::{AppConfig, LoadOptions};
use bookstore_core::{
    validate_username, ApplicationError, BookId, CartStore, CatalogError, CatalogService,
    InventoryStore, ShopSession,
};
use bookstore_store::{csv_catalog_service, restore_from_backup, DataDir, RestoreOutcome};
use tracing::{error, info};

use crate::commands::load_config;
use crate::prompt::{ask, ask_number, ask_yes_no};
use crate::render::{cart_table, catalog_table, order_summary};

const MENU: &str = "Option 1 - View books in the bookstore \n\
Option 2 - View books in your cart\n\
Option 3 - Add books to your cart\n\
Option 4 - Place an order\n\
Option 5 - Exit the bookstore";
const INVALID_CHOICE: &str = "Invalid choice. Please enter a number from 1 to 5.";
const INVALID_NUMBER: &str = "Invalid input. Please enter a number.";
const GOODBYE: &str = "Exiting the Online Bookstore. Goodbye!";

#[derive(Clone, Debug, Default)]
pub struct ShopOptions {
    pub user: Option<String>,
    pub restore: bool,
}

pub fn run(load_options: LoadOptions, options: ShopOptions) -> u8 {
    let config = match load_config("shop", load_options) {
        Ok(config) => config,
        Err(failure) => {
            println!("{}", failure.output);
            return failure.exit_code;
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    match run_with_io(&config, &options, &mut stdin.lock(), &mut stdout.lock()) {
        Ok(()) => 0,
        Err(error) => {
            error!(
                event_name = "bookstore.session.aborted",
                error = %format!("{error:#}"),
                "shop session aborted"
            );
            eprintln!("bookstore: {error:#}");
            1
        }
    }
}

/// Restores the inventory backup when asked, then runs an interactive session
/// against the CSV stores in the configured data directory.
pub fn run_with_io<R: BufRead, W: Write>(
    config: &AppConfig,
    options: &ShopOptions,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    let data_dir = DataDir::open(&config.store.data_dir).context("opening data directory")?;

    if options.restore && config.store.restore_on_start {
        let outcome =
            restore_from_backup(&data_dir, &config.store.backup_file, &config.store.inventory_file)
                .context("restoring inventory from backup")?;
        match outcome {
            RestoreOutcome::Restored { .. } => writeln!(
                output,
                "{} successfully restored from backup.",
                config.store.inventory_file
            )?,
            RestoreOutcome::NoBackup => writeln!(
                output,
                "No backup found. Starting with a fresh {}.",
                config.store.inventory_file
            )?,
        }
    }

    let service = csv_catalog_service(&data_dir, &config.store.inventory_file);
    run_session(&service, options.user.as_deref(), input, output)
}

/// Drives the numbered menu until the shopper exits or input ends.
pub fn run_session<I, C, R, W>(
    service: &CatalogService<I, C>,
    user: Option<&str>,
    input: &mut R,
    output: &mut W,
) -> Result<()>
where
    I: InventoryStore,
    C: CartStore,
    R: BufRead,
    W: Write,
{
    writeln!(output, "WELCOME TO THE VIRTUAL BOOKSTORE !!!")?;

    let username = match user {
        Some(user) => validate_username(user).context("validating --user")?,
        None => match ask_username(input, output)? {
            Some(username) => username,
            None => return Ok(()),
        },
    };

    let (mut session, issue) = service.open_session(&username).context("opening session")?;
    if let Some(issue) = issue {
        writeln!(output, "{issue}")?;
    }

    loop {
        writeln!(output, "{}", "*".repeat(50))?;
        writeln!(output, "{MENU}")?;
        writeln!(output, "{}", "*".repeat(50))?;

        let Some(choice) = ask_number(input, output, "Enter your option (1-5): ", INVALID_CHOICE)?
        else {
            break;
        };

        match choice {
            1 => writeln!(output, "{}", catalog_table(&session.inventory))?,
            2 => writeln!(output, "{}", cart_table(&session.cart))?,
            3 => {
                if !add_books(service, &mut session, input, output)? {
                    break;
                }
            }
            4 => {
                place_order(service, &mut session, output)?;
                service.save_inventory(&session.inventory).context("saving inventory")?;
                let more = ask_yes_no(input, output, "Do you want to shop more? (y/n): ")?;
                if more != Some(true) {
                    writeln!(output, "{GOODBYE}")?;
                    return Ok(());
                }
            }
            5 => {
                writeln!(output, "{GOODBYE}")?;
                return Ok(());
            }
            _ => writeln!(output, "{INVALID_CHOICE}")?,
        }
    }

    info!(
        event_name = "bookstore.session.input_closed",
        username = %session.username(),
        "input ended; closing session"
    );
    Ok(())
}

fn ask_username<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Option<String>> {
    loop {
        let Some(answer) = ask(input, output, "Enter your name: ")? else {
            return Ok(None);
        };
        match validate_username(&answer) {
            Ok(username) => return Ok(Some(username)),
            Err(error) => writeln!(output, "{}", error.user_message())?,
        }
    }
}

/// Sub-loop of option 3. Returns `false` when input ended.
fn add_books<I, C, R, W>(
    service: &CatalogService<I, C>,
    session: &mut ShopSession,
    input: &mut R,
    output: &mut W,
) -> Result<bool>
where
    I: InventoryStore,
    C: CartStore,
    R: BufRead,
    W: Write,
{
    loop {
        let Some(raw_id) = ask_number(
            input,
            output,
            "Enter the Book ID of the book you want to add to your cart (or 0 to go back): ",
            INVALID_NUMBER,
        )?
        else {
            return Ok(false);
        };
        if raw_id == 0 {
            return Ok(true);
        }

        let Ok(id) = u64::try_from(raw_id) else {
            writeln!(output, "{}", CatalogError::NotFound { book_id: BookId(0) }.user_message())?;
            continue;
        };

        match service.add_to_cart(&mut session.cart, &mut session.inventory, BookId(id)) {
            Ok(book) => writeln!(output, "{} added to your cart.", book.title)?,
            Err(error) if error.is_fatal() => {
                return Err(error).context("adding book to cart");
            }
            Err(error) => writeln!(output, "{}", error.user_message())?,
        }
    }
}

fn place_order<I, C, W>(
    service: &CatalogService<I, C>,
    session: &mut ShopSession,
    output: &mut W,
) -> Result<()>
where
    I: InventoryStore,
    C: CartStore,
    W: Write,
{
    match service.place_order(&mut session.cart) {
        Ok(receipt) => writeln!(output, "{}", order_summary(&receipt))?,
        Err(ApplicationError::Catalog(error)) => writeln!(output, "{}", error.user_message())?,
        Err(error) => return Err(error).context("placing order"),
    }
    Ok(())
}
