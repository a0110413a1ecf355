pub mod commands;
pub mod logging;
pub mod prompt;
pub mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use bookstore_core::config::{ConfigOverrides, LoadOptions};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "bookstore",
    about = "Terminal bookstore: browse the catalog, fill a cart, place orders",
    long_about = "Browse a CSV-backed book inventory, keep a per-user cart and check out from an interactive menu.",
    after_help = "Examples:\n  bookstore shop --user alice\n  bookstore catalog\n  bookstore doctor --json"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    #[arg(long, global = true, help = "Path to a bookstore.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Directory holding the inventory and cart files")]
    data_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start an interactive shopping session")]
    Shop {
        #[arg(long, help = "Shop as this user instead of prompting for a name")]
        user: Option<String>,
        #[arg(long, help = "Do not restore the inventory from its backup before shopping")]
        no_restore: bool,
    },
    #[command(about = "Print the current inventory")]
    Catalog,
    #[command(about = "Copy the inventory backup over the inventory store")]
    Restore,
    #[command(
        about = "Inspect effective configuration values with source attribution"
    )]
    Config,
    #[command(about = "Validate config, data directory and inventory store readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

impl GlobalArgs {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                data_dir: self.data_dir.clone(),
                ..ConfigOverrides::default()
            },
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.global.load_options();

    let result = match cli.command {
        Command::Shop { user, no_restore } => {
            return ExitCode::from(commands::shop::run(
                options,
                commands::shop::ShopOptions { user, restore: !no_restore },
            ));
        }
        Command::Catalog => commands::catalog::run(options),
        Command::Restore => commands::restore::run(options),
        Command::Config => commands::CommandResult::text(commands::config::run(options)),
        Command::Doctor { json } => {
            commands::CommandResult::text(commands::doctor::run(options, json))
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
