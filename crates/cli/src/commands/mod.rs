pub mod catalog;
pub mod config;
pub mod doctor;
pub mod restore;
pub mod shop;

use bookstore_core::config::{AppConfig, LoadOptions};
use serde::Serialize;
use serde_json::json;

use crate::logging::init_logging;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_DATA_DIR: u8 = 3;
pub const EXIT_STORE_IO: u8 = 4;
pub const EXIT_MALFORMED_STORE: u8 = 5;

/// What a one-shot command prints and the process exit code that goes with it.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum ReportStatus {
    Ok,
    Error,
}

/// JSON line emitted by commands that do not render a table.
#[derive(Debug, Serialize)]
struct StoreReport<'a> {
    command: &'a str,
    status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_class: Option<&'a str>,
    message: String,
}

impl CommandResult {
    pub fn text(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let report = StoreReport {
            command,
            status: ReportStatus::Ok,
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: report_line(&report) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let report = StoreReport {
            command,
            status: ReportStatus::Error,
            error_class: Some(error_class),
            message: message.into(),
        };
        Self { exit_code, output: report_line(&report) }
    }
}

fn report_line(report: &StoreReport<'_>) -> String {
    serde_json::to_string(report).unwrap_or_else(|error| {
        json!({
            "command": report.command,
            "status": "error",
            "error_class": "serialization",
            "message": error.to_string(),
        })
        .to_string()
    })
}

/// Loads config and installs logging, or returns the failure every command
/// reports for an invalid configuration.
pub(crate) fn load_config(command: &str, options: LoadOptions) -> Result<AppConfig, CommandResult> {
    match AppConfig::load(options) {
        Ok(config) => {
            init_logging(&config.logging);
            Ok(config)
        }
        Err(error) => Err(CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            EXIT_CONFIG,
        )),
    }
}
