use std::env;
use std::fs;
use std::path::Path;

use bookstore_core::config::{resolve_config_path, AppConfig, LoadOptions, LogFormat};
use toml::Value;

pub fn run(options: LoadOptions) -> String {
    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let flag_data_dir = options.overrides.data_dir.is_some();

    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines =
        vec!["effective config (source precedence: flag > env > file > default):".to_string()];

    let data_dir_source = if flag_data_dir {
        "flag (--data-dir)".to_string()
    } else {
        source("store.data_dir", &["BOOKSTORE_DATA_DIR"])
    };
    lines.push(render_line(
        "store.data_dir",
        &config.store.data_dir.display().to_string(),
        data_dir_source,
    ));
    lines.push(render_line(
        "store.inventory_file",
        &config.store.inventory_file,
        source("store.inventory_file", &["BOOKSTORE_INVENTORY_FILE"]),
    ));
    lines.push(render_line(
        "store.backup_file",
        &config.store.backup_file,
        source("store.backup_file", &["BOOKSTORE_BACKUP_FILE"]),
    ));
    lines.push(render_line(
        "store.restore_on_start",
        &config.store.restore_on_start.to_string(),
        source("store.restore_on_start", &["BOOKSTORE_RESTORE_ON_START"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["BOOKSTORE_LOGGING_LEVEL", "BOOKSTORE_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        format_name(config.logging.format),
        source("logging.format", &["BOOKSTORE_LOGGING_FORMAT", "BOOKSTORE_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn format_name(format: LogFormat) -> &'static str {
    match format {
        LogFormat::Compact => "compact",
        LogFormat::Pretty => "pretty",
        LogFormat::Json => "json",
    }
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
