use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "bookstore.toml";
pub const NESTED_CONFIG_FILE: &str = "config/bookstore.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub inventory_file: String,
    pub backup_file: String,
    pub restore_on_start: bool,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub inventory_file: Option<String>,
    pub restore_on_start: Option<bool>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                data_dir: PathBuf::from("."),
                inventory_file: "books.csv".to_string(),
                backup_file: "books_backup.csv".to_string(),
                restore_on_start: true,
            },
            logging: LoggingConfig { level: "warn".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl StoreConfig {
    pub fn inventory_path(&self) -> PathBuf {
        self.data_dir.join(&self.inventory_file)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.data_dir.join(&self.backup_file)
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(store) = patch.store {
            if let Some(data_dir) = store.data_dir {
                self.store.data_dir = data_dir;
            }
            if let Some(inventory_file) = store.inventory_file {
                self.store.inventory_file = inventory_file;
            }
            if let Some(backup_file) = store.backup_file {
                self.store.backup_file = backup_file;
            }
            if let Some(restore_on_start) = store.restore_on_start {
                self.store.restore_on_start = restore_on_start;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("BOOKSTORE_DATA_DIR") {
            self.store.data_dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("BOOKSTORE_INVENTORY_FILE") {
            self.store.inventory_file = value;
        }
        if let Some(value) = read_env("BOOKSTORE_BACKUP_FILE") {
            self.store.backup_file = value;
        }
        if let Some(value) = read_env("BOOKSTORE_RESTORE_ON_START") {
            self.store.restore_on_start = parse_bool("BOOKSTORE_RESTORE_ON_START", &value)?;
        }

        let log_level =
            read_env("BOOKSTORE_LOGGING_LEVEL").or_else(|| read_env("BOOKSTORE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("BOOKSTORE_LOGGING_FORMAT").or_else(|| read_env("BOOKSTORE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(data_dir) = overrides.data_dir {
            self.store.data_dir = data_dir;
        }
        if let Some(inventory_file) = overrides.inventory_file {
            self.store.inventory_file = inventory_file;
        }
        if let Some(restore_on_start) = overrides.restore_on_start {
            self.store.restore_on_start = restore_on_start;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_store(&self.store)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(CONFIG_FILE_NAME), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_file_name(key: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Validation(format!("{key} must not be empty")));
    }
    if trimmed.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "{key} must be a file name inside store.data_dir, not a path"
        )));
    }
    if trimmed.starts_with("cart-") {
        return Err(ConfigError::Validation(format!(
            "{key} must not start with `cart-` (reserved for per-user carts)"
        )));
    }
    Ok(())
}

fn validate_store(store: &StoreConfig) -> Result<(), ConfigError> {
    if store.data_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation("store.data_dir must not be empty".to_string()));
    }

    validate_file_name("store.inventory_file", &store.inventory_file)?;
    validate_file_name("store.backup_file", &store.backup_file)?;

    if store.inventory_file.trim() == store.backup_file.trim() {
        return Err(ConfigError::Validation(
            "store.backup_file must differ from store.inventory_file".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    store: Option<StorePatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct StorePatch {
    data_dir: Option<PathBuf>,
    inventory_file: Option<String>,
    backup_file: Option<String>,
    restore_on_start: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_match_the_classic_file_layout() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.store.inventory_file == "books.csv", "default inventory is books.csv")?;
        ensure(
            config.store.backup_file == "books_backup.csv",
            "default backup is books_backup.csv",
        )?;
        ensure(config.store.restore_on_start, "restore on start is enabled by default")?;
        ensure(
            config.store.inventory_path() == PathBuf::from("./books.csv"),
            "inventory path joins data dir",
        )?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_BOOKSTORE_DIR", "/srv/bookstore");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("bookstore.toml");
            fs::write(
                &path,
                r#"
[store]
data_dir = "${TEST_BOOKSTORE_DIR}"
inventory_file = "catalog.csv"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.store.data_dir == PathBuf::from("/srv/bookstore"),
                "data dir should be interpolated from environment",
            )?;
            ensure(
                config.store.inventory_file == "catalog.csv",
                "inventory file should come from the file",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_BOOKSTORE_DIR"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BOOKSTORE_LOG_LEVEL", "debug");
        env::set_var("BOOKSTORE_LOG_FORMAT", "json");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "debug", "debug log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Json),
                "json logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["BOOKSTORE_LOG_LEVEL", "BOOKSTORE_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BOOKSTORE_BACKUP_FILE", "env_backup.csv");
        env::set_var("BOOKSTORE_RESTORE_ON_START", "false");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("bookstore.toml");
            fs::write(
                &path,
                r#"
[store]
data_dir = "from-file"
backup_file = "file_backup.csv"
restore_on_start = true

[logging]
level = "error"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    data_dir: Some(PathBuf::from("from-override")),
                    log_level: Some("info".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.store.data_dir == PathBuf::from("from-override"),
                "override data dir should win",
            )?;
            ensure(config.logging.level == "info", "overridden log level should be info")?;
            ensure(
                config.store.backup_file == "env_backup.csv",
                "env backup file should win over file and defaults",
            )?;
            ensure(!config.store.restore_on_start, "env restore flag should win over file")?;
            Ok(())
        })();

        clear_vars(&["BOOKSTORE_BACKUP_FILE", "BOOKSTORE_RESTORE_ON_START"]);
        result
    }

    #[test]
    fn validation_rejects_backup_equal_to_inventory() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BOOKSTORE_BACKUP_FILE", "books.csv");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("store.backup_file")
            );
            ensure(has_message, "validation failure should mention store.backup_file")
        })();

        clear_vars(&["BOOKSTORE_BACKUP_FILE"]);
        result
    }

    #[test]
    fn validation_rejects_paths_and_cart_prefixed_names() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        for name in ["../books.csv", "cart-admin.csv", "  "] {
            let result = AppConfig::load(LoadOptions {
                overrides: ConfigOverrides {
                    inventory_file: Some(name.to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            });
            ensure(
                matches!(
                    result,
                    Err(ConfigError::Validation(ref message))
                        if message.contains("store.inventory_file")
                ),
                "invalid inventory file names should be rejected",
            )?;
        }
        Ok(())
    }

    #[test]
    fn invalid_bool_override_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BOOKSTORE_RESTORE_ON_START", "sometimes");
        let result = AppConfig::load(LoadOptions::default());
        clear_vars(&["BOOKSTORE_RESTORE_ON_START"]);

        ensure(
            matches!(
                result,
                Err(ConfigError::InvalidEnvOverride { ref key, .. })
                    if key == "BOOKSTORE_RESTORE_ON_START"
            ),
            "invalid bool should surface as an env override error",
        )
    }

    #[test]
    fn missing_required_file_is_an_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("absent.toml");
        let result = AppConfig::load(LoadOptions {
            config_path: Some(path),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "a required but missing file should fail",
        )
    }
}
