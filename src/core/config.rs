//! Configuration module for `WizScholar`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Default CLI configuration loaded based on build profile.
/// Uses release defaults in release mode, debug defaults in debug mode.
#[cfg(not(debug_assertions))]
const CONFIG_DEFAULTS: &str = include_str!("../assets/DefaultCLIConfigRelease.toml");

#[cfg(debug_assertions)]
const CONFIG_DEFAULTS: &str = include_str!("../assets/DefaultCLIConfigDebug.toml");

#[cfg(not(debug_assertions))]
const CONFIG_FILE_NAME: &str = "config.toml";

#[cfg(debug_assertions)]
const CONFIG_FILE_NAME: &str = "dconfig.toml";

/// Variable expanded to the config directory inside string values
const DIR_VARIABLE: &str = "$WIZ_SCHOLAR";

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug)
    #[serde(default)]
    pub level: String,
    /// Log file path
    #[serde(default)]
    pub file: String,
    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,
}

/// Pipeline server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default)]
    pub host: String,
    /// Bind port
    #[serde(default)]
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Largest accepted upload in megabytes
    #[serde(default)]
    pub max_upload_mb: u64,
}

/// Storage provider (Cloudinary-compatible) configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Cloud name
    #[serde(default)]
    pub cloud_name: String,
    /// API key
    #[serde(default)]
    pub api_key: String,
    /// API secret used to sign uploads
    #[serde(default)]
    pub api_secret: String,
    /// Folder prefix for public ids
    #[serde(default)]
    pub folder: String,
    /// Upload API base URL
    #[serde(default)]
    pub api_base: String,
    /// Delivery base URL
    #[serde(default)]
    pub delivery_base: String,
}

/// AI service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Base URL of the summarization service
    #[serde(default)]
    pub endpoint: String,
    /// Per-request timeout in seconds
    #[serde(default)]
    pub timeout_secs: u64,
    /// Retry once on transport failure or 5xx
    #[serde(default = "default_true")]
    pub retry: bool,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_secs: 0,
            retry: true,
        }
    }
}

const fn default_true() -> bool {
    true
}

/// Grade calculator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Largest credit value accepted for one subject
    #[serde(default)]
    pub max_credits: f64,
}

/// Paths configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the local storage file
    #[serde(default)]
    pub data_dir: String,
    /// Directory for report output files
    #[serde(default)]
    pub reports_dir: String,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage provider settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// AI service settings
    #[serde(default)]
    pub ai: AiConfig,
    /// Calculator settings
    #[serde(default)]
    pub calculator: CalculatorConfig,
    /// Path settings
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Optional CLI overrides for configuration values
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override logging level
    pub level: Option<String>,
    /// Override log file path
    pub file: Option<String>,
    /// Override verbose flag
    pub verbose: Option<bool>,
    /// Override server bind address
    pub host: Option<String>,
    /// Override server port
    pub port: Option<u16>,
    /// Override AI service endpoint
    pub ai_endpoint: Option<String>,
    /// Override data directory
    pub data_dir: Option<String>,
    /// Override reports output directory
    pub reports_dir: Option<String>,
}

impl Config {
    /// Get the `$WIZ_SCHOLAR` directory path
    ///
    /// Returns:
    /// - Linux: `~/.config/wizscholar`
    /// - macOS: `~/Library/Application Support/wizscholar`
    /// - Windows: `%APPDATA%\wizscholar`
    #[must_use]
    pub fn get_wizscholar_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wizscholar")
    }

    /// Merge missing fields from defaults into this config
    ///
    /// Used when loading so that fields added in newer versions get their
    /// default value. Only empty (or zero) fields are filled in.
    ///
    /// # Returns
    ///
    /// `true` if any fields were added/changed, `false` otherwise
    #[allow(clippy::useless_let_if_seq)]
    pub fn merge_defaults(&mut self, defaults: &Self) -> bool {
        let mut changed = false;

        changed |= merge_str(&mut self.logging.level, &defaults.logging.level);
        changed |= merge_str(&mut self.logging.file, &defaults.logging.file);

        changed |= merge_str(&mut self.server.host, &defaults.server.host);
        if self.server.port == 0 && defaults.server.port != 0 {
            self.server.port = defaults.server.port;
            changed = true;
        }
        if self.server.max_upload_mb == 0 && defaults.server.max_upload_mb != 0 {
            self.server.max_upload_mb = defaults.server.max_upload_mb;
            changed = true;
        }

        changed |= merge_str(&mut self.storage.cloud_name, &defaults.storage.cloud_name);
        changed |= merge_str(&mut self.storage.api_key, &defaults.storage.api_key);
        changed |= merge_str(&mut self.storage.api_secret, &defaults.storage.api_secret);
        changed |= merge_str(&mut self.storage.folder, &defaults.storage.folder);
        changed |= merge_str(&mut self.storage.api_base, &defaults.storage.api_base);
        changed |= merge_str(
            &mut self.storage.delivery_base,
            &defaults.storage.delivery_base,
        );

        changed |= merge_str(&mut self.ai.endpoint, &defaults.ai.endpoint);
        if self.ai.timeout_secs == 0 && defaults.ai.timeout_secs != 0 {
            self.ai.timeout_secs = defaults.ai.timeout_secs;
            changed = true;
        }

        if self.calculator.max_credits <= 0.0 && defaults.calculator.max_credits > 0.0 {
            self.calculator.max_credits = defaults.calculator.max_credits;
            changed = true;
        }

        changed |= merge_str(&mut self.paths.data_dir, &defaults.paths.data_dir);
        changed |= merge_str(&mut self.paths.reports_dir, &defaults.paths.reports_dir);

        changed
    }

    /// Apply CLI-provided overrides onto the loaded configuration
    ///
    /// Overrides last for the current run only; the config file is untouched.
    /// Only non-`None` values replace config values.
    ///
    /// # Arguments
    ///
    /// * `overrides` - A `ConfigOverrides` struct with optional override values
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(level) = &overrides.level {
            self.logging.level.clone_from(level);
        }
        if let Some(file) = &overrides.file {
            self.logging.file.clone_from(file);
        }
        if let Some(verbose) = overrides.verbose {
            self.logging.verbose = verbose;
        }

        if let Some(host) = &overrides.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }

        if let Some(endpoint) = &overrides.ai_endpoint {
            self.ai.endpoint.clone_from(endpoint);
        }

        if let Some(data_dir) = &overrides.data_dir {
            self.paths.data_dir.clone_from(data_dir);
        }
        if let Some(reports_dir) = &overrides.reports_dir {
            self.paths.reports_dir.clone_from(reports_dir);
        }
    }

    /// Get the user config file path
    ///
    /// `config.toml` for release builds, `dconfig.toml` for debug builds, inside
    /// [`get_wizscholar_dir`](Self::get_wizscholar_dir).
    #[must_use]
    pub fn get_config_file_path() -> PathBuf {
        Self::get_wizscholar_dir().join(CONFIG_FILE_NAME)
    }

    /// Expand `$WIZ_SCHOLAR` in a string to the config directory
    #[must_use]
    fn expand_variables(value: &str) -> String {
        if value.contains(DIR_VARIABLE) {
            let dir = Self::get_wizscholar_dir();
            value.replace(DIR_VARIABLE, dir.to_str().unwrap_or("."))
        } else {
            value.to_string()
        }
    }

    /// Initialize config from a TOML string
    ///
    /// Expands `$WIZ_SCHOLAR` in path values. Missing fields take their serde
    /// defaults (empty strings, zero, false).
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML cannot be parsed or doesn't match the expected schema
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(toml_str)?;

        config.logging.file = Self::expand_variables(&config.logging.file);
        config.paths.data_dir = Self::expand_variables(&config.paths.data_dir);
        config.paths.reports_dir = Self::expand_variables(&config.paths.reports_dir);

        Ok(config)
    }

    /// Load configuration from embedded defaults
    ///
    /// Debug builds embed `DefaultCLIConfigDebug.toml`, release builds
    /// `DefaultCLIConfigRelease.toml`.
    ///
    /// # Panics
    /// Panics if the embedded default configuration is invalid TOML.
    #[must_use]
    pub fn from_defaults() -> Self {
        Self::from_toml(CONFIG_DEFAULTS).expect("Failed to parse compiled-in default configuration")
    }

    /// Load configuration from file, or create from defaults if not found
    ///
    /// - Existing file: loaded, missing fields merged from defaults and saved back
    /// - First run: the config directory and file are created from defaults
    ///
    /// Falls back to defaults if the file cannot be read or parsed.
    #[must_use]
    pub fn load() -> Self {
        let config_file = Self::get_config_file_path();
        let defaults = Self::from_defaults();

        if config_file.exists() {
            if let Ok(content) = fs::read_to_string(&config_file) {
                if let Ok(mut config) = Self::from_toml(&content) {
                    if config.merge_defaults(&defaults) {
                        let _ = config.save();
                    }
                    return config;
                }
            }
        } else {
            if let Some(parent) = config_file.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = defaults.save();
            return defaults;
        }

        defaults
    }

    /// Save configuration to file
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be created or the file
    /// cannot be written.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_file = Self::get_config_file_path();
        if let Some(parent) = config_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(&config_file, toml_str)?;
        Ok(())
    }

    /// Get a configuration value by key
    ///
    /// Keys are field names, optionally prefixed by their section
    /// (`port` or `server.port`); `-` and `_` are interchangeable. The AI
    /// endpoint is `endpoint` or `ai.endpoint`.
    ///
    /// # Returns
    /// `None` if the key is not recognized
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match field_name(key).as_str() {
            "level" => self.logging.level.clone(),
            "file" => self.logging.file.clone(),
            "verbose" => self.logging.verbose.to_string(),
            "host" => self.server.host.clone(),
            "port" => self.server.port.to_string(),
            "cors_origins" => self.server.cors_origins.join(","),
            "max_upload_mb" => self.server.max_upload_mb.to_string(),
            "cloud_name" => self.storage.cloud_name.clone(),
            "api_key" => self.storage.api_key.clone(),
            "api_secret" => self.storage.api_secret.clone(),
            "folder" => self.storage.folder.clone(),
            "api_base" => self.storage.api_base.clone(),
            "delivery_base" => self.storage.delivery_base.clone(),
            "endpoint" => self.ai.endpoint.clone(),
            "timeout_secs" => self.ai.timeout_secs.to_string(),
            "retry" => self.ai.retry.to_string(),
            "max_credits" => self.calculator.max_credits.to_string(),
            "data_dir" => self.paths.data_dir.clone(),
            "reports_dir" => self.paths.reports_dir.clone(),
            _ => return None,
        };
        Some(value)
    }

    /// Like [`get`](Config::get), with credentials masked
    #[must_use]
    pub fn get_masked(&self, key: &str) -> Option<String> {
        let value = self.get(key)?;
        Some(if Self::is_secret(key) { mask(&value) } else { value })
    }

    /// Whether `key` names a storage credential
    #[must_use]
    pub fn is_secret(key: &str) -> bool {
        matches!(field_name(key).as_str(), "api_key" | "api_secret")
    }

    /// Section a key belongs to (`logging`, `server`, ...), if the key is known
    #[must_use]
    pub fn section_of(key: &str) -> Option<&'static str> {
        let section = match field_name(key).as_str() {
            "level" | "file" | "verbose" => "logging",
            "host" | "port" | "cors_origins" | "max_upload_mb" => "server",
            "cloud_name" | "api_key" | "api_secret" | "folder" | "api_base"
            | "delivery_base" => "storage",
            "endpoint" | "timeout_secs" | "retry" => "ai",
            "max_credits" => "calculator",
            "data_dir" | "reports_dir" => "paths",
            _ => return None,
        };
        Some(section)
    }

    /// Set a configuration value by key
    ///
    /// Accepts the same keys as [`get`](Config::get). Lists (`cors_origins`) are
    /// comma-separated. Call [`save()`](Config::save) to persist changes.
    ///
    /// # Errors
    /// Returns an error if the key is not recognized or the value cannot be
    /// parsed for that key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match field_name(key).as_str() {
            "level" => self.logging.level = value.to_string(),
            "file" => self.logging.file = value.to_string(),
            "verbose" => self.logging.verbose = parse_value(key, value)?,
            "host" => self.server.host = value.to_string(),
            "port" => self.server.port = parse_value(key, value)?,
            "cors_origins" => {
                self.server.cors_origins = value
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "max_upload_mb" => self.server.max_upload_mb = parse_value(key, value)?,
            "cloud_name" => self.storage.cloud_name = value.to_string(),
            "api_key" => self.storage.api_key = value.to_string(),
            "api_secret" => self.storage.api_secret = value.to_string(),
            "folder" => self.storage.folder = value.to_string(),
            "api_base" => self.storage.api_base = value.to_string(),
            "delivery_base" => self.storage.delivery_base = value.to_string(),
            "endpoint" => self.ai.endpoint = value.to_string(),
            "timeout_secs" => self.ai.timeout_secs = parse_value(key, value)?,
            "retry" => self.ai.retry = parse_value(key, value)?,
            "max_credits" => {
                let max: f64 = parse_value(key, value)?;
                if !max.is_finite() || max <= 0.0 {
                    return Err(format!("'{key}' must be a positive number, got '{value}'"));
                }
                self.calculator.max_credits = max;
            }
            "data_dir" => self.paths.data_dir = value.to_string(),
            "reports_dir" => self.paths.reports_dir = value.to_string(),
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Unset a configuration value by key (reset to the value in `defaults`)
    ///
    /// Call [`save()`](Config::save) to persist changes.
    ///
    /// # Errors
    /// Returns an error if the key is not recognized.
    pub fn unset(&mut self, key: &str, defaults: &Self) -> Result<(), String> {
        match field_name(key).as_str() {
            "level" => self.logging.level.clone_from(&defaults.logging.level),
            "file" => self.logging.file.clone_from(&defaults.logging.file),
            "verbose" => self.logging.verbose = defaults.logging.verbose,
            "host" => self.server.host.clone_from(&defaults.server.host),
            "port" => self.server.port = defaults.server.port,
            "cors_origins" => self
                .server
                .cors_origins
                .clone_from(&defaults.server.cors_origins),
            "max_upload_mb" => self.server.max_upload_mb = defaults.server.max_upload_mb,
            "cloud_name" => self
                .storage
                .cloud_name
                .clone_from(&defaults.storage.cloud_name),
            "api_key" => self.storage.api_key.clone_from(&defaults.storage.api_key),
            "api_secret" => self
                .storage
                .api_secret
                .clone_from(&defaults.storage.api_secret),
            "folder" => self.storage.folder.clone_from(&defaults.storage.folder),
            "api_base" => self.storage.api_base.clone_from(&defaults.storage.api_base),
            "delivery_base" => self
                .storage
                .delivery_base
                .clone_from(&defaults.storage.delivery_base),
            "endpoint" => self.ai.endpoint.clone_from(&defaults.ai.endpoint),
            "timeout_secs" => self.ai.timeout_secs = defaults.ai.timeout_secs,
            "retry" => self.ai.retry = defaults.ai.retry,
            "max_credits" => self.calculator.max_credits = defaults.calculator.max_credits,
            "data_dir" => self.paths.data_dir.clone_from(&defaults.paths.data_dir),
            "reports_dir" => self
                .paths
                .reports_dir
                .clone_from(&defaults.paths.reports_dir),
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Reset all configuration to defaults
    ///
    /// Deletes the configuration file so the next [`load()`](Config::load)
    /// recreates it. Succeeds if the file does not exist.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be deleted.
    pub fn reset() -> Result<(), std::io::Error> {
        let config_file = Self::get_config_file_path();
        if config_file.exists() {
            fs::remove_file(config_file)?;
        }
        Ok(())
    }

    /// Data directory as a path
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.paths.data_dir)
    }

    /// Reports directory as a path
    #[must_use]
    pub fn reports_dir(&self) -> PathBuf {
        PathBuf::from(&self.paths.reports_dir)
    }

    /// Upload limit in bytes
    #[must_use]
    pub const fn max_upload_bytes(&self) -> u64 {
        self.server.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

/// Strip an optional section prefix and normalize dashes.
fn field_name(key: &str) -> String {
    key.rsplit('.').next().unwrap_or(key).replace('-', "_")
}

fn merge_str(target: &mut String, default: &str) -> bool {
    if target.is_empty() && !default.is_empty() {
        default.clone_into(target);
        true
    } else {
        false
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, String> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| format!("Invalid value for '{key}': '{value}'"))
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[logging]")?;
        writeln!(f, "  level = \"{}\"", self.logging.level)?;
        writeln!(f, "  file = \"{}\"", self.logging.file)?;
        writeln!(f, "  verbose = {}", self.logging.verbose)?;

        writeln!(f, "\n[server]")?;
        writeln!(f, "  host = \"{}\"", self.server.host)?;
        writeln!(f, "  port = {}", self.server.port)?;
        writeln!(f, "  cors_origins = {:?}", self.server.cors_origins)?;
        writeln!(f, "  max_upload_mb = {}", self.server.max_upload_mb)?;

        writeln!(f, "\n[storage]")?;
        writeln!(f, "  cloud_name = \"{}\"", self.storage.cloud_name)?;
        writeln!(f, "  api_key = \"{}\"", mask(&self.storage.api_key))?;
        writeln!(f, "  api_secret = \"{}\"", mask(&self.storage.api_secret))?;
        writeln!(f, "  folder = \"{}\"", self.storage.folder)?;
        writeln!(f, "  api_base = \"{}\"", self.storage.api_base)?;
        writeln!(f, "  delivery_base = \"{}\"", self.storage.delivery_base)?;

        writeln!(f, "\n[ai]")?;
        writeln!(f, "  endpoint = \"{}\"", self.ai.endpoint)?;
        writeln!(f, "  timeout_secs = {}", self.ai.timeout_secs)?;
        writeln!(f, "  retry = {}", self.ai.retry)?;

        writeln!(f, "\n[calculator]")?;
        writeln!(f, "  max_credits = {}", self.calculator.max_credits)?;

        writeln!(f, "\n[paths]")?;
        writeln!(f, "  data_dir = \"{}\"", self.paths.data_dir)?;
        writeln!(f, "  reports_dir = \"{}\"", self.paths.reports_dir)?;

        Ok(())
    }
}

/// Hide credentials when printing the config.
fn mask(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}
