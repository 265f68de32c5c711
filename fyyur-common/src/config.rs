//! Bootstrap configuration
//!
//! Values are resolved in priority order:
//! 1. Command-line argument or its environment variable (handled by the binary)
//! 2. TOML config file
//! 3. Compiled default
//!
//! A missing or unreadable TOML file is not fatal: the defaults are used and a
//! warning is handed back to the caller.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "FYYUR_CONFIG";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;

/// Configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Path to SQLite database file
    pub database_path: Option<PathBuf>,

    /// Interface to bind
    pub host: Option<String>,

    /// HTTP server port
    pub port: Option<u16>,

    /// Logging configuration (optional)
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive (e.g. "info", "fyyur_server=debug")
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Locate and load the config file, falling back to defaults
    ///
    /// Looks at `explicit`, then `FYYUR_CONFIG`, then the platform config
    /// directory. A named file that fails to load, or a default file that
    /// exists but cannot be read, yields defaults plus a warning for the
    /// caller to log once logging is up.
    pub fn discover(explicit: Option<&Path>) -> LoadedConfig {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let path = match named {
            Some(path) => path,
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return LoadedConfig::default(),
            },
        };

        match Self::load(&path) {
            Ok(file) => LoadedConfig {
                file,
                path: Some(path),
                warning: None,
            },
            Err(e) => LoadedConfig {
                file: Self::default(),
                path: None,
                warning: Some(format!(
                    "Could not load config file {}: {} (using defaults)",
                    path.display(),
                    e
                )),
            },
        }
    }
}

/// Result of [`TomlConfig::discover`]
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub file: TomlConfig,
    /// File the values came from, if any
    pub path: Option<PathBuf>,
    pub warning: Option<String>,
}

/// Platform config file location (`<config_dir>/fyyur/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fyyur").join("config.toml"))
}

/// OS-dependent compiled defaults
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let database_path = dirs::data_local_dir()
            .map(|d| d.join("fyyur"))
            .unwrap_or_else(|| PathBuf::from("./fyyur_data"))
            .join("fyyur.db");

        Self {
            database_path,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: default_log_level(),
        }
    }
}

/// Values given on the command line (or through their environment variables)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    pub fn resolve(
        overrides: ConfigOverrides,
        file: TomlConfig,
        defaults: CompiledDefaults,
    ) -> Self {
        let level = overrides.log_level.unwrap_or_else(|| {
            if file.logging.level.trim().is_empty() {
                defaults.log_level.clone()
            } else {
                file.logging.level.clone()
            }
        });

        Self {
            database_path: overrides
                .database_path
                .or(file.database_path)
                .unwrap_or(defaults.database_path),
            host: overrides.host.or(file.host).unwrap_or(defaults.host),
            port: overrides.port.or(file.port).unwrap_or(defaults.port),
            logging: LoggingConfig {
                level,
                file: file.logging.file,
            },
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
