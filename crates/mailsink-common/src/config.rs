//! Configuration for mailsink

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "MAILSINK_CONFIG";

/// Prefix for per-key environment overrides, e.g. `MAILSINK__SMTP__PORT=2526`
pub const ENV_PREFIX: &str = "MAILSINK";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// SMTP configuration
    #[serde(default)]
    pub smtp: SmtpConfig,

    /// API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database backend, only "sqlite" is supported
    #[serde(default = "default_db_backend")]
    pub backend: String,

    /// Database file path, `:memory:` for a throwaway database
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// Maximum connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: default_db_backend(),
            path: default_db_path(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
        }
    }
}

impl DatabaseConfig {
    /// In-memory SQLite database, used by tests
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::from(":memory:"),
            ..Self::default()
        }
    }

    /// Whether this configuration points at an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == ":memory:"
    }
}

fn default_db_backend() -> String {
    "sqlite".to_string()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("mailcatcher.db")
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

/// SMTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// Hostname used in the greeting and EHLO banner
    #[serde(default = "default_smtp_hostname")]
    pub hostname: String,

    /// Bind host
    #[serde(default = "default_smtp_host")]
    pub host: String,

    /// Listening port
    #[serde(default = "default_smtp_port")]
    pub port: u16,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            hostname: default_smtp_hostname(),
            host: default_smtp_host(),
            port: default_smtp_port(),
        }
    }
}

impl SmtpConfig {
    /// `host:port` string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_smtp_hostname() -> String {
    "smtp.localhost".to_string()
}

fn default_smtp_host() -> String {
    "0.0.0.0".to_string()
}

fn default_smtp_port() -> u16 {
    2525
}

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Serve the administrative API
    #[serde(default = "default_api_enabled")]
    pub enabled: bool,

    /// Bind host
    #[serde(default = "default_api_host")]
    pub host: String,

    /// API port
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Bearer token granting admin access (project management, all emails)
    #[serde(default)]
    pub admin_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: default_api_enabled(),
            host: default_api_host(),
            port: default_api_port(),
            admin_token: None,
        }
    }
}

impl ApiConfig {
    /// `host:port` string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_api_enabled() -> bool {
    true
}

fn default_api_host() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    8025
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "json" or "text"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Config {
    /// Load configuration from defaults, an optional file and the environment
    ///
    /// The file is the one named by `MAILSINK_CONFIG`, otherwise the first of
    /// `./mailsink.toml` and `/etc/mailsink/config.toml` that exists. A missing
    /// file is not an error. `MAILSINK__<SECTION>__<KEY>` variables override
    /// individual keys.
    pub fn load() -> crate::Result<Self> {
        let file = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Some(PathBuf::from(path)),
            None => [
                PathBuf::from("./mailsink.toml"),
                PathBuf::from("/etc/mailsink/config.toml"),
            ]
            .into_iter()
            .find(|path| path.exists()),
        };

        Self::load_from(file.as_deref())
    }

    /// Layer an optional file and the environment over the defaults
    pub fn load_from(file: Option<&Path>) -> crate::Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .and_then(|settings| settings.try_deserialize::<Config>())
            .map_err(|e| crate::Error::Config(format!("Failed to load config: {}", e)))
    }
}
