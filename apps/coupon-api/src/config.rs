//! # API Configuration
//!
//! Configuration management for the Coupon API service.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     COUPON_PORT=9000                                                   │
//! │     COUPON_DB_PATH=/var/lib/coupons/coupons.db                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $COUPON_CONFIG, or                                                 │
//! │     ~/.config/coupon-manager/api.toml (Linux)                          │
//! │     ~/Library/Application Support/com.coupon-manager.coupon-manager/   │
//! │       api.toml (macOS)                                                 │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     0.0.0.0:8000, ./coupons.db                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # api.toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8000
//! cors_origins = ["*"]
//!
//! [database]
//! path = "coupons.db"
//! max_connections = 5
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Server Settings
// =============================================================================

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address (default: 0.0.0.0 for all interfaces).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Listening port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed to call the API from a browser. `"*"` allows any.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl ServerSettings {
    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Whether any origin may call the API.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

// =============================================================================
// Database Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("coupons.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

// =============================================================================
// API Configuration
// =============================================================================

/// Complete configuration of the Coupon API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,
}

impl ApiConfig {
    /// Loads configuration: defaults, then the TOML file (if present), then
    /// environment overrides.
    ///
    /// `config_path` falls back to `$COUPON_CONFIG`, then the platform config
    /// directory.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// [`ApiConfig::load`] with variables read from `lookup` instead of the
    /// process environment.
    pub fn load_with<F>(config_path: Option<PathBuf>, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = config_path
            .or_else(|| lookup("COUPON_CONFIG").map(PathBuf::from))
            .or_else(Self::default_config_path);

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_overrides(lookup)?;
        config.validate()?;

        Ok(config)
    }

    /// Reads a TOML file over the defaults. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        info!(?path, "Loading API config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Applies `COUPON_*` overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("COUPON_BIND_ADDR") {
            debug!(bind_addr = %addr, "Overriding bind address from environment");
            self.server.bind_addr = addr;
        }

        if let Some(port) = lookup("COUPON_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("COUPON_PORT".to_string()))?;
        }

        if let Some(origins) = lookup("COUPON_CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(path) = lookup("COUPON_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = lookup("COUPON_DB_MAX_CONNECTIONS") {
            self.database.max_connections = max
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("COUPON_DB_MAX_CONNECTIONS".to_string()))?;
        }

        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("port must be greater than 0".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be at least 1".into(),
            ));
        }

        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database path must not be empty".into()));
        }

        Ok(())
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "coupon-manager", "coupon-manager")
            .map(|dirs| dirs.config_dir().join("api.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn temp_toml(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("coupon-api-{}-{name}.toml", std::process::id()))
    }

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.server.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.database.path, PathBuf::from("coupons.db"));
        assert_eq!(config.database.max_connections, 5);
        assert!(config.server.allows_any_origin());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ApiConfig = toml::from_str(
            r#"
            [server]
            port = 9090
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.bind_addr, "0.0.0.0");
        assert_eq!(config.database, DatabaseSettings::default());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ApiConfig::default();
        config
            .apply_overrides(env(&[
                ("COUPON_BIND_ADDR", "127.0.0.1"),
                ("COUPON_PORT", "8081"),
                ("COUPON_DB_PATH", "/tmp/c.db"),
                ("COUPON_DB_MAX_CONNECTIONS", "2"),
                ("COUPON_CORS_ORIGINS", "http://localhost:5173, https://admin.example.com"),
            ]))
            .unwrap();

        assert_eq!(config.server.bind_address(), "127.0.0.1:8081");
        assert_eq!(config.database.path, PathBuf::from("/tmp/c.db"));
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(
            config.server.cors_origins,
            vec!["http://localhost:5173", "https://admin.example.com"]
        );
        assert!(!config.server.allows_any_origin());
    }

    #[test]
    fn test_invalid_env_value() {
        let mut config = ApiConfig::default();
        let err = config
            .apply_overrides(env(&[("COUPON_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "COUPON_PORT"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = ApiConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        config.server.port = 8000;
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        config.database.max_connections = 1;
        config.database.path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = temp_toml("from-file");
        std::fs::write(
            &path,
            "[database]\npath = \"from-file.db\"\nmax_connections = 3\n",
        )
        .unwrap();

        let config = ApiConfig::load_with(Some(path.clone()), |_| None).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.database.path, PathBuf::from("from-file.db"));
        assert_eq!(config.database.max_connections, 3);
        assert_eq!(config.server, ServerSettings::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let path = temp_toml("env-over-file");
        std::fs::write(&path, "[server]\nport = 9090\n").unwrap();

        let config = ApiConfig::load_with(None, env(&[
            ("COUPON_CONFIG", path.to_str().unwrap()),
            ("COUPON_PORT", "9191"),
        ]))
        .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.server.port, 9191);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = temp_toml("missing");
        assert_eq!(ApiConfig::from_file(&path).unwrap(), ApiConfig::default());
    }
}
