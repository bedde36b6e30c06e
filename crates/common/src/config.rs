//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Federation configuration.
    #[serde(default)]
    pub federation: FederationConfig,
    /// Plugin configuration.
    #[serde(default)]
    pub plugins: PluginsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
///
/// The relational backend is optional: without a URL the SQL database
/// plugin is skipped during discovery.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
        }
    }
}

/// Federation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FederationConfig {
    /// Whether federation routes are mounted.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Instance name.
    #[serde(default = "default_instance_name")]
    pub instance_name: String,
    /// RSA modulus size for newly provisioned actor keys.
    #[serde(default = "default_key_bits")]
    pub key_bits: usize,
}

impl Default for FederationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            instance_name: default_instance_name(),
            key_bits: default_key_bits(),
        }
    }
}

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginsConfig {
    /// Directory holding one `<plugin id>/settings.json` per plugin.
    #[serde(default = "default_settings_dir")]
    pub settings_dir: PathBuf,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            settings_dir: default_settings_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_true() -> bool {
    true
}

fn default_instance_name() -> String {
    "LinkGator".to_string()
}

const fn default_key_bits() -> usize {
    2048
}

fn default_settings_dir() -> PathBuf {
    PathBuf::from("plugins")
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, exported into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `LINKGATOR_ENV`)
    /// 4. Environment variables with `LINKGATOR__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        // A missing .env file is the normal case in production
        let _ = dotenvy::dotenv();

        let env = std::env::var("LINKGATOR_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("LINKGATOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("LINKGATOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Minimal configuration for the given public URL, all else defaulted.
    #[must_use]
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                url: url.into(),
            },
            database: DatabaseConfig::default(),
            federation: FederationConfig::default(),
            plugins: PluginsConfig::default(),
        }
    }
}
