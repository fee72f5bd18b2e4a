//! Configuration for Dualgate

use crate::{Error, Result, USERNAME_PLACEHOLDER};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DualgateConfig {
    /// Debug mode; the only mode in which bypass flags are accepted
    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub directory: DirectoryConfig,

    #[serde(default)]
    pub second_factor: SecondFactorConfig,

    #[serde(default)]
    pub bypass: BypassFlags,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DualgateConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        debug!("Loading configuration from {}", path);
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Configuration(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config: {}", e)))
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay `DUALGATE_*` environment variables onto this configuration
    pub fn apply_env(&mut self) {
        if let Some(debug) = env_flag("DUALGATE_DEBUG") {
            self.debug = debug;
        }

        // Directory
        if let Ok(host) = std::env::var("DUALGATE_DIRECTORY_HOST") {
            self.directory.host = host;
        }
        if let Ok(port) = std::env::var("DUALGATE_DIRECTORY_PORT") {
            if let Ok(p) = port.parse() {
                self.directory.port = p;
            }
        }
        if let Some(tls) = env_flag("DUALGATE_DIRECTORY_TLS") {
            self.directory.use_tls = tls;
        }
        if let Ok(template) = std::env::var("DUALGATE_DIRECTORY_BIND_TEMPLATE") {
            self.directory.bind_template = template;
        }

        // Second factor
        if let Ok(secret) = std::env::var("DUALGATE_SECOND_FACTOR_SECRET") {
            self.second_factor.secret = secret;
        }
        if let Ok(server) = std::env::var("DUALGATE_SECOND_FACTOR_SERVER") {
            self.second_factor.server = server;
        }

        // Bypass flags
        if let Some(skip) = env_flag("DUALGATE_SKIP_DIRECTORY") {
            self.bypass.directory = skip;
        }
        if let Some(skip) = env_flag("DUALGATE_SKIP_SECOND_FACTOR") {
            self.bypass.second_factor = skip;
        }

        if let Ok(url) = std::env::var("DUALGATE_DATABASE_URL") {
            self.store.database_url = url;
        }
        if let Ok(level) = std::env::var("DUALGATE_LOG_LEVEL") {
            self.logging.level = level;
        }

        debug!(
            "Environment overrides applied: debug={}, directory={}:{}",
            self.debug, self.directory.host, self.directory.port
        );
    }

    /// Validate every section; the error names the first offending setting
    pub fn validate(&self) -> Result<()> {
        self.second_factor.validate()?;
        self.directory.validate()?;
        self.bypass.validate(self.debug)?;
        Ok(())
    }

    /// Bypass flags that are actually in effect
    pub fn effective_bypass(&self) -> BypassFlags {
        if self.debug {
            self.bypass
        } else {
            BypassFlags::default()
        }
    }
}

fn env_flag(var: &str) -> Option<bool> {
    std::env::var(var)
        .ok()
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

/// Directory service connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Directory host name or address
    pub host: String,
    /// Directory port; 0 means unset
    pub port: u16,
    /// Connect with ldaps:// instead of ldap://
    pub use_tls: bool,
    /// Bind identity template, `{username}` is replaced by the user name
    /// Example: "RC\\{username}" or "uid={username},ou=people,dc=example,dc=com"
    pub bind_template: String,
    /// Bounds connection establishment only
    pub connect_timeout_secs: u64,
    /// Bounds the bind exchange; unbounded when absent
    pub bind_timeout_secs: Option<u64>,
    /// Total bind attempts, including the first
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub retry_delay_ms: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 0,
            use_tls: false,
            bind_template: USERNAME_PLACEHOLDER.to_string(),
            connect_timeout_secs: 5,
            bind_timeout_secs: None,
            max_attempts: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl DirectoryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Configuration(
                "directory.host must be defined".into(),
            ));
        }
        if self.port == 0 {
            return Err(Error::Configuration(
                "directory.port must be defined".into(),
            ));
        }
        if !self.bind_template.contains(USERNAME_PLACEHOLDER) {
            return Err(Error::Configuration(format!(
                "directory.bind_template must contain {} placeholder",
                USERNAME_PLACEHOLDER
            )));
        }
        if self.max_attempts == 0 {
            return Err(Error::Configuration(
                "directory.max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Build the bind identity for a user
    pub fn bind_identity(&self, username: &str) -> String {
        self.bind_template.replace(USERNAME_PLACEHOLDER, username)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn bind_timeout(&self) -> Option<Duration> {
        self.bind_timeout_secs.map(Duration::from_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Second factor service settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondFactorConfig {
    /// Shared secret
    pub secret: String,
    /// Server address as host:port
    pub server: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SecondFactorConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            server: String::new(),
            timeout_secs: 5,
        }
    }
}

impl std::fmt::Debug for SecondFactorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecondFactorConfig")
            .field("secret", &"<redacted>")
            .field("server", &self.server)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl SecondFactorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.secret.is_empty() {
            return Err(Error::Configuration(
                "second_factor.secret must be defined".into(),
            ));
        }
        if self.server.trim().is_empty() {
            return Err(Error::Configuration(
                "second_factor.server must be defined".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Debug-only switches that force a factor check to succeed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BypassFlags {
    pub directory: bool,
    pub second_factor: bool,
}

impl BypassFlags {
    pub fn any(&self) -> bool {
        self.directory || self.second_factor
    }

    pub fn validate(&self, debug: bool) -> Result<()> {
        if self.any() && !debug {
            return Err(Error::Configuration(
                "bypass flags are only permitted when debug is enabled".into(),
            ));
        }
        Ok(())
    }
}

/// Identity store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://dualgate.db?mode=rwc".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> DualgateConfig {
        let mut config = DualgateConfig::default();
        config.directory.host = "ad.example.com".to_string();
        config.directory.port = 389;
        config.second_factor.secret = "s3cret".to_string();
        config.second_factor.server = "radius.example.com:1812".to_string();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_missing_required_fields() {
        let mut config = valid_config();
        config.second_factor.secret.clear();
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));

        let mut config = valid_config();
        config.second_factor.server = "  ".to_string();
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));

        let mut config = valid_config();
        config.directory.host.clear();
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));

        let mut config = valid_config();
        config.directory.port = 0;
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_bypass_requires_debug() {
        let mut config = valid_config();
        config.bypass.directory = true;
        assert!(config.validate().is_err());
        assert_eq!(config.effective_bypass(), BypassFlags::default());

        config.debug = true;
        assert!(config.validate().is_ok());
        assert!(config.effective_bypass().directory);
    }

    #[test]
    fn test_bind_identity() {
        let mut config = valid_config();
        config.directory.bind_template = "RC\\{username}".to_string();
        assert_eq!(config.directory.bind_identity("alice"), "RC\\alice");

        config.directory.bind_template = "RC\\user".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml() {
        let config = DualgateConfig::from_toml(
            r#"
            debug = true

            [directory]
            host = "ad.example.com"
            port = 636
            use_tls = true
            bind_timeout_secs = 10

            [second_factor]
            secret = "s3cret"
            server = "10.0.0.5:1812"

            [bypass]
            second_factor = true
            "#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.directory.port, 636);
        assert_eq!(config.directory.max_attempts, 3);
        assert_eq!(config.directory.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.directory.bind_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.directory.retry_delay(), Duration::from_secs(1));
        assert!(config.bypass.second_factor);
        assert!(!config.bypass.directory);
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let result = DualgateConfig::from_file("/nonexistent/dualgate.toml");
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_store_defaults() {
        let store = StoreConfig::default();
        assert_eq!(store.database_url, "sqlite://dualgate.db?mode=rwc");
        assert_eq!(store.max_connections, 10);
    }

    #[test]
    fn test_secret_is_redacted() {
        let rendered = format!("{:?}", valid_config().second_factor);
        assert!(!rendered.contains("s3cret"));
    }
}
