//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: Hardcoded in struct `Default` implementations
//! 2. **Config file**: TOML file specified by `SPLITTER_CONFIG` env var
//! 3. **Environment variables**: `SPLITTER__*` env vars override specific fields
//! 4. **Command line**: the server binary applies its flags on top
//!
//! # Configuration Sections
//!
//! - [`ServerConfig`]: HTTP server settings (bind address, concurrency, CORS)
//! - [`UpstreamProvider`]: RPC endpoint definitions
//! - [`ConsensusConfig`]: Timeouts and quorum parameters
//! - [`LoggingConfig`]: Log level and format
//!
//! # Validation
//!
//! Configuration is validated before the server starts. Invalid configurations (e.g. no
//! providers, non-HTTP URLs, a quorum larger than the provider count) return errors rather than
//! failing on the first request.
//!
//! # Example
//!
//! ```toml
//! [server]
//! bind_address = "0.0.0.0"
//! bind_port = 8545
//!
//! [[upstreams.providers]]
//! name = "node-a"
//! url = "https://node-a.example.com"
//!
//! [[upstreams.providers]]
//! name = "node-b"
//! url = "https://node-b.example.com"
//!
//! [consensus]
//! total_timeout_ms = 10000
//! graceful_timeout_ms = 1000
//! max_blocks_behind = 10
//! ```

use crate::upstream::ConsensusConfig;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, time::Duration};

/// HTTP server configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// IP address to bind the server to. Defaults to `127.0.0.1`.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port number to listen on. Must be greater than 0. Defaults to `8545`.
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Maximum number of concurrent inbound requests. Defaults to `1000`.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Whether to answer CORS preflight requests permissively. Defaults to `false`.
    #[serde(default)]
    pub enable_cors: bool,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    8545
}

fn default_max_concurrent_requests() -> usize {
    1000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            max_concurrent_requests: default_max_concurrent_requests(),
            enable_cors: false,
        }
    }
}

/// Configuration for a single upstream RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamProvider {
    /// Identifier used in logs (e.g. `"node-a"`).
    pub name: String,

    /// HTTP(S) endpoint URL.
    pub url: String,

    /// Cap on a single HTTP exchange in seconds. The consensus total timeout applies on top.
    /// Defaults to `30`.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    30
}

impl UpstreamProvider {
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self { name: name.into(), url: url.into(), timeout_seconds: default_timeout_seconds() }
    }

    /// Builds a provider from a bare URL, naming it after the URL host.
    ///
    /// Falls back to `endpoint-{index}` when the URL has no host.
    #[must_use]
    pub fn from_url(url: &str, index: usize) -> Self {
        let name = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| format!("endpoint-{index}"));
        Self::new(name, url)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Container for all upstream endpoint configurations.
///
/// Must contain at least one provider for the application to function.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamsConfig {
    /// List of configured upstream endpoints. Cannot be empty.
    #[serde(default)]
    pub providers: Vec<UpstreamProvider>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (e.g. `"info"`, `"splitter_core=debug"`). Defaults to
    /// `"info"`. `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `"json"` or `"pretty"`. Defaults to `"pretty"`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format() }
    }
}

/// Root application configuration containing all subsystem settings.
///
/// Loaded from TOML files and environment variables with the `SPLITTER` prefix, using `__` as
/// a separator for nested fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream endpoint configuration.
    #[serde(default)]
    pub upstreams: UpstreamsConfig,

    /// Dispatch timeouts and quorum parameters.
    #[serde(default)]
    pub consensus: ConsensusConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// A missing file is not an error; the defaults and environment apply. Nested fields are
    /// overridden with `__` separators (e.g. `SPLITTER__SERVER__BIND_PORT=9000`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be parsed or the merged values cannot be
    /// deserialized.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_builder = Config::builder()
            .set_default("server.bind_address", default_bind_address())?
            .set_default("server.bind_port", i64::from(default_bind_port()))?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("SPLITTER").separator("__"))
            .build()?;

        config_builder.try_deserialize()
    }

    /// Loads configuration from `config/config.toml`.
    ///
    /// The path can be overridden with the `SPLITTER_CONFIG` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("SPLITTER_CONFIG").unwrap_or_else(|_| "config/config.toml".to_string());
        Self::from_file(&config_path)
    }

    /// Returns the parsed socket address for the HTTP server.
    ///
    /// # Errors
    ///
    /// Returns an error string if the address cannot be parsed into a valid [`SocketAddr`].
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.bind_address, self.server.bind_port)
            .parse()
            .map_err(|_| {
                format!(
                    "Invalid socket address: {}:{}",
                    self.server.bind_address, self.server.bind_port
                )
            })
    }

    /// Validates the configuration for correctness and consistency.
    ///
    /// Checks include:
    /// - At least one upstream provider is configured, each with an `http(s)` URL
    /// - The consensus parameters can be met by the provider count
    /// - Numeric values are greater than zero where required
    /// - Logging format is either `"json"` or `"pretty"`
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.upstreams.providers.is_empty() {
            return Err("No upstream RPC endpoints configured".to_string());
        }

        for provider in &self.upstreams.providers {
            let parsed = url::Url::parse(&provider.url)
                .map_err(|e| format!("Invalid URL for upstream {}: {e}", provider.name))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(format!(
                    "Invalid URL for upstream {}: {} (expected http or https)",
                    provider.name, provider.url
                ));
            }
            if provider.timeout_seconds == 0 {
                return Err(format!(
                    "Timeout must be greater than 0 for upstream {}",
                    provider.name
                ));
            }
        }

        self.consensus.validate(self.upstreams.providers.len()).map_err(|e| e.to_string())?;

        if self.server.max_concurrent_requests == 0 {
            return Err("Max concurrent requests must be greater than 0".to_string());
        }

        if self.server.bind_port == 0 {
            return Err("Bind port must be greater than 0".to_string());
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn config_with_providers(count: usize) -> AppConfig {
        let mut config = AppConfig::default();
        config.upstreams.providers = (0..count)
            .map(|i| UpstreamProvider::new(format!("node-{i}"), format!("http://node-{i}:8545")))
            .collect();
        config
    }

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.server.bind_port, 8545);
        assert!(!config.server.enable_cors);
        assert_eq!(config.logging.format, "pretty");
        assert!(config.upstreams.providers.is_empty());
        assert_eq!(config.consensus, ConsensusConfig::default());
    }

    #[test]
    fn test_config_validation() {
        assert!(AppConfig::default().validate().is_err());

        let mut config = config_with_providers(3);
        assert!(config.validate().is_ok());

        config.upstreams.providers[1].url = "invalid-url".to_string();
        assert!(config.validate().is_err());

        config.upstreams.providers[1].url = "ws://node-1:8546".to_string();
        assert!(config.validate().unwrap_err().contains("expected http or https"));
    }

    #[test]
    fn test_validation_checks_quorum() {
        let mut config = config_with_providers(2);
        config.consensus.min_responses = Some(3);
        assert!(config.validate().unwrap_err().contains("minimum responses"));

        config.consensus.min_responses = Some(2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_checks_logging_format() {
        let mut config = config_with_providers(1);
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig::default();
        assert_eq!(config.socket_addr().unwrap(), "127.0.0.1:8545".parse().unwrap());

        let mut config = AppConfig::default();
        config.server.bind_address = "not an ip".to_string();
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_provider_from_url() {
        let provider = UpstreamProvider::from_url("https://eth.example.com/v1/key", 0);
        assert_eq!(provider.name, "eth.example.com");
        assert_eq!(provider.timeout(), Duration::from_secs(30));

        let provider = UpstreamProvider::from_url("not a url", 3);
        assert_eq!(provider.name, "endpoint-3");
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[server]
bind_port = 9000
enable_cors = true

[[upstreams.providers]]
name = "a"
url = "https://a.example.com"

[[upstreams.providers]]
name = "b"
url = "https://b.example.com"
timeout_seconds = 5

[consensus]
min_responses = 2
graceful_timeout_ms = 250

[logging]
format = "json"
"#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.server.bind_port, 9000);
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert!(config.server.enable_cors);
        assert_eq!(config.upstreams.providers.len(), 2);
        assert_eq!(config.upstreams.providers[1].timeout_seconds, 5);
        assert_eq!(config.consensus.min_responses, Some(2));
        assert_eq!(config.consensus.graceful_timeout_ms, 250);
        assert_eq!(config.consensus.total_timeout_ms, 10_000);
        assert_eq!(config.logging.format, "json");
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_from_file_missing_uses_defaults() {
        let config = AppConfig::from_file("does/not/exist.toml").unwrap();
        assert_eq!(config.server.bind_port, 8545);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        std::env::set_var("SPLITTER__SERVER__BIND_PORT", "9100");
        std::env::set_var("SPLITTER__LOGGING__FORMAT", "json");

        let config = AppConfig::from_file("does/not/exist.toml");

        std::env::remove_var("SPLITTER__SERVER__BIND_PORT");
        std::env::remove_var("SPLITTER__LOGGING__FORMAT");

        let config = config.unwrap();
        assert_eq!(config.server.bind_port, 9100);
        assert_eq!(config.logging.format, "json");
    }
}
