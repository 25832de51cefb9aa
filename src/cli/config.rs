//! Plenary configuration file handling
//!
//! Provides default configuration generation and loading for the operator
//! CLI. Configuration files are TOML and live next to the motion store.
//!
//! Endpoints of the eligibility oracle and the result channel are read from
//! here and passed to the service at construction; nothing is compiled in.

use plenary::publisher::DEFAULT_TOPIC;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

/// Default oracle request timeout (humantime syntax)
const DEFAULT_ORACLE_TIMEOUT: &str = "5s";

/// Plenary operator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlenaryConfig {
    /// Motion store configuration
    pub store: StoreConfig,

    /// Eligibility oracle configuration
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Result channel configuration
    #[serde(default)]
    pub publisher: PublisherConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the CBOR motion snapshot
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Root URL; lookups go to `{base_url}/users/{member_id}`
    #[serde(default = "default_oracle_url")]
    pub base_url: String,

    /// Request timeout, e.g. "5s" or "1500ms"
    #[serde(default = "default_oracle_timeout")]
    pub timeout: String,
}

/// Where closed-motion results go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PublisherKind {
    /// Structured log event only
    #[default]
    Log,
    /// Broker REST gateway
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    #[serde(default)]
    pub kind: PublisherKind,

    /// Gateway root URL (required for `kind = "http"`)
    pub endpoint: Option<String>,

    /// Logical topic name
    #[serde(default = "default_topic")]
    pub topic: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

fn default_oracle_url() -> String {
    "http://127.0.0.1:8081".to_string()
}

fn default_oracle_timeout() -> String {
    DEFAULT_ORACLE_TIMEOUT.to_string()
}

fn default_topic() -> String {
    DEFAULT_TOPIC.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: default_oracle_url(),
            timeout: default_oracle_timeout(),
        }
    }
}

impl OracleConfig {
    /// Parsed request timeout
    pub fn timeout(&self) -> Result<Duration, String> {
        humantime::parse_duration(&self.timeout)
            .map_err(|e| format!("Invalid oracle timeout '{}': {}", self.timeout, e))
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            kind: PublisherKind::default(),
            endpoint: None,
            topic: default_topic(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

impl PlenaryConfig {
    /// Create a new configuration with the given store path
    #[cfg(test)]
    pub fn new(store_path: PathBuf) -> Self {
        Self {
            store: StoreConfig { path: store_path },
            oracle: OracleConfig::default(),
            publisher: PublisherConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: PlenaryConfig = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        config.oracle.timeout()?;
        if config.publisher.kind == PublisherKind::Http && config.publisher.endpoint.is_none() {
            return Err(format!(
                "Config file '{}': publisher.endpoint is required when publisher.kind = \"http\"",
                path.display()
            )
            .into());
        }

        Ok(config)
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml(store_path: &Path) -> String {
        format!(
            r#"# Plenary Configuration
#
# Operator settings for the motion voting CLI.

[store]
# CBOR snapshot holding every motion and its votes
path = "{store_path}"

[oracle]
# Eligibility service; members are looked up at {{base_url}}/users/{{member_id}}
base_url = "http://127.0.0.1:8081"

# Request timeout (e.g. "5s", "1500ms")
timeout = "5s"

[publisher]
# "log" emits results as log events; "http" posts them to a broker gateway
kind = "log"

# Gateway root, required when kind = "http"
# endpoint = "http://127.0.0.1:8082"

# Topic receiving one record per closed motion
topic = "{topic}"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (optional, logs to stderr if not specified)
# file = "/var/log/plenary/plenary.log"
"#,
            store_path = store_path.display(),
            topic = DEFAULT_TOPIC,
        )
    }

    /// Create and save a default configuration file
    pub fn create_default(
        config_path: &Path,
        store_path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let contents = Self::generate_default_toml(store_path);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(config_path, contents).map_err(|e| {
            format!(
                "Failed to write config file '{}': {}",
                config_path.display(),
                e
            )
        })?;

        Ok(())
    }
}

/// Default data directory: `~/.local/share/plenary`
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("plenary")
}

/// Default config file path
pub fn default_config_path() -> PathBuf {
    default_data_dir().join("config.toml")
}

/// Store path placed next to the given config file
pub fn default_store_path(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("motions.cbor")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let store_path = PathBuf::from("/data/plenary/motions.cbor");
        let config = PlenaryConfig::new(store_path.clone());

        assert_eq!(config.store.path, store_path);
        assert_eq!(config.publisher.kind, PublisherKind::Log);
        assert_eq!(config.publisher.topic, "NOVO_RESULTADO_VOTACAO");
        assert_eq!(config.oracle.timeout().unwrap(), Duration::from_secs(5));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_serialized_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let store_path = PathBuf::from("/data/plenary/motions.cbor");

        let mut config = PlenaryConfig::new(store_path.clone());
        config.publisher.kind = PublisherKind::Http;
        config.publisher.endpoint = Some("http://gateway.local".to_string());
        fs::write(&config_path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = PlenaryConfig::load(&config_path).unwrap();
        assert_eq!(loaded.store.path, store_path);
        assert_eq!(loaded.publisher.kind, PublisherKind::Http);
        assert_eq!(
            loaded.publisher.endpoint.as_deref(),
            Some("http://gateway.local")
        );
    }

    #[test]
    fn test_create_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");
        let store_path = temp_dir.path().join("motions.cbor");

        PlenaryConfig::create_default(&config_path, &store_path).unwrap();

        let config = PlenaryConfig::load(&config_path).unwrap();
        assert_eq!(config.store.path, store_path);
        assert_eq!(config.publisher.kind, PublisherKind::Log);
        assert_eq!(config.oracle.base_url, "http://127.0.0.1:8081");
    }

    #[test]
    fn test_load_config_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let minimal_config = r#"
[store]
path = "/tmp/motions.cbor"
"#;
        fs::write(&config_path, minimal_config).unwrap();

        let config = PlenaryConfig::load(&config_path).unwrap();
        assert_eq!(config.oracle.timeout, "5s");
        assert_eq!(config.publisher.topic, DEFAULT_TOPIC);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_http_publisher_requires_endpoint() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let config = r#"
[store]
path = "/tmp/motions.cbor"

[publisher]
kind = "http"
"#;
        fs::write(&config_path, config).unwrap();

        let err = PlenaryConfig::load(&config_path).unwrap_err();
        assert!(err.to_string().contains("publisher.endpoint"));
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let config = r#"
[store]
path = "/tmp/motions.cbor"

[oracle]
timeout = "soon"
"#;
        fs::write(&config_path, config).unwrap();

        assert!(PlenaryConfig::load(&config_path).is_err());
    }

    #[test]
    fn test_default_store_path_next_to_config() {
        let config_path = PathBuf::from("/data/plenary/config.toml");
        assert_eq!(
            default_store_path(&config_path),
            PathBuf::from("/data/plenary/motions.cbor")
        );
    }

    #[test]
    fn test_generate_default_toml() {
        let toml = PlenaryConfig::generate_default_toml(Path::new("/data/plenary/motions.cbor"));

        assert!(toml.contains("path = \"/data/plenary/motions.cbor\""));
        assert!(toml.contains("kind = \"log\""));
        assert!(toml.contains("topic = \"NOVO_RESULTADO_VOTACAO\""));
        assert!(toml.contains("{base_url}/users/{member_id}"));
    }
}
