//! Configuration loading for tagd.
//!
//! Configuration is loaded from TOML with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.tag-classifier/config.toml` (user)
//! 3. `/etc/tag-classifier/config.toml` (system)
//! 4. Built-in defaults
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.tag-classifier/secrets.toml` (user, must be 0600)
//! 2. `/etc/tag-classifier/secrets.toml` (system, must be 0600)

use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::classifier::DEFAULT_SEPARATOR;
use crate::model::Device;
use crate::types::AggregationPolicy;
use crate::{ClassifierError, Result};

/// Model used when neither the config file nor the CLI names one.
pub const DEFAULT_MODEL: &str = "MoritzLaurer/deberta-v3-base-zeroshot-v2.0";

const CONFIG_DIR: &str = ".tag-classifier";
const SYSTEM_DIR: &str = "/etc/tag-classifier";

/// Environment variable consulted when no secrets file holds the API key.
pub const API_KEY_ENV: &str = "HF_API_KEY";

/// Daemon configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

/// Listener and logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind (default: 0.0.0.0).
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind (default: 8766).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Default tracing filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            limits: LimitsConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ClassifierError::Configuration(format!("invalid listen address: {e}")))
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8766
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Request limits applied by the router.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum in-flight requests (default: 64).
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
    /// Maximum request body size in bytes (default: 1 MiB).
    #[serde(default = "default_max_body")]
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: default_max_concurrent(),
            max_body_bytes: default_max_body(),
        }
    }
}

fn default_max_concurrent() -> usize {
    64
}

fn default_max_body() -> usize {
    1024 * 1024
}

/// Which provider backs the classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Hosted HuggingFace inference API.
    #[default]
    Huggingface,
    /// Local ONNX model (feature `local-inference`).
    Local,
}

impl std::str::FromStr for Backend {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "huggingface" | "hf" => Ok(Self::Huggingface),
            "local" | "onnx" => Ok(Self::Local),
            other => Err(ClassifierError::Configuration(format!(
                "unknown backend '{other}', expected 'huggingface' or 'local'"
            ))),
        }
    }
}

/// Model and aggregation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// HuggingFace repo id of the zero-shot model.
    #[serde(default = "default_model")]
    pub name: String,
    #[serde(default)]
    pub backend: Backend,
    /// "cpu", "cuda" or "cuda:<index>".
    #[serde(default = "default_device")]
    pub device: String,
    /// Run one inference at a time. Unset means: only for the local backend.
    #[serde(default)]
    pub serialize_inference: Option<bool>,
    #[serde(default)]
    pub policy: AggregationPolicy,
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Directory for model downloads (local backend).
    #[serde(default)]
    pub models_dir: Option<PathBuf>,
    /// Inference API base URL override (huggingface backend).
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            backend: Backend::default(),
            device: default_device(),
            serialize_inference: None,
            policy: AggregationPolicy::default(),
            separator: default_separator(),
            models_dir: None,
            base_url: None,
        }
    }
}

impl ModelConfig {
    pub fn device(&self) -> Result<Device> {
        self.device.parse()
    }

    pub fn serialize_inference(&self) -> bool {
        self.serialize_inference
            .unwrap_or(self.backend == Backend::Local)
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

/// Secrets configuration (API keys).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub huggingface: Option<ApiKeySecret>,
}

/// A single API key secret.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path must exist; otherwise the first file found wins and
    /// built-in defaults apply when there is none.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ClassifierError::Configuration(format!("failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClassifierError::Configuration(format!("failed to parse config file {path:?}: {e}"))
        })
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(ClassifierError::Configuration(format!(
                "config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(CONFIG_DIR).join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = Path::new(SYSTEM_DIR).join("config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Returns empty secrets if no file exists; the API key may then come
    /// from `HF_API_KEY`.
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(CONFIG_DIR).join("secrets.toml");
            if user_secrets.exists() {
                return Self::load_from_file(&user_secrets);
            }
        }

        let system_secrets = Path::new(SYSTEM_DIR).join("secrets.toml");
        if system_secrets.exists() {
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    /// Read a secrets file, refusing it when group or others can read it.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::check_permissions(path)?;
        let content = fs::read_to_string(path).map_err(|e| {
            ClassifierError::Configuration(format!("failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClassifierError::Configuration(format!("failed to parse secrets file {path:?}: {e}"))
        })
    }

    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            ClassifierError::Configuration(format!("failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        if mode & 0o077 != 0 {
            return Err(ClassifierError::Configuration(format!(
                "secrets file {path:?} has insecure permissions {:o}; must be 0600 or 0400",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// HuggingFace API key from the secrets file, else from `HF_API_KEY`.
    pub fn huggingface_api_key(&self) -> Option<String> {
        self.huggingface
            .as_ref()
            .map(|s| s.api_key.clone())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8766);
        assert_eq!(config.server.log_format, LogFormat::Text);
        assert_eq!(config.server.limits.max_concurrent_requests, 64);
        assert_eq!(config.server.limits.max_body_bytes, 1024 * 1024);
        assert_eq!(config.model.name, DEFAULT_MODEL);
        assert_eq!(config.model.backend, Backend::Huggingface);
        assert_eq!(config.model.policy, AggregationPolicy::Concatenate);
        assert_eq!(config.model.separator, ", ");
    }

    #[test]
    fn parse_minimal_config() {
        let config: Config = toml::from_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.model.device, "cpu");
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            log_level = "debug"
            log_format = "json"

            [server.limits]
            max_concurrent_requests = 8
            max_body_bytes = 4096

            [model]
            name = "MoritzLaurer/DeBERTa-v3-base-mnli-fever-anli"
            backend = "local"
            device = "cuda:1"
            serialize_inference = false
            policy = "per_tag_mean"
            separator = " "
            models_dir = "/opt/models"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.log_format, LogFormat::Json);
        assert_eq!(config.server.limits.max_concurrent_requests, 8);
        assert_eq!(config.model.backend, Backend::Local);
        assert_eq!(config.model.device().unwrap(), Device::cuda(1));
        assert!(!config.model.serialize_inference());
        assert_eq!(config.model.policy, AggregationPolicy::PerTagMean);
        assert_eq!(config.model.models_dir, Some(PathBuf::from("/opt/models")));
        assert_eq!(
            config.server.socket_addr().unwrap(),
            "127.0.0.1:8080".parse().unwrap()
        );
    }

    #[test]
    fn serialize_inference_defaults_by_backend() {
        let mut model = ModelConfig::default();
        assert!(!model.serialize_inference());
        model.backend = Backend::Local;
        assert!(model.serialize_inference());
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(toml::from_str::<Config>("[model]\nbackend = \"openai\"\n").is_err());
        assert!("openai".parse::<Backend>().is_err());
        assert_eq!("HF".parse::<Backend>().unwrap(), Backend::Huggingface);
    }

    #[test]
    fn invalid_host_is_a_configuration_error() {
        let server = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            server.socket_addr(),
            Err(ClassifierError::Configuration(_))
        ));
    }

    #[test]
    fn config_not_found_returns_error() {
        let err = Config::load(Some(Path::new("/nonexistent/config.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[model]\nname = \"some/model\"").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.model.name, "some/model");
    }

    #[test]
    fn parse_secrets() {
        let secrets: Secrets = toml::from_str("[huggingface]\napi_key = \"hf_test\"\n").unwrap();
        assert_eq!(secrets.huggingface_api_key(), Some("hf_test".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn secrets_with_open_permissions_are_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[huggingface]\napi_key = \"hf_test\"").unwrap();

        fs::set_permissions(file.path(), fs::Permissions::from_mode(0o644)).unwrap();
        let err = Secrets::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("insecure permissions 644"));

        fs::set_permissions(file.path(), fs::Permissions::from_mode(0o600)).unwrap();
        let secrets = Secrets::load_from_file(file.path()).unwrap();
        assert_eq!(secrets.huggingface.unwrap().api_key, "hf_test");
    }
}
