//! Harness configuration.
//!
//! Loaded from an optional `sonda.yml`; CLI flags take final precedence.
//! Unknown values fail at parse time, impossible combinations fail in
//! `validate`, and odd-but-legal values come back as warnings.

use crate::report::DisplayMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("falha ao ler {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("configuração inválida em {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("faults.list_failure_rate deve estar entre 0.0 e 1.0 (valor: {0})")]
    InvalidRate(f64),
    #[error("client.base_url não pode ser vazio")]
    EmptyBaseUrl,
}

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HarnessConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub faults: FaultsConfig,
}

/// Mock backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port the mock backend listens on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

/// Flow runner settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API root the runner calls.
    pub base_url: String,
    /// Display mode for reported records.
    pub mode: DisplayMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            mode: DisplayMode::Client,
        }
    }
}

/// Failure injection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultsConfig {
    /// Probability that a pedidos call fails.
    pub list_failure_rate: f64,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for FaultsConfig {
    fn default() -> Self {
        Self {
            list_failure_rate: 0.10,
            seed: None,
        }
    }
}

impl HarnessConfig {
    /// Loads configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Validates the configuration, returning warnings for legal but
    /// surprising values.
    pub fn validate(&self) -> Result<Vec<String>, ConfigError> {
        if !(0.0..=1.0).contains(&self.faults.list_failure_rate) {
            return Err(ConfigError::InvalidRate(self.faults.list_failure_rate));
        }
        if self.client.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }

        let mut warnings = Vec::new();
        if self.faults.list_failure_rate == 0.0 {
            warnings.push("aviso: faults.list_failure_rate = 0.0, pedidos nunca falhará".to_string());
        }
        if self.faults.list_failure_rate == 1.0 {
            warnings.push("aviso: faults.list_failure_rate = 1.0, pedidos sempre falhará".to_string());
        }
        if self.faults.seed.is_some() {
            warnings.push("aviso: seed fixa, as falhas sorteadas serão reproduzíveis".to_string());
        }
        Ok(warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.client.base_url, "http://localhost:3000/api");
        assert_eq!(config.client.mode, DisplayMode::Client);
        assert_eq!(config.faults.list_failure_rate, 0.10);
        assert_eq!(config.faults.seed, None);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
server:
  port: 8080
client:
  mode: monitor
"#;
        let config: HarnessConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.client.mode, DisplayMode::Monitor);
        assert_eq!(config.client.base_url, "http://localhost:3000/api");
        assert_eq!(config.faults.list_failure_rate, 0.10);
    }

    #[test]
    fn test_mode_aliases() {
        let cliente: HarnessConfig =
            serde_yaml::from_str("client:\n  mode: cliente\n").unwrap();
        assert_eq!(cliente.client.mode, DisplayMode::Client);

        let client: HarnessConfig = serde_yaml::from_str("client:\n  mode: client\n").unwrap();
        assert_eq!(client.client.mode, DisplayMode::Client);
    }

    #[test]
    fn test_invalid_rate_is_rejected() {
        let mut config = HarnessConfig::default();
        config.faults.list_failure_rate = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRate(_))
        ));
    }

    #[test]
    fn test_empty_base_url_is_rejected() {
        let mut config = HarnessConfig::default();
        config.client.base_url = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyBaseUrl)));
    }

    #[test]
    fn test_edge_rates_warn() {
        let mut config = HarnessConfig::default();
        config.faults.list_failure_rate = 0.0;
        assert_eq!(config.validate().unwrap().len(), 1);

        config.faults.list_failure_rate = 1.0;
        config.faults.seed = Some(42);
        assert_eq!(config.validate().unwrap().len(), 2);

        config.faults.list_failure_rate = 0.10;
        config.faults.seed = None;
        assert!(config.validate().unwrap().is_empty());
    }

    #[test]
    fn test_from_file_missing_path_errors() {
        let err = HarnessConfig::from_file(Path::new("/nonexistent/sonda.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
