use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub ner: NerConfig,
    pub retry: RetryConfig,
    pub cache: CacheConfig,
    /// JSON gazetteer file; built-in tables when absent.
    pub gazetteer_path: Option<PathBuf>,
    pub log_json: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NerConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Probe `/health` before serving; skip for recognizers without one.
    pub probe_on_startup: bool,
}

/// Applies to the startup readiness probe only. Extraction calls are never retried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "0.0.0.0:5000".to_string(),
            },
            ner: NerConfig {
                base_url: "http://localhost:8001".to_string(),
                request_timeout_secs: 10,
                probe_on_startup: true,
            },
            retry: RetryConfig {
                max_retries: 3,
                initial_backoff_ms: 500,
                max_backoff_ms: 5000,
            },
            cache: CacheConfig {
                enabled: true,
                max_entries: 10000,
            },
            gazetteer_path: None,
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Defaults, then the JSON file named by `PARSER_CONFIG`, then env overrides.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("PARSER_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid config file: {:?}", path))
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(addr) = var("PARSER_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(url) = var("NER_URL") {
            self.ner.base_url = url;
        }
        if let Some(secs) = var("NER_TIMEOUT_SECS") {
            self.ner.request_timeout_secs = secs
                .parse()
                .with_context(|| format!("NER_TIMEOUT_SECS is not a number: {secs}"))?;
        }
        if let Some(path) = var("GAZETTEER_PATH") {
            self.gazetteer_path = Some(PathBuf::from(path));
        }
        if let Some(flag) = var("LOG_JSON") {
            self.log_json = matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("NER_URL", "http://ner:9000"),
            ("NER_TIMEOUT_SECS", "3"),
            ("LOG_JSON", "true"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.ner.base_url, "http://ner:9000");
        assert_eq!(config.ner.request_timeout_secs, 3);
        assert!(config.log_json);
        assert_eq!(config.server.bind_addr, "0.0.0.0:5000");
    }

    #[test]
    fn test_bad_timeout_is_an_error() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(|key| {
            (key == "NER_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"cache": {"enabled": false, "max_entries": 0}}"#).unwrap();
        assert!(!config.cache.enabled);
        assert_eq!(config.retry.max_retries, 3);
    }
}
