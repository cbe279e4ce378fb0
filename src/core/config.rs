//! Configuration management for Aegis
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/aegis/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{AegisError, Result};

/// Main configuration for Aegis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ollama configuration
    pub ollama: OllamaConfig,
    /// Payment service configuration
    pub payment: PaymentServiceConfig,
    /// Policy search configuration
    pub search: SearchConfig,
    /// Agent configuration
    pub agent: AgentConfig,
}

/// Ollama server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Host address (default: localhost)
    pub host: String,
    /// Port number (default: 11434)
    pub port: u16,
    /// Chat model used for incident resolution
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Payment microservice configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentServiceConfig {
    /// Base URL of the payment service
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Policy knowledge-base configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the search cluster
    pub base_url: String,
    /// Index holding the policy documents
    pub index: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Agent behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum resolution loop turns before stopping
    /// Default: 5
    pub max_turns: usize,
    /// Whether to show debug output
    pub debug: bool,
    /// Override for the agent persona prompt
    pub system_prompt: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama: OllamaConfig::default(),
            payment: PaymentServiceConfig::default(),
            search: SearchConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: env::var("OLLAMA_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("OLLAMA_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(11434),
            model: env::var("AEGIS_MODEL").unwrap_or_else(|_| "llama3".to_string()),
            timeout_secs: 120,
        }
    }
}

impl Default for PaymentServiceConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("AEGIS_PAYMENT_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            timeout_secs: 10,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("AEGIS_SEARCH_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:9200".to_string()),
            index: env::var("AEGIS_POLICY_INDEX")
                .unwrap_or_else(|_| "aegis_policies".to_string()),
            timeout_secs: 10,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: 5,
            debug: env::var("AEGIS_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            system_prompt: None,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("aegis")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        // Try to load from config file
        if let Ok(config) = Self::load_from_file() {
            return config;
        }

        // Fall back to defaults (which respect env vars)
        Self::default()
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(AegisError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| AegisError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| AegisError::config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| AegisError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| AegisError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| AegisError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Get the full Ollama API URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }

    /// Check that the collaborator base URLs are well-formed
    pub fn validate(&self) -> Result<()> {
        for (label, value) in [
            ("ollama", self.ollama_url()),
            ("payment", self.payment.base_url.clone()),
            ("search", self.search.base_url.clone()),
        ] {
            url::Url::parse(&value).map_err(|e| {
                AegisError::config(format!("Invalid {} base URL '{}': {}", label, value, e))
            })?;
        }

        if self.agent.max_turns == 0 {
            return Err(AegisError::config("max_turns must be at least 1"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ollama.port, 11434);
        assert_eq!(config.search.index, "aegis_policies");
        assert_eq!(config.agent.max_turns, 5);
    }

    #[test]
    fn test_ollama_url() {
        let config = Config::default();
        assert!(config.ollama_url().starts_with("http://"));
        assert!(config.ollama_url().ends_with(":11434"));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("max_turns"));
        assert!(toml_str.contains("aegis_policies"));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.payment.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_turns() {
        let mut config = Config::default();
        config.agent.max_turns = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_dir() {
        let dir = Config::config_dir();
        assert!(dir.to_string_lossy().contains("aegis"));
    }
}
