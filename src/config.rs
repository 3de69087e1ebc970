use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::http::RetryConfig;

pub const DEFAULT_INFERENCE_BASE_URL: &str = "https://router.huggingface.co/hf-inference";
pub const DEFAULT_SENTIMENT_MODEL: &str = "distilbert/distilbert-base-uncased-finetuned-sst-2-english";
pub const DEFAULT_SUMMARIZE_MODEL: &str = "sshleifer/distilbart-cnn-12-6";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_TOOL_SERVER: &str = "https://cwadayi-mcp-1.hf.space/";
pub const DEFAULT_API_NAME: &str = "predict";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot resolve config path: set PD_CONFIG or HOME/XDG_CONFIG_HOME.")]
    NoConfigPath,
    #[error("Config file '{}' does not exist.", .path.display())]
    Missing { path: PathBuf },
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    /// Per-request timeout in seconds. Unset means no timeout.
    pub timeout: Option<u64>,
    pub retries: u32,
    /// Base backoff delay in milliseconds.
    pub retry_delay: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            retries: 0,
            retry_delay: 500,
        }
    }
}

impl HttpConfig {
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            timeout_secs: self.timeout,
            retries: self.retries,
            retry_delay_ms: self.retry_delay,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SentimentConfig {
    pub model: String,
    pub base_url: String,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_SENTIMENT_MODEL.to_string(),
            base_url: DEFAULT_INFERENCE_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SummarizeConfig {
    pub model: String,
    pub base_url: String,
    pub max_length: u32,
    pub min_length: u32,
    pub do_sample: bool,
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_SUMMARIZE_MODEL.to_string(),
            base_url: DEFAULT_INFERENCE_BASE_URL.to_string(),
            max_length: 60,
            min_length: 20,
            do_sample: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChatConfig {
    pub model: String,
    pub base_url: String,
    /// Root URL of the Gradio app hosting the letter counter.
    pub tool_server: String,
    pub api_name: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_CHAT_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            tool_server: DEFAULT_TOOL_SERVER.to_string(),
            api_name: DEFAULT_API_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub http: HttpConfig,
    pub sentiment: SentimentConfig,
    pub summarize: SummarizeConfig,
    pub chat: ChatConfig,
}

impl Config {
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Loads the config file if one exists, falling back to defaults otherwise.
    pub fn load() -> Result<Self, ConfigError> {
        let path = match config_path() {
            Ok(path) => path,
            Err(ConfigError::NoConfigPath) => {
                tracing::debug!("no config path resolvable, using defaults");
                return Ok(Self::default());
            }
            Err(err) => return Err(err),
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let config = Self::read(&path)?;
        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("sentiment.base_url", &self.sentiment.base_url)?;
        check_url("summarize.base_url", &self.summarize.base_url)?;
        check_url("chat.base_url", &self.chat.base_url)?;
        check_url("chat.tool_server", &self.chat.tool_server)?;

        check_non_empty("sentiment.model", &self.sentiment.model)?;
        check_non_empty("summarize.model", &self.summarize.model)?;
        check_non_empty("chat.model", &self.chat.model)?;
        check_non_empty("chat.api_name", &self.chat.api_name)?;

        if self.summarize.min_length > self.summarize.max_length {
            return Err(ConfigError::Invalid(format!(
                "summarize.min_length ({}) exceeds summarize.max_length ({})",
                self.summarize.min_length, self.summarize.max_length
            )));
        }
        Ok(())
    }
}

/// Validates the config file on disk and returns its path.
pub fn validate_config() -> Result<PathBuf, ConfigError> {
    let path = config_path()?;
    if !path.exists() {
        return Err(ConfigError::Missing { path });
    }
    Config::read(&path)?.validate()?;
    Ok(path)
}

fn check_url(field: &str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|err| ConfigError::Invalid(format!("{field} '{value}' is not a valid URL: {err}")))
}

fn check_non_empty(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must not be empty")));
    }
    Ok(())
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = env::var("PD_CONFIG") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed).join("pipedemo").join("config.toml"));
        }
    }

    let home = env::var("HOME").map_err(|_| ConfigError::NoConfigPath)?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("pipedemo")
        .join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.chat.model, DEFAULT_CHAT_MODEL);
        assert_eq!(config.chat.tool_server, DEFAULT_TOOL_SERVER);
        assert_eq!(config.summarize.max_length, 60);
        assert_eq!(config.summarize.min_length, 20);
        assert!(!config.summarize.do_sample);
        assert_eq!(config.http.retries, 0);
        assert_eq!(config.http.retry_delay, 500);
        assert!(config.http.timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [chat]
            tool_server = "http://127.0.0.1:7860/"

            [http]
            retries = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.chat.tool_server, "http://127.0.0.1:7860/");
        assert_eq!(config.chat.api_name, DEFAULT_API_NAME);
        assert_eq!(config.http.retries, 2);
        assert_eq!(config.http.retry_delay, 500);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("[chat]\nmodle = \"x\"\n").unwrap_err();
        assert!(err.to_string().contains("modle"));
    }

    #[test]
    fn inverted_length_bounds_fail_validation() {
        let config =
            Config::from_toml_str("[summarize]\nmax_length = 10\nmin_length = 30\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("summarize.min_length (30)"));
    }

    #[test]
    fn bad_url_fails_validation() {
        let config = Config::from_toml_str("[chat]\ntool_server = \"not a url\"\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("chat.tool_server"));
    }

    #[test]
    fn blank_model_fails_validation() {
        let config = Config::from_toml_str("[sentiment]\nmodel = \"  \"\n").unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "Invalid config: sentiment.model must not be empty");
    }
}
