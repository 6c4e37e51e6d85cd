//! Harness configuration.
//!
//! Settings come from an optional YAML file named by `ECHOCHECK_CONFIG`,
//! then individual environment variables override single fields.

use std::path::{Path, PathBuf};

use echocheck_domain::request::parse_http_url;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Names the YAML configuration file.
pub const CONFIG_PATH_VAR: &str = "ECHOCHECK_CONFIG";
/// Overrides [`HarnessConfig::base_url`].
pub const BASE_URL_VAR: &str = "ECHOCHECK_BASE_URL";
/// Overrides [`HarnessConfig::concurrency`].
pub const CONCURRENCY_VAR: &str = "ECHOCHECK_CONCURRENCY";
/// Overrides [`HarnessConfig::default_timeout_ms`]; `0` disables it.
pub const TIMEOUT_VAR: &str = "ECHOCHECK_TIMEOUT_MS";
/// Overrides [`HarnessConfig::seed`].
pub const SEED_VAR: &str = "ECHOCHECK_SEED";
/// Overrides [`HarnessConfig::report_path`].
pub const REPORT_VAR: &str = "ECHOCHECK_REPORT";

/// Errors detected before any scenario runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid YAML for [`HarnessConfig`].
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// An environment variable held an unusable value.
    #[error("invalid value '{value}' for {var}: {reason}")]
    InvalidVar {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
        /// Parse failure.
        reason: String,
    },

    /// The base URL is not an absolute http(s) URL.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// Configured URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Concurrency must be at least one.
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
}

/// Settings for one harness run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Echo service every scenario path is joined onto.
    pub base_url: String,
    /// Scenarios in flight at once; `1` runs them in order.
    pub concurrency: usize,
    /// Deadline for requests that do not set one.
    pub default_timeout_ms: Option<u64>,
    /// Seed for generated inputs. Unset means a fresh seed per run.
    pub seed: Option<u64>,
    /// Where to write the JSON report, if anywhere.
    pub report_path: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "https://httpbin.org/".to_string(),
            concurrency: 4,
            default_timeout_ms: Some(30_000),
            seed: None,
            report_path: None,
        }
    }
}

impl HarnessConfig {
    /// Loads configuration from the process environment and validates it.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file or any variable is unusable.
    pub async fn load() -> Result<Self, ConfigError> {
        Self::load_with(|name| std::env::var(name).ok()).await
    }

    /// Same as [`HarnessConfig::load`] with an injectable variable lookup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file or any variable is unusable.
    pub async fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_PATH_VAR) {
            Some(path) => Self::from_file(Path::new(&path)).await?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        config.validate()?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Reads a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub async fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_yaml_str(&content)
    }

    /// Parses YAML; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed YAML or unknown fields.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Applies `ECHOCHECK_*` overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidVar`] for unparsable numbers.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(BASE_URL_VAR) {
            self.base_url = url;
        }
        if let Some(value) = lookup(CONCURRENCY_VAR) {
            self.concurrency = parse_var(CONCURRENCY_VAR, &value)?;
        }
        if let Some(value) = lookup(TIMEOUT_VAR) {
            let ms: u64 = parse_var(TIMEOUT_VAR, &value)?;
            self.default_timeout_ms = (ms > 0).then_some(ms);
        }
        if let Some(value) = lookup(SEED_VAR) {
            self.seed = Some(parse_var(SEED_VAR, &value)?);
        }
        if let Some(path) = lookup(REPORT_VAR).filter(|p| !p.trim().is_empty()) {
            self.report_path = Some(PathBuf::from(path));
        }
        Ok(())
    }

    /// Checks the settings that would otherwise fail mid-run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] or
    /// [`ConfigError::ZeroConcurrency`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_http_url(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidVar {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
