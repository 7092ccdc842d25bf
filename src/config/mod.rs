use serde::{Deserialize, Serialize};

use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{api::DEFAULT_BASE_URL, dto::DEFAULT_PER_PAGE};

const ENV_PREFIX: &str = "NOTEHUB_";
const CONFIG_PATH_VAR: &str = "NOTEHUB_CONFIG";
const TOKEN_VAR: &str = "NOTEHUB_TOKEN";

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    /// Bearer token attached to every request
    pub token: Option<String>,
    pub per_page: u32,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// How long fetched data is served from the cache without refetching
    #[serde(with = "humantime_serde")]
    pub stale_time: Duration,
    pub draft_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            per_page: DEFAULT_PER_PAGE,
            request_timeout: Duration::from_secs(30),
            stale_time: Duration::from_secs(60),
            draft_path: PathBuf::from(".notehub-draft.json"),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("per_page", &self.per_page)
            .field("request_timeout", &self.request_timeout)
            .field("stale_time", &self.stale_time)
            .field("draft_path", &self.draft_path)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to load configuration from environment variables: {0}")]
    Env(#[from] envy::Error),
}

impl Config {
    /// # Errors
    ///
    /// Fails when the YAML is malformed or has fields of the wrong type.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(contents).map_err(Into::into)
    }

    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    /// # Errors
    ///
    /// Fails when a `NOTEHUB_*` variable cannot be parsed into its field.
    pub fn from_env() -> Result<Self, ConfigError> {
        envy::prefixed(ENV_PREFIX).from_env().map_err(Into::into)
    }

    /// Replaces the token, treating a blank value as no token.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|token| !token.trim().is_empty());
        self
    }
}

/// Loads the client configuration.
///
/// Tries the file named by `NOTEHUB_CONFIG`, then `config.yaml`, then
/// `config.example.yaml`, and finally `NOTEHUB_*` environment variables.
/// `NOTEHUB_TOKEN` always takes precedence over a token from a file.
///
/// # Errors
///
/// Fails when the chosen source cannot be read or parsed.
pub fn load_config() -> Result<Config, ConfigError> {
    // Retrieve env variable
    let config_path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config.yaml".to_string());

    let config = if Path::new(&config_path).exists() {
        Config::from_file(&config_path)?
    } else if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        Config::from_file("config.yaml")?
    } else if Path::new("config.example.yaml").exists() {
        tracing::warn!(
            "Config file '{}' and 'config.yaml' not found, falling back to 'config.example.yaml'\
             \n This file should not be used and should be replaced with actual data",
            config_path
        );
        Config::from_file("config.example.yaml")?
    } else {
        tracing::debug!("No config file found, loading configuration from environment variables");
        Config::from_env()?
    };

    match env::var(TOKEN_VAR) {
        Ok(token) if !token.trim().is_empty() => Ok(config.with_token(Some(token))),
        _ => Ok(config),
    }
}
