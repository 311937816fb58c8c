use std::env;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::client::ApiClient;
use crate::output::OutputFormat;

pub const DEFAULT_BASE_URL: &str = "https://verity.backworkai.com/api/v1";
pub const DEFAULT_CONFIG_NAME: &str = ".verity.yaml";

pub const API_KEY_ENV: &str = "VERITY_API_KEY";
pub const BASE_URL_ENV: &str = "VERITY_BASE_URL";
pub const OUTPUT_ENV: &str = "VERITY_OUTPUT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API key is required. Set VERITY_API_KEY or use --api-key flag")]
    MissingApiKey,
    #[error("could not read config file {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config file {}: {source}", .path.display())]
    ParseFile {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid output format '{0}' (expected table, json or yaml)")]
    InvalidOutput(String),
}

/// Values given explicitly on the command line.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub output: Option<String>,
}

/// Contents of `~/.verity.yaml`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfigFile {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub output: Option<String>,
}

impl ConfigFile {
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_CONFIG_NAME))
    }

    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(ConfigFile::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub output: OutputFormat,
}

impl Config {
    /// Reads the config file and the process environment, then applies
    /// `overrides` on top of them.
    ///
    /// The default config file is optional; one named with `--config` must exist.
    pub fn load(overrides: ConfigOverrides) -> Result<Config, ConfigError> {
        let file = match &overrides.config_file {
            Some(path) => {
                debug!(path = %path.display(), "reading config file");
                ConfigFile::read(path)?
            }
            None => match ConfigFile::default_path() {
                Some(path) if path.is_file() => {
                    debug!(path = %path.display(), "reading config file");
                    ConfigFile::read(&path)?
                }
                _ => ConfigFile::default(),
            },
        };

        Config::resolve(overrides, |name| env::var(name).ok(), file)
    }

    /// Picks each setting from the first source that has a non-empty value:
    /// flag, environment, config file, built-in default.
    pub fn resolve<E>(
        overrides: ConfigOverrides,
        env: E,
        file: ConfigFile,
    ) -> Result<Config, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let pick = |flag: Option<String>, name: &str, from_file: Option<String>| {
            flag.into_iter()
                .chain(env(name))
                .chain(from_file)
                .find(|value| !value.is_empty())
        };

        let api_key = pick(overrides.api_key, API_KEY_ENV, file.api_key);
        let base_url = pick(overrides.base_url, BASE_URL_ENV, file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let output = match pick(overrides.output, OUTPUT_ENV, file.output) {
            Some(output) => output
                .parse()
                .map_err(|_| ConfigError::InvalidOutput(output))?,
            None => OutputFormat::default(),
        };

        let config = Config {
            api_key,
            base_url,
            output,
        };
        debug!(
            base_url = %config.base_url,
            output = %config.output,
            api_key_set = config.api_key.is_some(),
            "resolved configuration"
        );
        Ok(config)
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }

    pub fn client(&self) -> Result<ApiClient, ConfigError> {
        Ok(ApiClient::new(self.api_key()?, self.base_url.as_str()))
    }
}
