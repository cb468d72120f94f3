//! `cvmatch.ron` loading.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cvmatch_engine::TransportSettings;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "cvmatch.ron";
pub const BASE_URL_ENV: &str = "CVMATCH_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: Option<u64>,
    pub download_dir: PathBuf,
    pub log_to_file: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let transport = TransportSettings::default();
        Self {
            base_url: transport.base_url,
            connect_timeout_secs: transport.connect_timeout.as_secs(),
            request_timeout_secs: None,
            download_dir: PathBuf::from("./downloads"),
            log_to_file: false,
        }
    }
}

impl AppConfig {
    pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn with_base_url_override(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|url| !url.trim().is_empty()) {
            self.base_url = url;
        }
        self
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Where the loaded settings came from; logged once the logger is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => write!(f, "defaults (no {DEFAULT_CONFIG_FILE})"),
        }
    }
}

/// Reads the config file, falling back to defaults when the default file is absent.
///
/// An explicitly named file must exist.
pub fn load(explicit: Option<&Path>) -> Result<(AppConfig, ConfigSource), ConfigError> {
    let path = explicit.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    let (config, source) = match fs::read_to_string(path) {
        Ok(text) => (
            AppConfig::parse(path, &text)?,
            ConfigSource::File(path.to_path_buf()),
        ),
        Err(err) if err.kind() == io::ErrorKind::NotFound && explicit.is_none() => {
            (AppConfig::default(), ConfigSource::Defaults)
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    Ok((
        config.with_base_url_override(std::env::var(BASE_URL_ENV).ok()),
        source,
    ))
}
