use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::webdav::DEFAULT_TIMEOUT;

const CONFIG_DIR: &str = "catalog-audit";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// View type to audit; unset, empty, `all` or `*` audits every group.
    pub view_type: Option<String>,
    pub site_id: Option<String>,
    pub online_only: bool,
    pub parse_concurrently: bool,
    pub webdav: WebDavConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebDavConfig {
    pub url: Option<String>,
    pub username: Option<String>,
    /// Prefix stripped from listed hrefs; defaults to the URL path.
    pub base_path: Option<String>,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for WebDavConfig {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            base_path: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            view_type: None,
            site_id: None,
            online_only: false,
            parse_concurrently: true,
            webdav: WebDavConfig::default(),
        }
    }
}

impl Config {
    /// `$XDG_CONFIG_HOME/catalog-audit/config.toml`, else `~/.config/catalog-audit/config.toml`.
    pub fn central_config_path() -> Option<PathBuf> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
        Some(base.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Explicit path, then the central config if it exists, then defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::central_config_path().filter(|p| p.is_file()) {
                Some(central) => Self::from_file(&central),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigLoadError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.webdav.timeout.is_zero() {
            return Err("webdav.timeout must be greater than zero".to_string());
        }
        if let Some(url) = &self.webdav.url {
            Url::parse(url).map_err(|e| format!("webdav.url '{url}' is not a valid URL: {e}"))?;
        }
        Ok(())
    }
}
