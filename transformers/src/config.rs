//! Runtime configuration read from the environment.
//!
//! | Variable                        | Default         |
//! |---------------------------------|-----------------|
//! | `TRANSFORMERS_PORT`             | `3000`          |
//! | `TRANSFORMERS_DATA`             | embedded seed   |
//! | `TRANSFORMERS_DEFAULT_PER_PAGE` | `15`            |
//! | `TRANSFORMERS_MAX_PER_PAGE`     | `100`           |
//!
//! CLI flags override these through the `with_*` builders.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PER_PAGE: usize = 15;
pub const MAX_PER_PAGE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Port the HTTP server listens on
    pub port: u16,
    /// Seed JSON file; the embedded seed when `None`
    pub data_path: Option<PathBuf>,
    /// Page size when a request gives none
    pub default_per_page: usize,
    /// Upper bound for requested page sizes
    pub max_per_page: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: None,
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
        }
    }
}

impl Config {
    /// Read the `TRANSFORMERS_*` variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            port: parse(&lookup, "TRANSFORMERS_PORT")?.unwrap_or(defaults.port),
            data_path: lookup("TRANSFORMERS_DATA")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            default_per_page: parse(&lookup, "TRANSFORMERS_DEFAULT_PER_PAGE")?
                .unwrap_or(defaults.default_per_page),
            max_per_page: parse(&lookup, "TRANSFORMERS_MAX_PER_PAGE")?
                .unwrap_or(defaults.max_per_page),
        };
        config.check()
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    pub fn with_data_path(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.data_path = path;
        }
        self
    }

    /// Clamp a requested page size to `1..=max_per_page`.
    pub fn per_page(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_per_page)
            .clamp(1, self.max_per_page)
    }

    fn check(self) -> Result<Self, ConfigError> {
        if self.max_per_page == 0 {
            return Err(ConfigError::InvalidValue {
                key: "TRANSFORMERS_MAX_PER_PAGE",
                value: self.max_per_page.to_string(),
            });
        }
        if self.default_per_page == 0 || self.default_per_page > self.max_per_page {
            return Err(ConfigError::InvalidValue {
                key: "TRANSFORMERS_DEFAULT_PER_PAGE",
                value: self.default_per_page.to_string(),
            });
        }
        Ok(self)
    }
}

fn parse<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}
