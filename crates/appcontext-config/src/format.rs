//! The closed set of on-disk configuration formats.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::error::ConfigError;

/// Serialization format of a configuration file.
///
/// The format also fixes the file extension: a `Toml` manager only reads and
/// writes `*.toml` paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Yaml,
    #[default]
    Toml,
}

/// A document could not be parsed in the expected format.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

/// A value could not be represented in the configured format.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Toml(#[from] toml::ser::Error),
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Json, Format::Yaml, Format::Toml];

    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Toml => "toml",
        }
    }

    /// Whether `path` carries this format's extension.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.extension())
    }

    pub fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, DecodeError> {
        Ok(match self {
            Format::Json => serde_json::from_str(text)?,
            Format::Yaml => serde_yaml::from_str(text)?,
            Format::Toml => toml::from_str(text)?,
        })
    }

    pub fn encode<T: Serialize>(&self, value: &T) -> Result<String, EncodeError> {
        Ok(match self {
            Format::Json => serde_json::to_string_pretty(value)?,
            Format::Yaml => serde_yaml::to_string(value)?,
            Format::Toml => toml::to_string_pretty(value)?,
        })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::ALL
            .into_iter()
            .find(|format| format.extension() == s)
            .ok_or_else(|| ConfigError::UnsupportedFormat(s.to_string()))
    }
}
