//! Loading and saving run configuration files
//!
//! A run configuration may be written as TOML, JSON or YAML; the format is
//! chosen by the file extension.

use std::fmt;

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, NormalizedPath, Result, io};

/// Serialization format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
    Yaml,
}

impl Format {
    /// Pick the format for `path`, case-insensitively by extension.
    pub fn from_path(path: &NormalizedPath) -> Result<Self> {
        let extension = path.extension().unwrap_or("").to_lowercase();
        match extension.as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::UnsupportedFormat { extension }),
        }
    }

    fn parse<T: DeserializeOwned>(self, content: &str) -> std::result::Result<T, String> {
        match self {
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        }
    }

    fn render<T: Serialize>(self, value: &T) -> std::result::Result<String, String> {
        let mut text = match self {
            Self::Toml => toml::to_string_pretty(value).map_err(|e| e.to_string())?,
            Self::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string())?,
            Self::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string())?,
        };
        if !text.ends_with('\n') {
            text.push('\n');
        }
        Ok(text)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        })
    }
}

/// Reads and writes configuration values in the format their path names.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load a configuration value.
    ///
    /// An unknown extension is rejected before the file is touched.
    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let format = Format::from_path(path)?;
        let content = io::read_text(path)?;
        tracing::debug!(path = %path, %format, "loading config");

        format.parse(&content).map_err(|message| Error::ConfigParse {
            path: path.to_native(),
            format,
            message,
        })
    }

    /// Save a configuration value, replacing the file atomically.
    pub fn save<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<()> {
        let format = Format::from_path(path)?;
        let content = format.render(value).map_err(|message| Error::ConfigSerialize {
            path: path.to_native(),
            format,
            message,
        })?;
        io::write_text(path, &content)
    }
}
