//! Conversion settings
//!
//! Loaded from `mapper.toml` (or `.json` / `.yaml`) through
//! [`ConfigStore`]. Older `config.json` files using `source_db` /
//! `target_db` are accepted as well.

use std::path::{Path, PathBuf};
use std::time::Duration;

use mapper_blocks::BlockKind;
use mapper_fs::{ConfigStore, NormalizedPath};
use mapper_transform::{ChatSettings, Dialect, Error as TransformError, chat};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default config file name
pub const CONFIG_FILE: &str = "mapper.toml";

fn default_kinds() -> Vec<BlockKind> {
    BlockKind::ALL.to_vec()
}

fn default_endpoint() -> String {
    chat::DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    chat::DEFAULT_MODEL.to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_elapsed_secs() -> u64 {
    60
}

/// `[transform]` section: how statements are sent to the conversion API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformSection {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Upper bound on time spent retrying one statement
    #[serde(default = "default_max_elapsed_secs")]
    pub max_elapsed_secs: u64,
}

impl Default for TransformSection {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            max_elapsed_secs: default_max_elapsed_secs(),
        }
    }
}

/// Settings for one conversion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionConfig {
    #[serde(alias = "source_db")]
    pub source_dialect: Dialect,

    #[serde(alias = "target_db")]
    pub target_dialect: Dialect,

    pub input_dir: PathBuf,

    pub output_dir: PathBuf,

    /// Statement elements to convert
    #[serde(default = "default_kinds")]
    pub kinds: Vec<BlockKind>,

    #[serde(default)]
    pub transform: TransformSection,
}

impl ConversionConfig {
    pub fn new(
        source_dialect: Dialect,
        target_dialect: Dialect,
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_dialect,
            target_dialect,
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            kinds: default_kinds(),
            transform: TransformSection::default(),
        }
    }

    /// Load from a `.toml`, `.json`, `.yaml` or `.yml` file.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let config: Self = ConfigStore::new().load(path)?;
        tracing::debug!(
            path = %path,
            source = %config.source_dialect,
            target = %config.target_dialect,
            "loaded conversion config"
        );
        Ok(config)
    }

    /// Save in the format given by the file extension.
    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        ConfigStore::new().save(path, self)?;
        Ok(())
    }

    pub fn input_root(&self) -> NormalizedPath {
        NormalizedPath::new(&self.input_dir)
    }

    pub fn output_root(&self) -> NormalizedPath {
        NormalizedPath::new(&self.output_dir)
    }

    /// Check the settings before any document is touched.
    ///
    /// The input directory must exist, the output directory must differ
    /// from it, and at least one statement kind must be selected.
    pub fn validate(&self) -> Result<()> {
        if self.kinds.is_empty() {
            return Err(Error::invalid_config("no statement kinds selected"));
        }
        if !self.input_dir.is_dir() {
            return Err(Error::invalid_config(format!(
                "input_dir {} is not a directory",
                self.input_dir.display()
            )));
        }
        if same_dir(&self.input_dir, &self.output_dir) {
            return Err(Error::invalid_config(format!(
                "output_dir {} must differ from input_dir",
                self.output_dir.display()
            )));
        }
        if self.transform.endpoint.trim().is_empty() {
            return Err(Error::invalid_config("transform.endpoint is empty"));
        }
        if self.transform.model.trim().is_empty() {
            return Err(Error::invalid_config("transform.model is empty"));
        }
        Ok(())
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key_from_env(&self) -> Result<String> {
        let var = &self.transform.api_key_env;
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(TransformError::MissingApiKey { var: var.clone() }.into()),
        }
    }

    /// Client settings for the chat-completions transformer.
    pub fn chat_settings(&self, api_key: impl Into<String>) -> ChatSettings {
        let mut settings = ChatSettings::new(api_key);
        settings.endpoint = self.transform.endpoint.clone();
        settings.model = self.transform.model.clone();
        settings.timeout = Duration::from_secs(self.transform.timeout_secs);
        settings.max_elapsed = Duration::from_secs(self.transform.max_elapsed_secs);
        settings
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => NormalizedPath::new(a).as_str().trim_end_matches('/')
            == NormalizedPath::new(b).as_str().trim_end_matches('/'),
    }
}
