//! Configuration schema (sqlrender.toml)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::options::OptionsPolicy;

/// Template environment settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Drop the first newline after a block tag
    pub trim_blocks: bool,

    /// Strip leading whitespace before a block tag
    pub lstrip_blocks: bool,

    /// Keep the final newline of the template in the output
    pub keep_trailing_newline: bool,

    /// Fail rendering on access to undefined values
    pub strict_undefined: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            trim_blocks: true,
            lstrip_blocks: true,
            keep_trailing_newline: true,
            strict_undefined: true,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Template file to render instead of the embedded one
    #[serde(default)]
    pub template: Option<PathBuf>,

    /// Handling of malformed plugin options
    #[serde(default)]
    pub options_policy: OptionsPolicy,

    /// Template environment settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template: None,
            options_policy: OptionsPolicy::default(),
            render: RenderConfig::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Configured template path, resolved against the project root
    pub fn template_path(&self) -> Option<PathBuf> {
        self.template.as_ref().map(|p| {
            if p.is_relative() {
                self.project_root.join(p)
            } else {
                p.clone()
            }
        })
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}
