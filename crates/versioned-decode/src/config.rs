// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decoder configuration.
//!
//! Supports both programmatic and file-based configuration. Files ending in
//! `.yaml`/`.yml` are read as YAML, everything else as TOML.
//!
//! ```toml
//! allow_unknown = true
//! format = "yaml"
//! replay = "buffered"
//! max_document_size = 1048576
//! ```
//!
//! TOML has no null, so a TOML file always keeps a document size limit
//! (the default when the key is omitted). Only a YAML file can disable it
//! with `max_document_size: null`, or set the field to `None` in code.

use crate::codec::Format;
use crate::decoder::Replay;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Registry and decode protocol settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Decode unknown types into `Unstructured` instead of failing.
    #[serde(default)]
    pub allow_unknown: bool,

    /// Document format.
    #[serde(default)]
    pub format: Format,

    /// How the input is replayed after the discriminator pass.
    #[serde(default)]
    pub replay: Replay,

    /// Upper bound on buffered document bytes. `None` disables the limit.
    #[serde(default = "default_max_document_size")]
    pub max_document_size: Option<usize>,
}

fn default_max_document_size() -> Option<usize> {
    Some(16 * 1024 * 1024)
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            allow_unknown: false,
            format: Format::default(),
            replay: Replay::default(),
            max_document_size: default_max_document_size(),
        }
    }
}

impl DecodeConfig {
    /// Load configuration from a TOML or YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_document_size == Some(0) {
            return Err(ConfigError::Invalid(
                "max_document_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
