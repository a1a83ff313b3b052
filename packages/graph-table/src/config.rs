//! Transformer configuration
//!
//! Defaults cover almost every caller; YAML loading exists for consumers that
//! need canonical child order independent of how rows were fetched.
//!
//! ```yaml
//! version: 1
//! child_order: canonical
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{GraphTableError, Result};

/// Supported schema versions
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

/// How children sharing a parent are ordered in the rebuilt record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildOrder {
    /// Order in which the node rows were supplied
    #[default]
    RowOrder,
    /// Ascending `(key, identifier)`; ties keep row order
    Canonical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformConfig {
    /// Schema version (always 1 for now)
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub child_order: ChildOrder,
}

fn default_version() -> u32 {
    1
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            child_order: ChildOrder::default(),
        }
    }
}

impl TransformConfig {
    /// Canonical child ordering (builder pattern)
    pub fn canonical() -> Self {
        Self::default().with_child_order(ChildOrder::Canonical)
    }

    pub fn with_child_order(mut self, child_order: ChildOrder) -> Self {
        self.child_order = child_order;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_VERSIONS.contains(&self.version) {
            return Err(GraphTableError::config(format!(
                "Unsupported configuration version {}. Supported versions: {:?}",
                self.version, SUPPORTED_VERSIONS
            )));
        }
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
