//! Container configuration
//!
//! Every field has a default, so a config file only needs the keys it
//! overrides:
//!
//! ```json
//! { "sync_on_flush": false, "metadata": { "source": "crm-export" } }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{ContainerError, ContainerResult};
use super::frame::RESERVED_METADATA_PREFIX;

/// Writer and reader settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContainerConfig {
    /// fsync on `flush()` and `close()`
    #[serde(default = "default_sync_on_flush")]
    pub sync_on_flush: bool,

    /// Buffer size for the writer and reader
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    /// Largest record payload a reader accepts
    #[serde(default = "default_max_record_bytes")]
    pub max_record_bytes: u32,

    /// User metadata written into the header
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

fn default_sync_on_flush() -> bool {
    true
}
fn default_buffer_capacity() -> usize {
    64 * 1024
} // 64KB
fn default_max_record_bytes() -> u32 {
    64 * 1024 * 1024
} // 64MB

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            sync_on_flush: default_sync_on_flush(),
            buffer_capacity: default_buffer_capacity(),
            max_record_bytes: default_max_record_bytes(),
            metadata: BTreeMap::new(),
        }
    }
}

impl ContainerConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> ContainerResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ContainerError::Config {
            path: path.display().to_string(),
            reason: format!("failed to read config: {}", e),
        })?;

        let config: ContainerConfig =
            serde_json::from_str(&content).map_err(|e| ContainerError::Config {
                path: path.display().to_string(),
                reason: format!("invalid JSON: {}", e),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Adds one user metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Checks user metadata keys
    pub fn validate(&self) -> ContainerResult<()> {
        for key in self.metadata.keys() {
            if key.is_empty() {
                return Err(ContainerError::InvalidMetadata {
                    key: key.clone(),
                    reason: "key must not be empty".into(),
                });
            }
            if key.starts_with(RESERVED_METADATA_PREFIX) {
                return Err(ContainerError::InvalidMetadata {
                    key: key.clone(),
                    reason: format!("prefix '{}' is reserved", RESERVED_METADATA_PREFIX),
                });
            }
        }
        Ok(())
    }
}
