use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ChunkError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Worksheet holding the account rows.
    pub sheet: String,
    /// Number of leading identifier digits used as the shard key.
    pub prefix_len: usize,
    /// Buffered records per shard before it is written out.
    pub flush_threshold: usize,
    /// Log a progress line every this many accepted rows. 0 disables it.
    pub progress_every: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            sheet: "All NPA".to_string(),
            prefix_len: 3,
            flush_threshold: 5000,
            progress_every: 50_000,
        }
    }
}

impl ChunkerConfig {
    /// Reads a YAML config. Missing fields fall back to defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ChunkerConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.prefix_len == 0 {
            return Err(ChunkError::InvalidConfig("prefix_len must be at least 1".to_string()));
        }
        if self.flush_threshold == 0 {
            return Err(ChunkError::InvalidConfig("flush_threshold must be at least 1".to_string()));
        }
        Ok(())
    }
}
