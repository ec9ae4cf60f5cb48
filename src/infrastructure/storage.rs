//! # Channel Storage
//!
//! JSON file per channel. A missing file is created with the default config.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::domain::config::ChannelConfig;
use crate::domain::traits::ChannelStore;

pub struct JsonChannelStore {
    path: PathBuf,
}

impl JsonChannelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ChannelStore for JsonChannelStore {
    fn load(&self) -> Result<ChannelConfig> {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "no channel config, writing default");
            let config = ChannelConfig::default();
            self.save(&config)?;
            return Ok(config);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    fn save(&self, config: &ChannelConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(config)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), "channel config saved");
        Ok(())
    }
}
