//! # Channel Session
//!
//! The owned state of one channel: prefix, commands, cooldowns and modules.
//! Built once from the channel config at startup and passed by reference into
//! the dispatcher; nothing here is shared between channels.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tokio::time::Instant;

use crate::application::commands::CommandRegistry;
use crate::application::cooldown::CooldownTracker;
use crate::application::modules::{ModuleKind, ModuleRegistry};
use crate::domain::config::{ChannelConfig, ChannelMeta};

/// The part of a session that modules may read and mutate.
#[derive(Debug)]
pub struct SessionState {
    pub channel: String,
    pub prefix: String,
    pub commands: CommandRegistry,
    pub cooldowns: CooldownTracker,
    pub started_at: Instant,
    module_config: BTreeMap<String, Map<String, Value>>,
    dirty: bool,
}

impl SessionState {
    pub fn new(channel: &str, prefix: &str, commands: CommandRegistry) -> Self {
        Self {
            channel: channel.to_string(),
            prefix: prefix.to_string(),
            commands,
            cooldowns: CooldownTracker::new(),
            started_at: Instant::now(),
            module_config: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Flags the channel config for write-back.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Stores a module option override and flags it for write-back.
    /// Takes effect on the next load; the running instance keeps its own copy.
    pub fn set_module_option(&mut self, module: &str, key: &str, value: Value) {
        self.module_config
            .entry(module.to_lowercase())
            .or_default()
            .insert(key.to_string(), value);
        self.mark_dirty();
    }
}

pub struct ChannelSession {
    pub state: SessionState,
    pub modules: ModuleRegistry,
    module_names: Vec<String>,
}

impl ChannelSession {
    pub fn new(state: SessionState, modules: ModuleRegistry) -> Self {
        Self {
            state,
            modules,
            module_names: Vec::new(),
        }
    }

    /// Validates the stored config and loads the channel's modules.
    ///
    /// Any invalid entry fails the whole session.
    pub async fn from_config(
        channel: &str,
        config: ChannelConfig,
        catalogue: &[ModuleKind],
    ) -> Result<Self> {
        if config.meta.prefix.trim().is_empty() {
            bail!("channel {channel}: prefix must not be empty");
        }
        let commands = CommandRegistry::from_entries(&config.commands)
            .with_context(|| format!("channel {channel}: invalid command in config"))?;

        let modules =
            ModuleRegistry::load_for_channel(catalogue, &config.modules, &config.module_config).await;

        tracing::info!(
            channel,
            prefix = %config.meta.prefix,
            commands = commands.len(),
            modules = ?modules.names().collect::<Vec<_>>(),
            "channel session ready"
        );

        let mut state = SessionState::new(channel, &config.meta.prefix, commands);
        state.module_config = config.module_config;
        let mut session = Self::new(state, modules);
        session.module_names = config.modules;
        Ok(session)
    }

    /// The config as it should be written back.
    pub fn to_config(&self) -> ChannelConfig {
        ChannelConfig {
            meta: ChannelMeta {
                prefix: self.state.prefix.clone(),
            },
            commands: self.state.commands.to_entries(),
            modules: self.module_names.clone(),
            module_config: self.state.module_config.clone(),
        }
    }
}
