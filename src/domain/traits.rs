//! # Domain Traits
//!
//! Abstract interfaces for the external collaborators (chat transport, config storage).
//! Allows for pluggable implementations in the Infrastructure layer.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::config::ChannelConfig;

/// Abstract interface for a Chat Provider (e.g., Matrix, Console)
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a message to the channel
    async fn send_message(&self, content: &str) -> Result<(), String>;

    /// Get the current channel ID
    fn room_id(&self) -> String;
}

/// Persistence for one channel's config.
pub trait ChannelStore: Send + Sync {
    /// Read the config, writing and returning the default when none exists yet.
    fn load(&self) -> Result<ChannelConfig>;

    fn save(&self, config: &ChannelConfig) -> Result<()>;
}
