//! # Domain Types
//!
//! Common data structures shared by the engine, the modules and the transports.

use serde::{Deserialize, Serialize};

/// The person who sent a chat line. Supplied by the transport, read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub is_moderator: bool,
    pub is_subscriber: bool,
    pub is_vip: bool,
}

impl Author {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn moderator(mut self) -> Self {
        self.is_moderator = true;
        self
    }

    pub fn subscriber(mut self) -> Self {
        self.is_subscriber = true;
        self
    }

    pub fn vip(mut self) -> Self {
        self.is_vip = true;
        self
    }

    /// Mods, subs and VIPs.
    pub fn is_privileged(&self) -> bool {
        self.is_moderator || self.is_subscriber || self.is_vip
    }
}

/// A config-defined chat trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    pub cooldown_seconds: u64,
    pub requires_mod: bool,
    pub hidden: bool,
    pub response: String,
}

/// A chat line waiting in a channel's queue.
#[derive(Debug, Clone)]
pub struct IncomingLine {
    pub author: Author,
    pub body: String,
}
