//! # Configuration
//!
//! Two layers of configuration:
//! - `AppConfig`: process-wide settings read from `data/config.yaml` (transport, channels, roles).
//! - `ChannelConfig`: one channel's prefix, commands and modules, stored as JSON.
//!
//! Both are plain serde records. Validation into engine types happens once, when a
//! channel session is built.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::domain::types::Author;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub transport: TransportKind,
    #[serde(default)]
    pub matrix: Option<MatrixConfig>,
    /// Channel id (Matrix room id) -> channel config path, relative to `data_dir`.
    #[serde(default)]
    pub channels: BTreeMap<String, String>,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub moderators: Vec<String>,
    #[serde(default)]
    pub subscribers: Vec<String>,
    #[serde(default)]
    pub vips: Vec<String>,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn channel_path(&self, relative: &str) -> PathBuf {
        self.data_dir.join(relative)
    }

    /// Author with roles taken from the `moderators`, `subscribers` and `vips` lists.
    pub fn author(&self, id: &str, name: &str) -> Author {
        let listed = |list: &[String]| list.iter().any(|a| a.to_lowercase() == id.to_lowercase());
        let mut author = Author::new(id, name);
        if listed(&self.moderators) {
            author = author.moderator();
        }
        if listed(&self.subscribers) {
            author = author.subscriber();
        }
        if listed(&self.vips) {
            author = author.vip();
        }
        author
    }
}

#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Matrix,
    Console,
}

/// Specific configuration for the Matrix service.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub homeserver: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    #[serde(default = "default_module_timeout")]
    pub module_timeout_secs: u64,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            module_timeout_secs: default_module_timeout(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    /// 0 = off, 1 = report errors, 2 = also announce instance start.
    #[serde(default)]
    pub level: u8,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default = "default_telemetry_username")]
    pub username: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            level: 0,
            webhook_url: None,
            username: default_telemetry_username(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_module_timeout() -> u64 {
    30
}

fn default_queue_capacity() -> usize {
    64
}

fn default_telemetry_username() -> String {
    "rasbot".to_string()
}

/// On-disk channel config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub meta: ChannelMeta,
    #[serde(default)]
    pub commands: BTreeMap<String, CommandEntry>,
    #[serde(default)]
    pub modules: Vec<String>,
    /// Per-module option overrides, applied over each module's defaults.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub module_config: BTreeMap<String, Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMeta {
    pub prefix: String,
}

/// A command as stored on disk. `cooldown` is signed so a bad edit is caught
/// by validation instead of failing as a parse error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEntry {
    #[serde(default)]
    pub cooldown: i64,
    #[serde(default)]
    pub requires_mod: bool,
    #[serde(default)]
    pub hidden: bool,
    pub response: String,
}

impl CommandEntry {
    fn new(cooldown: i64, requires_mod: bool, response: &str) -> Self {
        Self {
            cooldown,
            requires_mod,
            hidden: false,
            response: response.to_string(),
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        let mut commands = BTreeMap::new();
        commands.insert("help".into(), CommandEntry::new(10, false, "@&caller& > &help&"));
        commands.insert("uptime".into(), CommandEntry::new(10, false, "@&caller& > &uptime&"));
        commands.insert("cmdadd".into(), CommandEntry::new(0, true, "@&caller& > &cmdadd&"));
        commands.insert("cmddel".into(), CommandEntry::new(0, true, "@&caller& > &cmddel&"));
        commands.insert("prefix".into(), CommandEntry::new(0, true, "@&caller& > &prefix&"));

        Self {
            meta: ChannelMeta {
                prefix: "r!".to_string(),
            },
            commands,
            modules: Vec::new(),
            module_config: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_defaults() {
        let yaml = r#"
transport: console
channels:
  "!room:example.org": "channels/main.json"
moderators: ["@alice:example.org"]
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.transport, TransportKind::Console);
        assert!(config.matrix.is_none());
        assert_eq!(config.engine.module_timeout_secs, 30);
        assert_eq!(config.engine.queue_capacity, 64);
        assert_eq!(config.telemetry.level, 0);
        assert_eq!(
            config.channel_path("channels/main.json"),
            PathBuf::from("data/channels/main.json")
        );
    }

    #[test]
    fn test_author_roles() {
        let yaml = r#"
moderators: ["@Alice:example.org"]
vips: ["@bob:example.org"]
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        let alice = config.author("@alice:example.org", "alice");
        assert!(alice.is_moderator && !alice.is_vip);
        let bob = config.author("@bob:example.org", "bob");
        assert!(bob.is_vip && bob.is_privileged() && !bob.is_moderator);
        assert!(!config.author("@eve:example.org", "eve").is_privileged());
    }

    #[test]
    fn test_channel_config_parses_without_module_config() {
        let json = r#"{
            "meta": { "prefix": "!" },
            "commands": {
                "hi": { "cooldown": 3, "requires_mod": false, "hidden": true, "response": "hello &caller&" }
            },
            "modules": ["request"]
        }"#;
        let config: ChannelConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.meta.prefix, "!");
        assert_eq!(config.modules, vec!["request".to_string()]);
        assert!(config.module_config.is_empty());
        let hi = &config.commands["hi"];
        assert_eq!(hi.cooldown, 3);
        assert!(hi.hidden);
    }

    #[test]
    fn test_default_channel_uses_caller() {
        let config = ChannelConfig::default();
        assert_eq!(config.meta.prefix, "r!");
        assert!(config.commands.values().all(|c| !c.response.contains("&user&")));
        assert!(config.commands["cmdadd"].requires_mod);
    }
}
