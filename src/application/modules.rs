//! # Module Registry
//!
//! Modules are pluggable handlers referenced from templates as `&name&`.
//! Each module type is described by a `ModuleKind` (help text, argument needs,
//! default options, async constructor); the compiled catalogue lives in
//! `interface::modules`. A channel session loads its modules once at start:
//! construction failures are recorded as unavailable instead of aborting the session.

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use async_trait::async_trait;

use crate::application::session::SessionState;
use crate::domain::errors::EngineError;
use crate::domain::types::Author;

/// What a module hands back to the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// Veto the whole response.
    Suppress,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

/// How many leftover positional arguments a module pops when referenced inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Consumes {
    pub required: usize,
    /// `None` takes everything that is left.
    pub limit: Option<usize>,
}

impl Consumes {
    pub const fn all() -> Self {
        Self {
            required: 0,
            limit: None,
        }
    }

    pub const fn up_to(n: usize) -> Self {
        Self {
            required: 0,
            limit: Some(n),
        }
    }
}

/// Everything a module may see or touch during one invocation.
pub struct InvocationContext<'a> {
    pub author: &'a Author,
    pub session: &'a mut SessionState,
    pub modules: &'a ModuleRegistry,
}

#[async_trait]
pub trait Module: Send {
    async fn main(
        &mut self,
        args: Vec<String>,
        ctx: &mut InvocationContext<'_>,
    ) -> Result<Reply, EngineError>;
}

/// Effective options of one module instance: defaults with channel overrides applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleConfig {
    values: Map<String, Value>,
}

impl ModuleConfig {
    /// Override wins key by key. Keys the defaults don't know are kept, but logged.
    pub fn merged(module: &str, defaults: Map<String, Value>, overrides: Option<&Map<String, Value>>) -> Self {
        let mut values = defaults;
        if let Some(overrides) = overrides {
            for (key, value) in overrides {
                if !values.contains_key(key) {
                    tracing::warn!(module, key = %key, "unknown module config key");
                }
                values.insert(key.clone(), value.clone());
            }
        }
        Self { values }
    }

    /// Deserializes the options into a module's typed settings.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.values.clone()))
    }
}

pub type ModuleFactory = fn(ModuleConfig) -> BoxFuture<'static, anyhow::Result<Box<dyn Module>>>;

/// Compiled description of a module type.
pub struct ModuleKind {
    pub name: &'static str,
    pub help: &'static str,
    pub consumes: Consumes,
    /// Core modules are loaded for every channel; the rest only when listed in its config.
    pub core: bool,
    pub defaults: fn() -> Map<String, Value>,
    pub build: ModuleFactory,
}

pub struct LoadedModule {
    pub name: String,
    pub help: String,
    pub consumes: Consumes,
    pub instance: Mutex<Box<dyn Module>>,
}

enum Slot {
    Loaded(Arc<LoadedModule>),
    Unavailable(String),
}

#[derive(Default)]
pub struct ModuleRegistry {
    slots: BTreeMap<String, Slot>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every core module of `catalogue` plus the ones the channel asks for.
    pub async fn load_for_channel(
        catalogue: &[ModuleKind],
        requested: &[String],
        overrides: &BTreeMap<String, Map<String, Value>>,
    ) -> Self {
        let mut registry = Self::new();

        for kind in catalogue.iter().filter(|k| k.core) {
            registry.load(kind, overrides.get(kind.name)).await;
        }

        for name in requested {
            let name = name.to_lowercase();
            if registry.slots.contains_key(&name) {
                continue;
            }
            match catalogue.iter().find(|k| k.name == name) {
                Some(kind) => registry.load(kind, overrides.get(kind.name)).await,
                None => {
                    tracing::warn!(module = %name, "configured module does not exist");
                    registry.mark_unavailable(&name, "no such module type");
                }
            }
        }

        registry
    }

    /// Constructs one module. Failure is recorded, not returned.
    pub async fn load(&mut self, kind: &ModuleKind, overrides: Option<&Map<String, Value>>) {
        let config = ModuleConfig::merged(kind.name, (kind.defaults)(), overrides);
        match (kind.build)(config).await {
            Ok(instance) => {
                tracing::debug!(module = kind.name, "module loaded");
                self.insert(kind.name, kind.help, kind.consumes, instance);
            }
            Err(e) => {
                tracing::error!(module = kind.name, "module failed to load: {:#}", e);
                self.mark_unavailable(kind.name, &format!("{e:#}"));
            }
        }
    }

    pub fn insert(&mut self, name: &str, help: &str, consumes: Consumes, instance: Box<dyn Module>) {
        let loaded = LoadedModule {
            name: name.to_string(),
            help: help.to_string(),
            consumes,
            instance: Mutex::new(instance),
        };
        self.slots.insert(name.to_lowercase(), Slot::Loaded(Arc::new(loaded)));
    }

    pub fn mark_unavailable(&mut self, name: &str, reason: &str) {
        self.slots
            .insert(name.to_lowercase(), Slot::Unavailable(reason.to_string()));
    }

    /// Unavailable modules are found, but fail; unknown names are `ModuleNotFound`.
    pub fn lookup(&self, name: &str) -> Result<Arc<LoadedModule>, EngineError> {
        let name = name.to_lowercase();
        match self.slots.get(&name) {
            Some(Slot::Loaded(module)) => Ok(module.clone()),
            Some(Slot::Unavailable(reason)) => Err(EngineError::ModuleUnavailable {
                name,
                reason: reason.clone(),
            }),
            None => Err(EngineError::ModuleNotFound(name)),
        }
    }

    /// True for loaded and unavailable modules alike.
    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(&name.to_lowercase())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::CommandRegistry;
    use serde::Deserialize;
    use serde_json::json;

    struct Fixed(String);

    #[async_trait]
    impl Module for Fixed {
        async fn main(
            &mut self,
            _args: Vec<String>,
            _ctx: &mut InvocationContext<'_>,
        ) -> Result<Reply, EngineError> {
            Ok(Reply::Text(self.0.clone()))
        }
    }

    #[derive(Deserialize)]
    struct FixedSettings {
        greeting: String,
        loud: bool,
    }

    fn fixed_defaults() -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("greeting".into(), json!("hi"));
        map.insert("loud".into(), json!(false));
        map
    }

    fn build_fixed(config: ModuleConfig) -> BoxFuture<'static, anyhow::Result<Box<dyn Module>>> {
        Box::pin(async move {
            let settings: FixedSettings = config.parse()?;
            let text = if settings.loud {
                settings.greeting.to_uppercase()
            } else {
                settings.greeting
            };
            Ok(Box::new(Fixed(text)) as Box<dyn Module>)
        })
    }

    fn build_broken(_config: ModuleConfig) -> BoxFuture<'static, anyhow::Result<Box<dyn Module>>> {
        Box::pin(async { Err(anyhow::anyhow!("api key missing")) })
    }

    fn catalogue() -> Vec<ModuleKind> {
        vec![
            ModuleKind {
                name: "fixed",
                help: "Always ok.",
                consumes: Consumes::up_to(0),
                core: true,
                defaults: fixed_defaults,
                build: build_fixed,
            },
            ModuleKind {
                name: "broken",
                help: "Never loads.",
                consumes: Consumes {
                    required: 1,
                    limit: Some(1),
                },
                core: false,
                defaults: Map::new,
                build: build_broken,
            },
            ModuleKind {
                name: "optional",
                help: "Only when asked.",
                consumes: Consumes::all(),
                core: false,
                defaults: fixed_defaults,
                build: build_fixed,
            },
        ]
    }

    #[test]
    fn test_config_merge_override_wins() {
        let mut overrides = Map::new();
        overrides.insert("loud".into(), json!(true));
        overrides.insert("typo_key".into(), json!(1));

        let config = ModuleConfig::merged("fixed", fixed_defaults(), Some(&overrides));
        let values: Map<String, Value> = config.parse().unwrap();
        assert_eq!(values["greeting"], json!("hi"));
        assert_eq!(values["loud"], json!(true));
        // unknown keys are retained
        assert_eq!(values["typo_key"], json!(1));
    }

    #[test]
    fn test_config_parse_into_typed_settings() {
        let config = ModuleConfig::merged("fixed", fixed_defaults(), None);
        let settings: FixedSettings = config.parse().unwrap();
        assert_eq!(settings.greeting, "hi");
        assert!(!settings.loud);
    }

    #[tokio::test]
    async fn test_load_for_channel() {
        let requested = vec!["Broken".to_string(), "ghost".to_string()];
        let registry =
            ModuleRegistry::load_for_channel(&catalogue(), &requested, &BTreeMap::new()).await;

        assert!(registry.lookup("fixed").is_ok());
        // not core and not requested
        assert_eq!(
            registry.lookup("optional").err(),
            Some(EngineError::ModuleNotFound("optional".into()))
        );
        assert!(matches!(
            registry.lookup("broken"),
            Err(EngineError::ModuleUnavailable { ref name, ref reason })
                if name == "broken" && reason.contains("api key missing")
        ));
        assert!(matches!(
            registry.lookup("ghost"),
            Err(EngineError::ModuleUnavailable { .. })
        ));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["broken", "fixed", "ghost"]);
    }

    #[tokio::test]
    async fn test_overrides_reach_loaded_module() {
        let mut overrides = BTreeMap::new();
        let mut fixed = Map::new();
        fixed.insert("greeting".into(), json!("yo"));
        overrides.insert("fixed".to_string(), fixed);

        let registry = ModuleRegistry::load_for_channel(&catalogue(), &[], &overrides).await;
        let module = registry.lookup("FIXED").unwrap();
        assert_eq!(module.consumes, Consumes::up_to(0));

        let author = Author::new("u1", "alice");
        let mut session = SessionState::new("chan", "r!", CommandRegistry::new());
        let mut ctx = InvocationContext {
            author: &author,
            session: &mut session,
            modules: &registry,
        };
        let reply = module.instance.lock().await.main(Vec::new(), &mut ctx).await;
        assert_eq!(reply, Ok(Reply::text("yo")));
    }
}
