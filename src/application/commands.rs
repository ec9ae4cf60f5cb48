//! # Command Registry
//!
//! Owns the channel's command definitions, keyed by lowercase name.
//! Mutation goes through `add_or_modify` / `remove`, which validate their input;
//! writing the result back to storage is the caller's job.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::domain::config::CommandEntry;
use crate::domain::errors::EngineError;
use crate::domain::types::Command;

pub const VALID_COMMAND_PATTERN: &str = r"^[A-Za-z0-9_]+$";

static VALID_COMMAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(VALID_COMMAND_PATTERN).expect("command name pattern compiles"));

pub fn is_valid_name(name: &str) -> bool {
    VALID_COMMAND_RE.is_match(name)
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Command>,
}

/// Non-hidden command names, as shown by `help`.
#[derive(Debug, Default, PartialEq)]
pub struct Listing {
    pub user: Vec<String>,
    pub moderator: Vec<String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry from stored entries, rejecting the first invalid one.
    /// Two keys that differ only by case are a duplicate.
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = (&'a String, &'a CommandEntry)>,
    ) -> Result<Self, EngineError> {
        let mut registry = Self::new();
        for (name, entry) in entries {
            if registry.lookup(name).is_some() {
                return Err(EngineError::DuplicateCommand(name.to_lowercase()));
            }
            registry.add_or_modify(
                name,
                entry.cooldown,
                &entry.response,
                entry.requires_mod,
                entry.hidden,
            )?;
        }
        Ok(registry)
    }

    /// Inverse of `from_entries`.
    pub fn to_entries(&self) -> BTreeMap<String, CommandEntry> {
        self.commands
            .values()
            .map(|c| {
                (
                    c.name.clone(),
                    CommandEntry {
                        // u64 seconds beyond i64::MAX are not representable on input either
                        cooldown: i64::try_from(c.cooldown_seconds).unwrap_or(i64::MAX),
                        requires_mod: c.requires_mod,
                        hidden: c.hidden,
                        response: c.response.clone(),
                    },
                )
            })
            .collect()
    }

    /// Inserts or replaces a command. Names are stored lowercase.
    pub fn add_or_modify(
        &mut self,
        name: &str,
        cooldown: i64,
        response: &str,
        requires_mod: bool,
        hidden: bool,
    ) -> Result<&Command, EngineError> {
        if !is_valid_name(name) {
            return Err(EngineError::InvalidCommandName(name.to_string()));
        }
        let cooldown_seconds =
            u64::try_from(cooldown).map_err(|_| EngineError::InvalidCooldown(cooldown))?;

        let name = name.to_lowercase();
        let command = Command {
            name: name.clone(),
            cooldown_seconds,
            requires_mod,
            hidden,
            response: response.to_string(),
        };

        tracing::debug!(command = %name, cooldown_seconds, requires_mod, hidden, "command stored");
        self.commands.insert(name.clone(), command);
        Ok(&self.commands[&name])
    }

    pub fn remove(&mut self, name: &str) -> Result<Command, EngineError> {
        self.commands
            .remove(&name.to_lowercase())
            .ok_or_else(|| EngineError::CommandNotFound(name.to_string()))
    }

    pub fn lookup(&self, name: &str) -> Option<&Command> {
        self.commands.get(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn listed(&self) -> Listing {
        let mut listing = Listing::default();
        for command in self.commands.values().filter(|c| !c.hidden) {
            if command.requires_mod {
                listing.moderator.push(command.name.clone());
            } else {
                listing.user.push(command.name.clone());
            }
        }
        listing
    }
}
