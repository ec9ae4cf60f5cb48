//! # cmdadd Module
//!
//! `cmdadd <name> <cooldown?> <-modonly?> <-hidden?> <response>`
//! Adds or replaces a command and flags the channel config for write-back.
//! Validation errors become short replies.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::collections::VecDeque;

use crate::application::modules::{
    Consumes, InvocationContext, Module, ModuleConfig, ModuleKind, Reply,
};
use crate::domain::errors::EngineError;
use crate::strings::{help, messages};

pub fn kind() -> ModuleKind {
    ModuleKind {
        name: "cmdadd",
        help: help::CMDADD,
        consumes: Consumes::all(),
        core: true,
        defaults,
        build,
    }
}

fn defaults() -> Map<String, Value> {
    let mut map = Map::new();
    // flags given after the cooldown, before the response
    map.insert("modonly_arg".into(), json!("-modonly"));
    map.insert("hidden_arg".into(), json!("-hidden"));
    // used when no cooldown is given
    map.insert("default_cooldown".into(), json!(5));
    map
}

#[derive(Debug, Deserialize)]
struct Settings {
    modonly_arg: String,
    hidden_arg: String,
    default_cooldown: i64,
}

fn build(config: ModuleConfig) -> BoxFuture<'static, Result<Box<dyn Module>>> {
    async move {
        let settings: Settings = config.parse().context("invalid cmdadd config")?;
        Ok(Box::new(CmdAdd { settings }) as Box<dyn Module>)
    }
    .boxed()
}

pub struct CmdAdd {
    settings: Settings,
}

#[async_trait]
impl Module for CmdAdd {
    async fn main(
        &mut self,
        args: Vec<String>,
        ctx: &mut InvocationContext<'_>,
    ) -> Result<Reply, EngineError> {
        let mut args = VecDeque::from(args);
        let Some(name) = args.pop_front() else {
            return Ok(Reply::text(messages::NO_COMMAND_INFO));
        };
        let name = name.to_lowercase();

        let cooldown = match args.front().and_then(|a| a.parse::<i64>().ok()) {
            Some(cooldown) => {
                args.pop_front();
                cooldown
            }
            None => self.settings.default_cooldown,
        };

        let (mut requires_mod, mut hidden) = (false, false);
        while let Some(flag) = args.front() {
            if flag.to_lowercase() == self.settings.modonly_arg.to_lowercase() {
                requires_mod = true;
            } else if flag.to_lowercase() == self.settings.hidden_arg.to_lowercase() {
                hidden = true;
            } else {
                break;
            }
            args.pop_front();
        }

        if args.is_empty() {
            return Ok(Reply::text(messages::COMMAND_INCOMPLETE));
        }
        let response = Vec::from(args).join(" ");

        match ctx
            .session
            .commands
            .add_or_modify(&name, cooldown, &response, requires_mod, hidden)
        {
            Ok(_) => {
                ctx.session.mark_dirty();
                tracing::info!(channel = %ctx.session.channel, by = %ctx.author.id, command = %name, "command added");
                Ok(Reply::Text(messages::command_added(&name)))
            }
            Err(EngineError::InvalidCooldown(_)) => Ok(Reply::text(messages::NEGATIVE_COOLDOWN)),
            Err(EngineError::InvalidCommandName(_)) => {
                Ok(Reply::Text(messages::invalid_command_name()))
            }
            Err(e) => Err(e),
        }
    }
}
