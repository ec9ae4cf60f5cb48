//! # Help Module
//!
//! `&help&` lists the channel's visible commands; `help <name>` describes a
//! module, or names the modules a command uses.

use anyhow::Result;
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Map;

use crate::application::modules::{
    Consumes, InvocationContext, Module, ModuleConfig, ModuleKind, Reply,
};
use crate::application::template;
use crate::domain::errors::EngineError;
use crate::strings::{help, messages};

pub fn kind() -> ModuleKind {
    ModuleKind {
        name: "help",
        help: help::HELP,
        consumes: Consumes::up_to(1),
        core: true,
        defaults: Map::new,
        build,
    }
}

fn build(_config: ModuleConfig) -> BoxFuture<'static, Result<Box<dyn Module>>> {
    async { Ok(Box::new(Help) as Box<dyn Module>) }.boxed()
}

pub struct Help;

#[async_trait]
impl Module for Help {
    async fn main(
        &mut self,
        args: Vec<String>,
        ctx: &mut InvocationContext<'_>,
    ) -> Result<Reply, EngineError> {
        let Some(name) = args.first().map(|a| a.to_lowercase()) else {
            let listing = ctx.session.commands.listed();
            return Ok(Reply::Text(messages::available_commands(
                &listing.user,
                &listing.moderator,
            )));
        };

        match ctx.modules.lookup(&name) {
            Ok(module) => return Ok(Reply::Text(module.help.clone())),
            Err(EngineError::ModuleUnavailable { .. }) => {
                return Ok(Reply::Text(messages::module_unavailable(&name)));
            }
            Err(_) => {}
        }

        let Some(command) = ctx.session.commands.lookup(&name) else {
            return Ok(Reply::text(messages::NO_MATCH));
        };

        let mut used: Vec<String> = Vec::new();
        for token in template::tokens(&command.response) {
            if ctx.modules.contains(&token.name) && !used.contains(&token.name) {
                used.push(token.name);
            }
        }

        if used.is_empty() {
            Ok(Reply::Text(messages::command_without_modules(&name)))
        } else {
            Ok(Reply::Text(messages::command_uses_modules(&name, &used)))
        }
    }
}
