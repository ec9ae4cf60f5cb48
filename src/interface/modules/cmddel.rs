//! # cmddel Module
//!
//! `cmddel <name>` removes a command.

use anyhow::Result;
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Map;

use crate::application::modules::{
    Consumes, InvocationContext, Module, ModuleConfig, ModuleKind, Reply,
};
use crate::domain::errors::EngineError;
use crate::strings::{help, messages};

pub fn kind() -> ModuleKind {
    ModuleKind {
        name: "cmddel",
        help: help::CMDDEL,
        consumes: Consumes::up_to(1),
        core: true,
        defaults: Map::new,
        build,
    }
}

fn build(_config: ModuleConfig) -> BoxFuture<'static, Result<Box<dyn Module>>> {
    async { Ok(Box::new(CmdDel) as Box<dyn Module>) }.boxed()
}

pub struct CmdDel;

#[async_trait]
impl Module for CmdDel {
    async fn main(
        &mut self,
        args: Vec<String>,
        ctx: &mut InvocationContext<'_>,
    ) -> Result<Reply, EngineError> {
        let Some(name) = args.first() else {
            return Ok(Reply::text(messages::CMDDEL_USAGE));
        };

        match ctx.session.commands.remove(name) {
            Ok(removed) => {
                ctx.session.cooldowns.forget(&removed.name);
                ctx.session.mark_dirty();
                tracing::info!(channel = %ctx.session.channel, by = %ctx.author.id, command = %removed.name, "command removed");
                Ok(Reply::Text(messages::command_removed(&removed.name)))
            }
            Err(EngineError::CommandNotFound(name)) => {
                Ok(Reply::Text(messages::command_missing(&name)))
            }
            Err(e) => Err(e),
        }
    }
}
