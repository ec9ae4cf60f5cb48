//! # prefix Module
//!
//! `prefix` shows the channel's command prefix, `prefix <new>` replaces it.

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
        name: "prefix",
        help: help::PREFIX,
        consumes: Consumes::up_to(1),
        core: true,
        defaults: Map::new,
        build,
    }
}

fn build(_config: ModuleConfig) -> BoxFuture<'static, Result<Box<dyn Module>>> {
    async { Ok(Box::new(Prefix) as Box<dyn Module>) }.boxed()
}

pub struct Prefix;

#[async_trait]
impl Module for Prefix {
    async fn main(
        &mut self,
        args: Vec<String>,
        ctx: &mut InvocationContext<'_>,
    ) -> Result<Reply, EngineError> {
        match args.into_iter().next() {
            None => Ok(Reply::Text(messages::current_prefix(&ctx.session.prefix))),
            Some(prefix) => {
                tracing::info!(channel = %ctx.session.channel, from = %ctx.session.prefix, to = %prefix, "prefix changed");
                ctx.session.prefix = prefix;
                ctx.session.mark_dirty();
                Ok(Reply::Text(messages::prefix_changed(&ctx.session.prefix)))
            }
        }
    }
}
