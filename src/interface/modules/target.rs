//! # target Module
//!
//! Returns a mentioned user without the leading `@`, or the caller's name.

use anyhow::Result;
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Map;

use crate::application::modules::{
    Consumes, InvocationContext, Module, ModuleConfig, ModuleKind, Reply,
};
use crate::domain::errors::EngineError;
use crate::strings::help;

pub fn kind() -> ModuleKind {
    ModuleKind {
        name: "target",
        help: help::TARGET,
        consumes: Consumes::up_to(1),
        core: true,
        defaults: Map::new,
        build,
    }
}

fn build(_config: ModuleConfig) -> BoxFuture<'static, Result<Box<dyn Module>>> {
    async { Ok(Box::new(Target) as Box<dyn Module>) }.boxed()
}

pub struct Target;

#[async_trait]
impl Module for Target {
    async fn main(
        &mut self,
        args: Vec<String>,
        ctx: &mut InvocationContext<'_>,
    ) -> Result<Reply, EngineError> {
        match args.first() {
            Some(user) => Ok(Reply::text(user.strip_prefix('@').unwrap_or(user))),
            None => Ok(Reply::Text(ctx.author.name.clone())),
        }
    }
}
