//! # Application Layer
//!
//! Contains the core logic of the bot.
//! This includes the command and module registries, cooldowns, template resolution,
//! the dispatcher and the per-channel workers.

pub mod commands;
pub mod cooldown;
pub mod dispatcher;
pub mod logging;
pub mod modules;
pub mod session;
pub mod template;
pub mod worker;
