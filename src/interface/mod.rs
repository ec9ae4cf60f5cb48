//! # Interface Layer
//!
//! The user-facing surface of the bot: the chat modules that commands call into.

pub mod modules;
