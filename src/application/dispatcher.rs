//! # Dispatcher
//!
//! Drives one incoming chat line through the pipeline:
//! prefix match, command lookup, permission gate, cooldown, template resolution.
//! Every early exit is silent; only resolved text and a few error replies reach chat.
//! Admin commands (`cmdadd`, `cmddel`, `prefix`) take the same path as any other.

use std::collections::VecDeque;
use std::time::Duration;

use crate::application::cooldown::CooldownStatus;
use crate::application::modules::ModuleRegistry;
use crate::application::session::ChannelSession;
use crate::application::template::{Rendered, TemplateResolver};
use crate::domain::errors::EngineError;
use crate::domain::types::Author;
use crate::strings::messages;

/// Why a line produced no output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ignored {
    NotPrefixed,
    UnknownCommand(String),
    /// Mod-only command, caller is not a moderator.
    Denied(String),
    OnCooldown { command: String, remaining: Duration },
    EmptyResponse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ignored(Ignored),
    Sent(String),
    Suppressed,
    Errored {
        error: EngineError,
        reply: Option<String>,
    },
}

impl Outcome {
    /// Text to deliver to the channel, if any.
    pub fn reply(&self) -> Option<&str> {
        match self {
            Self::Sent(text) => Some(text.as_str()),
            Self::Errored { reply, .. } => reply.as_deref(),
            Self::Ignored(_) | Self::Suppressed => None,
        }
    }
}

pub struct Dispatcher {
    resolver: TemplateResolver,
}

impl Dispatcher {
    pub fn new(module_timeout: Duration) -> Self {
        Self {
            resolver: TemplateResolver::new(module_timeout),
        }
    }

    pub async fn dispatch(&self, session: &mut ChannelSession, author: &Author, line: &str) -> Outcome {
        let outcome = self.run(session, author, line).await;
        match &outcome {
            Outcome::Errored { error, .. } => tracing::warn!(
                channel = %session.state.channel,
                author = %author.id,
                code = error.code(),
                "command failed: {}",
                error
            ),
            Outcome::Ignored(Ignored::NotPrefixed) => {}
            other => tracing::debug!(channel = %session.state.channel, author = %author.id, outcome = ?other, "line handled"),
        }
        outcome
    }

    async fn run(&self, session: &mut ChannelSession, author: &Author, line: &str) -> Outcome {
        let Some(rest) = line.trim_start().strip_prefix(session.state.prefix.as_str()) else {
            return Outcome::Ignored(Ignored::NotPrefixed);
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default().to_lowercase();
        let Some(command) = session.state.commands.lookup(&name).cloned() else {
            return Outcome::Ignored(Ignored::UnknownCommand(name));
        };

        if command.requires_mod && !author.is_moderator {
            return Outcome::Ignored(Ignored::Denied(command.name));
        }

        // charged on admission, so a suppressed or failed response still counts
        if let CooldownStatus::OnCooldown { remaining } = session
            .state
            .cooldowns
            .check_and_consume(&command.name, command.cooldown_seconds)
        {
            return Outcome::Ignored(Ignored::OnCooldown {
                command: command.name,
                remaining,
            });
        }

        let mut args: VecDeque<String> = parts.map(str::to_string).collect();
        tracing::info!(
            channel = %session.state.channel,
            author = %author.name,
            command = %command.name,
            args = ?args,
            "dispatching"
        );

        let resolution = self
            .resolver
            .resolve(
                &command.response,
                &mut args,
                author,
                &mut session.state,
                &session.modules,
            )
            .await;

        match resolution {
            Ok(resolution) => {
                for unresolved in &resolution.unresolved {
                    tracing::warn!(channel = %session.state.channel, command = %command.name, "{}", unresolved);
                }
                match resolution.rendered {
                    Rendered::Text(text) if text.trim().is_empty() => {
                        Outcome::Ignored(Ignored::EmptyResponse)
                    }
                    Rendered::Text(text) => Outcome::Sent(text),
                    Rendered::Suppressed => Outcome::Suppressed,
                }
            }
            Err(error) => {
                let reply = error_reply(&error, &session.modules);
                Outcome::Errored { error, reply }
            }
        }
    }
}

fn error_reply(error: &EngineError, modules: &ModuleRegistry) -> Option<String> {
    match error {
        EngineError::InsufficientArguments { module, .. } => Some(
            modules
                .lookup(module)
                .map(|m| messages::usage(&m.help))
                .unwrap_or_else(|_| messages::MISSING_ARGUMENTS.to_string()),
        ),
        EngineError::ModuleUnavailable { .. } | EngineError::ModuleNotFound(_) => {
            Some(messages::MODULE_UNAVAILABLE.to_string())
        }
        EngineError::Module(_) => Some(messages::MODULE_FAILED.to_string()),
        _ => None,
    }
}
