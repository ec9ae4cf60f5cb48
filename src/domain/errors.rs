//! # Engine Errors
//!
//! Error taxonomy for command mutation and template resolution.
//! Startup and transport failures use `anyhow` instead; these are the
//! recoverable, per-line errors a caller can turn into a chat reply.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid command name: {0:?}")]
    InvalidCommandName(String),

    #[error("invalid cooldown: {0} (must not be negative)")]
    InvalidCooldown(i64),

    #[error("duplicate command name: {0} (names are case-insensitive)")]
    DuplicateCommand(String),

    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("module not found: {0}")]
    ModuleNotFound(String),

    #[error("module unavailable: {name} ({reason})")]
    ModuleUnavailable { name: String, reason: String },

    #[error("module {module} needs {required} argument(s), got {available}")]
    InsufficientArguments {
        module: String,
        required: usize,
        available: usize,
    },

    #[error("unknown placeholder: &{0}&")]
    UnknownPlaceholder(String),

    #[error("module error: {0}")]
    Module(String),
}

impl EngineError {
    /// Static code for log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCommandName(_) => "invalid_command_name",
            Self::InvalidCooldown(_) => "invalid_cooldown",
            Self::DuplicateCommand(_) => "duplicate_command",
            Self::CommandNotFound(_) => "command_not_found",
            Self::ModuleNotFound(_) => "module_not_found",
            Self::ModuleUnavailable { .. } => "module_unavailable",
            Self::InsufficientArguments { .. } => "insufficient_arguments",
            Self::UnknownPlaceholder(_) => "unknown_placeholder",
            Self::Module(_) => "module_error",
        }
    }
}
