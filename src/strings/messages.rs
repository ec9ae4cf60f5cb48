//! # Messages
//!
//! Contains constant strings and format functions for user-facing replies.

use crate::application::commands::VALID_COMMAND_PATTERN;

// Dispatcher fallbacks
pub const MODULE_UNAVAILABLE: &str = "That feature is currently unavailable.";
pub const MODULE_FAILED: &str = "Something went wrong, try again later.";
pub const MISSING_ARGUMENTS: &str = "Not enough arguments.";

pub fn usage(help: &str) -> String {
    format!("{MISSING_ARGUMENTS} {help}")
}

// cmdadd / cmddel
pub const NO_COMMAND_INFO: &str = "No command information given.";
pub const COMMAND_INCOMPLETE: &str = "Command is missing required information.";
pub const NEGATIVE_COOLDOWN: &str = "Command must have a non-negative cooldown.";

pub fn command_added(name: &str) -> String {
    format!("Command {name} added successfully.")
}

pub fn invalid_command_name() -> String {
    format!("Command name must fit the regular expression {VALID_COMMAND_PATTERN}.")
}

pub fn command_removed(name: &str) -> String {
    format!("Command {name} removed successfully.")
}

pub fn command_missing(name: &str) -> String {
    format!("Command {name} does not exist.")
}

pub const CMDDEL_USAGE: &str = "Provide the name of the command to remove.";

// prefix
pub fn current_prefix(prefix: &str) -> String {
    format!("The current prefix is {prefix}")
}

pub fn prefix_changed(prefix: &str) -> String {
    format!("Prefix changed to {prefix}")
}

// help
pub fn available_commands(user: &[String], moderator: &[String]) -> String {
    format!(
        "Available commands are: {} (mod-only: {})",
        user.join(", "),
        moderator.join(", ")
    )
}

pub fn command_uses_modules(name: &str, modules: &[String]) -> String {
    format!(
        "Module '{name}' not found, but the matching command uses module(s): {}",
        modules.join(", ")
    )
}

pub fn command_without_modules(name: &str) -> String {
    format!("Command {name} does not mention any modules.")
}

pub fn module_unavailable(name: &str) -> String {
    format!("Module {name} is currently unavailable.")
}

pub const NO_MATCH: &str = "No matching command or module.";

// request
pub const REQUEST_NO_MAP: &str = "Provide a map to request.";
pub const REQUEST_BAD_LINK: &str = "Could not resolve beatmap link format.";
pub const REQUEST_NO_INFO: &str = "Could not retrieve beatmap information.";
pub const REQUEST_SENT: &str = "Request sent!";
pub const SUBMODE_ENABLED: &str = "Submode enabled";
pub const SUBMODE_DISABLED: &str = "Submode disabled";
