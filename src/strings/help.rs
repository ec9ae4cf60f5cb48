//! # Help Text
//!
//! Help messages for the built-in modules, shown by `help <module>` and in usage hints.

pub const HELP: &str =
    "Prints all available commands, or, if provided a name, prints the help message for it. Usage: help <name?>";

pub const CMDADD: &str = "Adds a new command, or modifies an existing one. \
    Usage: cmdadd <name> <cooldown?> <-modonly?> <-hidden?> <response>.";

pub const CMDDEL: &str = "Removes a command. Usage: cmddel <name>";

pub const PREFIX: &str = "Shows the command prefix, or changes it. Usage: prefix <new prefix?>";

pub const TARGET: &str =
    "Returns a mentioned user. If no user is mentioned, returns the caller. Usage: target <@user?>";

pub const REQUEST: &str = "Request an osu! beatmap to be played. \
    Usage: request <beatmap link> <+mods?> (mods: \"request submode\" to toggle submode)";
