//! Command types and the command registry.

use std::fmt;

/// Prefix every admin command starts with.
pub const COMMAND_PREFIX: &str = "!";

/// Administrative commands understood by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    /// List every registered command.
    Help,

    /// List the rooms the bot is in.
    Rooms,

    /// Stop accepting invites.
    Stop,

    /// Start accepting invites.
    Start,
}

impl AdminCommand {
    /// Returns the command name as typed after the prefix.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Rooms => "rooms",
            Self::Stop => "stop",
            Self::Start => "start",
        }
    }

    /// Returns the command description for help.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Help => "print this help message",
            Self::Rooms => "print a list of all rooms this bot is in.",
            Self::Stop => "stop accepting invites",
            Self::Start => "start accepting invites",
        }
    }
}

impl fmt::Display for AdminCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{COMMAND_PREFIX}{}", self.name())
    }
}

/// One registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub command: AdminCommand,
    pub name: &'static str,
    pub description: &'static str,
    /// Prefix-qualified trigger, e.g. `!help`.
    trigger: String,
}

impl CommandSpec {
    #[must_use]
    pub fn new(command: AdminCommand) -> Self {
        Self {
            command,
            name: command.name(),
            description: command.description(),
            trigger: command.to_string(),
        }
    }

    #[must_use]
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// True if `body` starts with this command's trigger.
    #[must_use]
    pub fn matches(&self, body: &str) -> bool {
        body.starts_with(&self.trigger)
    }
}

/// Static table of commands, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRegistry {
    entries: Vec<CommandSpec>,
}

impl CommandRegistry {
    /// Builds a registry from commands in the given order.
    #[must_use]
    pub fn new(commands: &[AdminCommand]) -> Self {
        Self {
            entries: commands.iter().copied().map(CommandSpec::new).collect(),
        }
    }

    /// The bot's command set: help, rooms, stop, start.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(&[
            AdminCommand::Help,
            AdminCommand::Rooms,
            AdminCommand::Stop,
            AdminCommand::Start,
        ])
    }

    /// Finds the first command, in registration order, whose trigger
    /// prefixes the message body.
    ///
    /// Matching is case-sensitive and the body is not trimmed.
    #[must_use]
    pub fn match_command(&self, body: &str) -> Option<&CommandSpec> {
        self.entries.iter().find(|spec| spec.matches(body))
    }

    /// Renders the `!help` reply.
    #[must_use]
    pub fn help_text(&self) -> String {
        let commands = self
            .entries
            .iter()
            .map(|spec| format!("{} - {}", spec.trigger, spec.description))
            .collect::<Vec<_>>()
            .join("\n");

        format!("This bot understands the following commands:\n\n{commands}\n")
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandSpec> {
        self.entries.iter()
    }
}

/// Result of command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Whether the command did what it was asked.
    pub success: bool,

    /// Response message to post in the room.
    pub message: String,
}

impl CommandResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Creates a result for a command that has no behavior yet.
    #[must_use]
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
