use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed catalog of chat commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotCommand {
    /// Raise the fleet's target capacity to one instance.
    Start,
    /// Create a new fleet and persist its id.
    StartFleet,
    /// Delete the fleet and terminate its instances.
    StopFleet,
    /// Report the composite lifecycle state.
    Status,
    /// Send one console command to the running server.
    Command,
    /// List the available commands.
    Help,
}

/// Returned when a command name is not part of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown command: {0}")]
pub struct UnknownCommand(pub String);

impl BotCommand {
    /// Every command, in help order.
    pub const ALL: [BotCommand; 6] = [
        Self::Start,
        Self::StartFleet,
        Self::StopFleet,
        Self::Status,
        Self::Command,
        Self::Help,
    ];

    /// Name as registered with the chat platform.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::StartFleet => "start_fleet",
            Self::StopFleet => "stop_fleet",
            Self::Status => "status",
            Self::Command => "command",
            Self::Help => "help",
        }
    }

    /// One-line description used by `help`.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Start => "Starts the server instance in the existing fleet.",
            Self::StartFleet => "Creates a new fleet for the server.",
            Self::StopFleet => "Stops and deletes the entire fleet.",
            Self::Status => "Shows the current status of the fleet and server.",
            Self::Command => "Runs a server console command (e.g. `say Hello World!`).",
            Self::Help => "Shows this help message.",
        }
    }

    /// Commands that mutate the fleet or reach the server console.
    #[must_use]
    pub fn is_restricted(self) -> bool {
        matches!(self, Self::StartFleet | Self::StopFleet | Self::Command)
    }
}

impl FromStr for BotCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.name() == s)
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}

impl fmt::Display for BotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
