//! Application service — chat command routing.
//!
//! Maps a verified, parsed command to its use-case, enforcing the access
//! policy first. Every outcome, success or failure, becomes reply text.

use std::fmt::Write as _;

use spotcraft_common::BotCommand;
use tracing::{info, warn};

use crate::application::ports::{CapabilityProvider, LivenessProbe};
use crate::application::services::{commander, executor, resolver};
use crate::domain::{AccessPolicy, BotConfig, CommandOutcome, LifecycleError};

pub const UNKNOWN_COMMAND_REPLY: &str =
    "Unknown command. Use `/help` for list of available commands.";
pub const UNAUTHORIZED_REPLY: &str = "You are not authorized to run this command.";
pub const COMMAND_USAGE_REPLY: &str =
    "Missing server command! Usage: `/command [server_command]`";

/// A command after transport verification and parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub command: BotCommand,
    /// `None` when the transport carried no user (never authorised).
    pub user_id: Option<String>,
    /// Value of the first option, used by `command`.
    pub argument: Option<String>,
}

impl CommandRequest {
    #[must_use]
    pub fn new(command: BotCommand) -> Self {
        Self {
            command,
            user_id: None,
            argument: None,
        }
    }

    #[must_use]
    pub fn from_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    #[must_use]
    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.argument = Some(argument.into());
        self
    }
}

/// Whether `user_id` may run `command`.
#[must_use]
pub fn is_authorized(policy: &AccessPolicy, command: BotCommand, user_id: Option<&str>) -> bool {
    !command.is_restricted() || user_id.is_some_and(|id| policy.is_allowed(id))
}

/// The `help` reply.
#[must_use]
pub fn help_text() -> String {
    let mut out = String::from("**Server Bot Commands**\n");
    for cmd in BotCommand::ALL {
        let _ = write!(out, "\n**`/{}`**: {}", cmd.name(), cmd.description());
    }
    out
}

/// Run `request` and return the reply text.
pub async fn dispatch(
    provider: &impl CapabilityProvider,
    probe: &impl LivenessProbe,
    config: &BotConfig,
    request: &CommandRequest,
) -> String {
    let user = request.user_id.as_deref();
    if !is_authorized(&config.access, request.command, user) {
        warn!(command = %request.command, user = user.unwrap_or("-"), "unauthorized command");
        return UNAUTHORIZED_REPLY.to_string();
    }
    info!(command = %request.command, user = user.unwrap_or("-"), "dispatching command");

    match request.command {
        BotCommand::Start => {
            render_lifecycle(request.command, commander::start(provider, config).await)
        }
        BotCommand::StartFleet => {
            render_lifecycle(request.command, commander::create_fleet(provider, config).await)
        }
        BotCommand::StopFleet => {
            render_lifecycle(request.command, commander::delete_fleet(provider, config).await)
        }
        BotCommand::Status => resolver::resolve(provider, probe, config)
            .await
            .explanation(),
        BotCommand::Command => match request.argument.as_deref().map(str::trim) {
            Some(command) if !command.is_empty() => {
                render(executor::run_command(provider, probe, config, command).await)
            }
            _ => COMMAND_USAGE_REPLY.to_string(),
        },
        BotCommand::Help => help_text(),
    }
}

fn render_lifecycle(
    command: BotCommand,
    result: Result<CommandOutcome, LifecycleError>,
) -> String {
    if let Err(e) = &result {
        if e.is_precondition() {
            info!(command = %command, reason = %e, "command rejected");
        } else {
            warn!(command = %command, error = %e, "command failed");
        }
    }
    render(result)
}

fn render<T: std::fmt::Display, E: std::fmt::Display>(result: Result<T, E>) -> String {
    match result {
        Ok(value) => value.to_string(),
        Err(e) => e.to_string(),
    }
}
