//! Fleet lifecycle commands: `start`, `stop`, `start-fleet`, `stop-fleet`.

use anyhow::Result;

use crate::application::ports::CapabilityProvider;
use crate::application::services::commander;
use crate::domain::BotConfig;
use crate::output::OutputContext;

/// A fleet-mutating operation requested from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FleetAction {
    /// Target capacity 1.
    Start,
    /// Target capacity 0.
    Stop,
    Create,
    Delete,
}

/// Run `action` through the same commander the chat router uses.
///
/// # Errors
///
/// Returns the commander's rejection or provider failure.
pub async fn run(
    ctx: &OutputContext,
    provider: &impl CapabilityProvider,
    config: &BotConfig,
    action: FleetAction,
) -> Result<()> {
    let outcome = match action {
        FleetAction::Start => commander::start(provider, config).await?,
        FleetAction::Stop => commander::stop(provider, config).await?,
        FleetAction::Create => commander::create_fleet(provider, config).await?,
        FleetAction::Delete => commander::delete_fleet(provider, config).await?,
    };
    ctx.success(&outcome.to_string());
    Ok(())
}
