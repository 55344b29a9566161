//! Status command implementation.

use anyhow::Result;
use clap::Args;

use crate::application::ports::{CapabilityProvider, LivenessProbe};
use crate::application::services::resolver;
use crate::domain::BotConfig;
use crate::output::OutputContext;
use crate::output::human::HumanRenderer;
use crate::output::json;

/// Arguments for the status command.
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Resolve and print the server's lifecycle state.
///
/// # Errors
///
/// Returns an error when the status could not be determined.
pub async fn run(
    ctx: &OutputContext,
    provider: &impl CapabilityProvider,
    probe: &impl LivenessProbe,
    config: &BotConfig,
    args: &StatusArgs,
) -> Result<()> {
    let report = resolver::resolve(provider, probe, config).await;

    if args.json {
        println!("{}", json::format_report(&report)?);
    } else {
        HumanRenderer::new(ctx).render_status(&report);
    }

    match report.error {
        Some(error) => anyhow::bail!("status unavailable: {error}"),
        None => Ok(()),
    }
}
