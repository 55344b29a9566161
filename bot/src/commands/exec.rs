//! Exec command implementation.

use anyhow::Result;
use clap::Args;

use crate::application::ports::{CapabilityProvider, LivenessProbe};
use crate::application::services::executor;
use crate::domain::BotConfig;
use crate::output::OutputContext;
use crate::output::human::HumanRenderer;

/// Arguments for the exec command.
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Console command to send, e.g. `say hello`
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl ExecArgs {
    /// The console command as one line.
    #[must_use]
    pub fn line(&self) -> String {
        self.command.join(" ")
    }
}

/// Send one console command to the running server and print its output.
///
/// # Errors
///
/// Returns an error when the command could not be run or did not succeed.
pub async fn run(
    ctx: &OutputContext,
    provider: &impl CapabilityProvider,
    probe: &impl LivenessProbe,
    config: &BotConfig,
    args: &ExecArgs,
) -> Result<()> {
    let line = args.line();
    let output = executor::run_command(provider, probe, config, &line).await?;
    HumanRenderer::new(ctx).render_command_output(&output);

    if !output.succeeded() {
        anyhow::bail!("`{line}` ended with status {}", output.status);
    }
    Ok(())
}
