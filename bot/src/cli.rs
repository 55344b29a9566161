//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::application::ports::{CapabilityProvider, LivenessProbe};
use crate::commands;
use crate::commands::fleet::FleetAction;
use crate::domain::BotConfig;
use crate::output::OutputContext;

/// Chat-driven controller for an on-demand game server
#[derive(Parser)]
#[command(
    name = "spotcraft",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the chat interaction webhook server
    Serve,

    /// Show the server's lifecycle state
    Status(commands::status::StatusArgs),

    /// Start the server instance in the existing fleet
    Start,

    /// Stop the server instance (fleet target capacity 0)
    Stop,

    /// Create a new fleet for the server
    StartFleet,

    /// Delete the fleet and terminate its instances
    StopFleet,

    /// Send a console command to the running server
    Exec(commands::exec::ExecArgs),
}

impl Cli {
    /// Execute the CLI command against AWS.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the command fails.
    #[cfg(feature = "aws")]
    pub async fn run(self) -> Result<()> {
        let config = crate::infra::config::load()?;
        let provider = crate::infra::aws::AwsProvider::from_config(&config).await;
        self.execute(config, provider, crate::infra::network::TcpLivenessProbe)
            .await
    }

    /// # Errors
    ///
    /// Always: no provider is compiled in.
    #[cfg(not(feature = "aws"))]
    pub async fn run(self) -> Result<()> {
        anyhow::bail!("spotcraft was built without the `aws` feature; no provider is available")
    }

    /// Execute the CLI command against the given capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn execute<P, L>(self, config: BotConfig, provider: P, probe: L) -> Result<()>
    where
        P: CapabilityProvider + Send + Sync + 'static,
        L: LivenessProbe + Send + Sync + 'static,
    {
        let Cli {
            quiet,
            no_color,
            command,
        } = self;
        let ctx = OutputContext::new(no_color, quiet);

        let action = match command {
            Command::Serve => return commands::serve::run(config, provider, probe).await,
            Command::Status(args) => {
                return commands::status::run(&ctx, &provider, &probe, &config, &args).await;
            }
            Command::Exec(args) => {
                return commands::exec::run(&ctx, &provider, &probe, &config, &args).await;
            }
            Command::Start => FleetAction::Start,
            Command::Stop => FleetAction::Stop,
            Command::StartFleet => FleetAction::Create,
            Command::StopFleet => FleetAction::Delete,
        };
        commands::fleet::run(&ctx, &provider, &config, action).await
    }
}
