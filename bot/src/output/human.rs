//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;

use crate::domain::status::NOT_AVAILABLE;
use crate::domain::{CommandOutput, StatusReport};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render a status report as aligned key/value rows plus advice.
    pub fn render_status(&self, report: &StatusReport) {
        if self.ctx.quiet {
            return;
        }
        let state = report.state.to_string();
        println!(
            "  {}  {}",
            "State:".style(self.ctx.styles.dim),
            state.style(self.ctx.styles.for_state(report.state))
        );

        let instance = report.instance.as_ref();
        let or_na = |v: Option<String>| v.unwrap_or_else(|| NOT_AVAILABLE.to_string());
        self.ctx.kv("Fleet:", &or_na(report.fleet_id.clone()));
        self.ctx.kv(
            "Fleet state:",
            &or_na(report.fleet_state.as_ref().map(ToString::to_string)),
        );
        self.ctx.kv(
            "Capacity:",
            &or_na(report.target_capacity.map(|c| c.to_string())),
        );
        self.ctx
            .kv("Instance:", &or_na(instance.map(|i| i.instance_id.clone())));
        self.ctx.kv(
            "Instance state:",
            &or_na(instance.and_then(|i| i.state.as_ref()).map(ToString::to_string)),
        );
        self.ctx
            .kv("Liveness:", &or_na(report.liveness.map(|l| l.to_string())));
        self.ctx
            .kv("Address:", &or_na(report.connect_address().map(str::to_string)));

        if let Some(error) = &report.error {
            self.ctx.error(error);
        } else {
            println!();
            println!("  {}", report.advice());
        }
    }

    /// Render console command output verbatim.
    pub fn render_command_output(&self, output: &CommandOutput) {
        if output.succeeded() {
            self.ctx
                .success(&format!("`{}` finished ({})", output.command, output.job_id));
        } else {
            self.ctx.warn(&format!(
                "`{}` ended with status {} ({})",
                output.command, output.status, output.job_id
            ));
        }
        if !self.ctx.quiet && !output.output.is_empty() {
            println!("{}", output.output);
        }
    }
}
