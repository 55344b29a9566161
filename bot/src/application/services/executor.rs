//! Application service — remote console command execution.
//!
//! Preconditions are checked in order and each fails fast, so no job is
//! submitted unless the game service is reachable.

use secrecy::SecretString;
use spotcraft_common::{JobStatus, Liveness};
use tracing::{debug, info, warn};

use crate::application::ports::{CapabilityProvider, LivenessProbe, RemoteJobs};
use crate::application::services::resolver::{persisted_fleet_id, single_instance};
use crate::domain::{
    BotConfig, CommandOutput, ConsoleInvocation, ExecError, JobReport, PollPolicy,
    strip_control_sequences,
};

/// Run one console command on the fleet's instance and return its output.
///
/// # Errors
///
/// One `ExecError` variant per unmet precondition, `Timeout` when the job
/// outlives the poll budget, `Provider` for any provider failure.
pub async fn run_command(
    provider: &impl CapabilityProvider,
    probe: &impl LivenessProbe,
    config: &BotConfig,
    command: &str,
) -> Result<CommandOutput, ExecError> {
    let fleet_id = persisted_fleet_id(provider, config)
        .await?
        .ok_or(ExecError::NoFleet)?;

    let instance_ids = match provider.fleet_instance_ids(&fleet_id).await {
        Ok(ids) => ids,
        Err(e) if e.is_not_found() => Vec::new(),
        Err(e) => return Err(e.into()),
    };
    let instance_id = single_instance(&instance_ids).ok_or(ExecError::NoInstance)?;
    let instance = provider
        .describe_instance(instance_id)
        .await?
        .ok_or(ExecError::NoInstance)?;

    let address = instance
        .public_ip
        .as_deref()
        .ok_or(ExecError::NoPublicAddress)?;
    if !instance.is_running() {
        return Err(ExecError::NotRunning(instance.state.clone()));
    }

    let liveness = probe
        .probe(address, config.game_port, config.probe_timeout)
        .await;
    debug!(instance_id, %liveness, "game port checked");
    if liveness != Liveness::Online {
        return Err(ExecError::ServiceUnavailable(liveness));
    }

    let password = provider
        .get_parameter(&config.console_secret_param(), true)
        .await?
        .map(SecretString::from)
        .ok_or(ExecError::MissingSecret)?;

    let invocation = ConsoleInvocation {
        binary: config.console.binary.clone(),
        host: config.console.host.clone(),
        password,
        argument: command.to_string(),
    };

    info!(instance_id, command, "submitting console command");
    let job_id = provider.submit(instance_id, &invocation).await?;
    drop(invocation);

    let report = await_job(provider, &job_id, instance_id, &config.poll).await?;
    Ok(CommandOutput {
        command: command.to_string(),
        job_id,
        status: report.status,
        output: strip_control_sequences(&report.stdout),
    })
}

/// Poll a submitted job until it reaches a terminal status.
///
/// Sleeps `initial_delay`, then polls at most `max_attempts` times with
/// `interval` between attempts. A terminal failure status is returned as
/// `Ok`; only an exhausted budget is an error.
///
/// # Errors
///
/// `ExecError::Timeout` when the budget runs out, `ExecError::Provider` when
/// a poll fails.
pub async fn await_job(
    jobs: &impl RemoteJobs,
    job_id: &str,
    instance_id: &str,
    policy: &PollPolicy,
) -> Result<JobReport, ExecError> {
    tokio::time::sleep(policy.initial_delay).await;

    let mut last = JobStatus::Pending;
    for attempt in 1..=policy.max_attempts {
        let report = jobs.poll(job_id, instance_id).await?;
        if report.status.is_terminal() {
            debug!(job_id, attempt, status = %report.status, "job finished");
            return Ok(report);
        }
        last = report.status;
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    warn!(job_id, polls = policy.max_attempts, last = %last, "job did not finish within the poll budget");
    Err(ExecError::Timeout {
        job_id: job_id.to_string(),
        polls: policy.max_attempts,
        last,
    })
}
