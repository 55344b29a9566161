//! Application service — lifecycle status resolution.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! Nothing is cached: every call re-reads the provider.

use tracing::{debug, warn};

use crate::application::ports::{AddressLookup, CapabilityProvider, LivenessProbe, ParameterStore};
use crate::domain::status::classify;
use crate::domain::{BotConfig, InstanceRecord, ProviderError, StatusReport};

/// Read the persisted fleet id. An absent or blank parameter is `None`.
///
/// # Errors
///
/// Propagates provider failures other than "parameter not found".
pub async fn persisted_fleet_id(
    store: &impl ParameterStore,
    config: &BotConfig,
) -> Result<Option<String>, ProviderError> {
    let value = store.get_parameter(&config.fleet_id_param(), false).await?;
    Ok(value.filter(|id| !id.trim().is_empty()))
}

/// The single active instance id, or `None` for zero or several.
pub(crate) fn single_instance(ids: &[String]) -> Option<&str> {
    match ids {
        [only] => Some(only.as_str()),
        [] => None,
        many => {
            warn!(count = many.len(), "fleet reports more than one active instance");
            None
        }
    }
}

/// Determine the composite lifecycle state.
///
/// Infallible: provider failures are folded into `LifecycleState::Error`
/// with the failure detail attached.
pub async fn resolve(
    provider: &impl CapabilityProvider,
    probe: &impl LivenessProbe,
    config: &BotConfig,
) -> StatusReport {
    let fleet_id = match persisted_fleet_id(provider, config).await {
        Ok(Some(id)) => id,
        Ok(None) => {
            debug!("no fleet id persisted");
            return StatusReport::no_fleet();
        }
        Err(e) => {
            warn!(error = %e, "failed to read persisted fleet id");
            return StatusReport::failed(None, e.to_string());
        }
    };

    match gather(provider, probe, config, &fleet_id).await {
        Ok(report) => {
            debug!(fleet_id = %fleet_id, state = %report.state, "status resolved");
            report
        }
        Err(e) => {
            warn!(fleet_id = %fleet_id, error = %e, "status query failed");
            StatusReport::failed(Some(fleet_id), e.to_string())
        }
    }
}

async fn gather(
    provider: &impl CapabilityProvider,
    probe: &impl LivenessProbe,
    config: &BotConfig,
    fleet_id: &str,
) -> Result<StatusReport, ProviderError> {
    let (fleet, elastic_ip) = tokio::join!(
        provider.describe_fleet(fleet_id),
        elastic_address(provider, config)
    );
    let elastic_ip = elastic_ip?;

    let fleet = match fleet {
        Ok(fleet) => fleet,
        Err(e) if e.is_not_found() => {
            warn!(fleet_id, "persisted fleet id is unknown to the provider");
            return Ok(StatusReport {
                state: classify(None, None, None, elastic_ip.is_some()),
                fleet_id: Some(fleet_id.to_string()),
                elastic_ip,
                ..StatusReport::no_fleet()
            });
        }
        Err(e) => return Err(e),
    };

    let instance = fleet_instance(provider, fleet_id).await?;

    let running = instance.as_ref().filter(|i| i.is_running());
    let liveness = match running.and_then(|i| i.public_ip.as_deref()) {
        Some(ip) => Some(probe.probe(ip, config.game_port, config.probe_timeout).await),
        None => None,
    };
    let address_present =
        elastic_ip.is_some() || instance.as_ref().is_some_and(|i| i.public_ip.is_some());

    let report = StatusReport {
        state: classify(
            Some(&fleet.state),
            instance.as_ref().and_then(|i| i.state.as_ref()),
            liveness,
            address_present,
        ),
        fleet_id: Some(fleet_id.to_string()),
        fleet_state: Some(fleet.state),
        target_capacity: Some(fleet.target_capacity),
        instance,
        liveness,
        elastic_ip,
        error: None,
    };
    Ok(report)
}

/// Details of the fleet's single instance, if it has exactly one.
async fn fleet_instance(
    provider: &impl CapabilityProvider,
    fleet_id: &str,
) -> Result<Option<InstanceRecord>, ProviderError> {
    let ids = provider.fleet_instance_ids(fleet_id).await?;
    let Some(instance_id) = single_instance(&ids) else {
        return Ok(None);
    };
    provider.describe_instance(instance_id).await
}

/// Public IP of the reserved address, `None` when none is configured or the
/// allocation no longer exists.
async fn elastic_address(
    provider: &(impl ParameterStore + AddressLookup),
    config: &BotConfig,
) -> Result<Option<String>, ProviderError> {
    let Some(allocation_id) = provider
        .get_parameter(&config.address_param(), false)
        .await?
        .filter(|id| !id.trim().is_empty())
    else {
        return Ok(None);
    };

    match provider.describe_address(&allocation_id).await {
        Ok(record) => Ok(record.and_then(|r| r.public_ip)),
        Err(e) if e.is_not_found() => {
            warn!(allocation_id = %allocation_id, "reserved address not found");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
