//! Application service — fleet-mutating operations.
//!
//! Each operation re-reads the fleet and checks its precondition before any
//! provider mutation, so an interrupted or repeated call is harmless. The
//! persisted fleet id is read-modify-written without locking; concurrent
//! `start_fleet` calls may race, which access control is expected to bound.

use tracing::{info, warn};

use crate::application::ports::CapabilityProvider;
use crate::application::services::resolver::persisted_fleet_id;
use crate::domain::{
    BotConfig, CommandOutcome, FleetOperation, FleetRecord, LifecycleError, MAX_TARGET_CAPACITY,
};

/// Create a new fleet and persist its id.
///
/// # Errors
///
/// `AlreadyActive` when the persisted fleet is still submitted, active or
/// modifying; `NoFleetSpec` when no specification is configured;
/// `ProviderContractViolation` when the provider returns no fleet id.
pub async fn create_fleet(
    provider: &impl CapabilityProvider,
    config: &BotConfig,
) -> Result<CommandOutcome, LifecycleError> {
    let previous = persisted_fleet_id(provider, config).await?;

    if let Some(fleet_id) = previous.as_deref() {
        match provider.describe_fleet(fleet_id).await {
            Ok(fleet) if fleet.state.is_active_like() => {
                info!(fleet_id, state = %fleet.state, "refusing to create fleet: current fleet is active");
                return Err(LifecycleError::AlreadyActive { state: fleet.state });
            }
            Ok(fleet) => {
                info!(fleet_id, state = %fleet.state, "replacing inactive fleet");
            }
            Err(e) if e.is_not_found() => {
                warn!(fleet_id, "persisted fleet id no longer exists; proceeding");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let spec = config.fleet_spec.as_ref().ok_or(LifecycleError::NoFleetSpec)?;

    info!(template = ?spec.launch_template, "creating fleet");
    let fleet_id = provider
        .create_fleet(spec)
        .await?
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| {
            LifecycleError::ProviderContractViolation(
                "No fleet ID returned from the fleet creation call.".to_string(),
            )
        })?;

    provider
        .put_parameter(&config.fleet_id_param(), &fleet_id)
        .await?;
    info!(fleet_id = %fleet_id, "fleet created and id persisted");

    Ok(CommandOutcome::FleetCreated {
        fleet_id,
        replaced: previous,
    })
}

/// Delete the persisted fleet and terminate its instances.
///
/// The persisted id is left in place; status keeps reporting the dead fleet
/// until the next `create_fleet` overwrites it.
///
/// # Errors
///
/// `NoFleet` when no id is persisted; `NotActive` unless the fleet is
/// submitted, active or modifying.
pub async fn delete_fleet(
    provider: &impl CapabilityProvider,
    config: &BotConfig,
) -> Result<CommandOutcome, LifecycleError> {
    let fleet_id = persisted_fleet_id(provider, config)
        .await?
        .ok_or(LifecycleError::NoFleet {
            operation: FleetOperation::Delete,
        })?;

    match current_fleet(provider, &fleet_id).await? {
        Some(fleet) if fleet.state.is_active_like() => {}
        Some(fleet) => {
            info!(fleet_id = %fleet_id, state = %fleet.state, "refusing to delete inactive fleet");
            return Err(LifecycleError::NotActive {
                state: Some(fleet.state),
            });
        }
        None => return Err(LifecycleError::NotActive { state: None }),
    }

    provider.delete_fleet(&fleet_id, true).await?;
    info!(fleet_id = %fleet_id, "fleet deleted with instance termination");

    Ok(CommandOutcome::FleetDeleted { fleet_id })
}

/// Request a new total target capacity (0 or 1) without waiting for the
/// provider to act on it.
///
/// # Errors
///
/// `InvalidCapacity` outside 0..=1; `NoFleet` when no id is persisted;
/// `FleetGone` for cancelled, deleted, failed or unknown fleets;
/// `AlreadyAtTarget` when the fleet already asks for that capacity
/// (any positive capacity counts as started).
pub async fn set_target_capacity(
    provider: &impl CapabilityProvider,
    config: &BotConfig,
    target: i32,
) -> Result<CommandOutcome, LifecycleError> {
    if !(0..=MAX_TARGET_CAPACITY).contains(&target) {
        return Err(LifecycleError::InvalidCapacity(target));
    }

    let fleet_id = persisted_fleet_id(provider, config)
        .await?
        .ok_or(LifecycleError::NoFleet {
            operation: FleetOperation::for_capacity(target),
        })?;

    let fleet = current_fleet(provider, &fleet_id)
        .await?
        .ok_or(LifecycleError::FleetGone { state: None })?;

    if fleet.state.is_gone() {
        return Err(LifecycleError::FleetGone {
            state: Some(fleet.state),
        });
    }

    let already = if target > 0 {
        fleet.target_capacity > 0
    } else {
        fleet.target_capacity == 0
    };
    if already {
        info!(fleet_id = %fleet_id, capacity = fleet.target_capacity, "target capacity unchanged");
        return Err(LifecycleError::AlreadyAtTarget {
            capacity: fleet.target_capacity,
        });
    }

    provider.modify_target_capacity(&fleet_id, target).await?;
    info!(fleet_id = %fleet_id, from = fleet.target_capacity, to = target, "target capacity requested");

    Ok(CommandOutcome::CapacityRequested { fleet_id, target })
}

/// Raise target capacity to 1.
///
/// # Errors
///
/// See [`set_target_capacity`].
pub async fn start(
    provider: &impl CapabilityProvider,
    config: &BotConfig,
) -> Result<CommandOutcome, LifecycleError> {
    set_target_capacity(provider, config, MAX_TARGET_CAPACITY).await
}

/// Lower target capacity to 0, keeping the fleet.
///
/// # Errors
///
/// See [`set_target_capacity`].
pub async fn stop(
    provider: &impl CapabilityProvider,
    config: &BotConfig,
) -> Result<CommandOutcome, LifecycleError> {
    set_target_capacity(provider, config, 0).await
}

/// The fleet record, `None` when the provider no longer knows the id.
async fn current_fleet(
    provider: &impl CapabilityProvider,
    fleet_id: &str,
) -> Result<Option<FleetRecord>, LifecycleError> {
    match provider.describe_fleet(fleet_id).await {
        Ok(fleet) => Ok(Some(fleet)),
        Err(e) if e.is_not_found() => {
            warn!(fleet_id, "persisted fleet id is unknown to the provider");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

