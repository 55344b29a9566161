//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and the shared vocabulary
//! crate, never from `crate::infra`, `crate::commands`, or `crate::output`.
//!
//! Methods return `impl Future + Send` so services stay usable from the
//! multi-threaded webhook server; implementations may still be written as
//! `async fn`.

use std::future::Future;
use std::time::Duration;

use spotcraft_common::Liveness;

use crate::domain::{
    AddressRecord, ConsoleInvocation, FleetRecord, FleetSpec, InstanceRecord, JobReport,
    ProviderError,
};

// ── Fleet ─────────────────────────────────────────────────────────────────────

/// Fleet request and instance operations.
pub trait FleetControl {
    /// Current state and target capacity of a fleet. A fleet id the
    /// provider does not know yields `ProviderError::NotFound`.
    fn describe_fleet(
        &self,
        fleet_id: &str,
    ) -> impl Future<Output = Result<FleetRecord, ProviderError>> + Send;

    /// Ids of the fleet's active instances.
    fn fleet_instance_ids(
        &self,
        fleet_id: &str,
    ) -> impl Future<Output = Result<Vec<String>, ProviderError>> + Send;

    /// Full details of one instance, `None` if the provider returned nothing.
    fn describe_instance(
        &self,
        instance_id: &str,
    ) -> impl Future<Output = Result<Option<InstanceRecord>, ProviderError>> + Send;

    /// Submit a new fleet request at capacity 0. `Ok(None)` means the
    /// provider accepted the call but returned no fleet id.
    fn create_fleet(
        &self,
        spec: &FleetSpec,
    ) -> impl Future<Output = Result<Option<String>, ProviderError>> + Send;

    fn delete_fleet(
        &self,
        fleet_id: &str,
        terminate_instances: bool,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    fn modify_target_capacity(
        &self,
        fleet_id: &str,
        target: i32,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;
}

// ── Address ───────────────────────────────────────────────────────────────────

/// Lookup of the out-of-band reserved address.
pub trait AddressLookup {
    fn describe_address(
        &self,
        allocation_id: &str,
    ) -> impl Future<Output = Result<Option<AddressRecord>, ProviderError>> + Send;
}

// ── Parameters ────────────────────────────────────────────────────────────────

/// Durable key/value storage for the fleet id and secrets.
pub trait ParameterStore {
    /// `Ok(None)` when the parameter does not exist.
    fn get_parameter(
        &self,
        name: &str,
        decrypt: bool,
    ) -> impl Future<Output = Result<Option<String>, ProviderError>> + Send;

    /// Creates or overwrites a plain string parameter.
    fn put_parameter(
        &self,
        name: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;
}

// ── Remote jobs ───────────────────────────────────────────────────────────────

/// Submit-then-poll job execution on an instance.
pub trait RemoteJobs {
    /// Returns the provider's job id.
    fn submit(
        &self,
        instance_id: &str,
        invocation: &ConsoleInvocation,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;

    fn poll(
        &self,
        job_id: &str,
        instance_id: &str,
    ) -> impl Future<Output = Result<JobReport, ProviderError>> + Send;
}

// ── Composite ─────────────────────────────────────────────────────────────────

/// Everything the services need from the cloud provider.
pub trait CapabilityProvider: FleetControl + AddressLookup + ParameterStore + RemoteJobs {}

impl<T> CapabilityProvider for T where T: FleetControl + AddressLookup + ParameterStore + RemoteJobs {}

// ── Liveness ──────────────────────────────────────────────────────────────────

/// Application-port reachability check. Never fails: every outcome maps to
/// a `Liveness` value.
pub trait LivenessProbe {
    fn probe(
        &self,
        address: &str,
        port: u16,
        timeout: Duration,
    ) -> impl Future<Output = Liveness> + Send;
}
