//! In-memory capability provider and liveness probe for service tests.
//!
//! `FakeCloud` keeps fleets, instances, addresses, parameters and a scripted
//! job in one `Mutex`, and records every call so tests can assert which
//! provider operations ran.

#![allow(clippy::expect_used, dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use secrecy::ExposeSecret as _;
use spotcraft::application::ports::{
    AddressLookup, FleetControl, LivenessProbe, ParameterStore, RemoteJobs,
};
use spotcraft::domain::{
    AccessPolicy, AddressRecord, BotConfig, ConsoleInvocation, FleetRecord, FleetSpec,
    InstanceRecord, JobReport, PollPolicy, ProviderError,
};
use spotcraft_common::{FleetState, InstanceState, JobStatus, Liveness};

pub const FLEET_ID: &str = "fleet-0a1b2c";
pub const INSTANCE_ID: &str = "i-0123456789abcdef0";
pub const NEW_FLEET_ID: &str = "fleet-new";
pub const ADMIN: &str = "1001";
pub const RCON_PASSWORD: &str = "hunter2";

// ── Configuration ─────────────────────────────────────────────────────────────

pub fn fleet_spec() -> FleetSpec {
    serde_json::from_str(r#"{"launch_template":{"name":"minecraft-server"}}"#)
        .expect("fleet spec")
}

/// Default config with one admin, a fleet spec, and a zero-delay poll.
pub fn config() -> BotConfig {
    BotConfig {
        access: AccessPolicy::new([ADMIN]),
        fleet_spec: Some(fleet_spec()),
        poll: PollPolicy {
            initial_delay: Duration::ZERO,
            interval: Duration::ZERO,
            max_attempts: 4,
        },
        ..BotConfig::default()
    }
}

// ── Call log ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Calls {
    pub describe_fleet: usize,
    pub describe_instance: usize,
    pub creates: usize,
    pub deletes: Vec<(String, bool)>,
    pub modifies: Vec<(String, i32)>,
    pub puts: Vec<(String, String)>,
    pub secret_reads: usize,
    pub submits: Vec<SubmittedJob>,
    pub polls: usize,
}

impl Calls {
    /// Number of calls that change provider state.
    pub fn mutations(&self) -> usize {
        self.creates + self.deletes.len() + self.modifies.len() + self.puts.len()
            + self.submits.len()
    }
}

#[derive(Debug, Clone)]
pub struct SubmittedJob {
    pub instance_id: String,
    pub binary: String,
    pub host: String,
    pub password: String,
    pub argument: String,
}

// ── Provider ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct CloudState {
    parameters: HashMap<String, String>,
    fleets: HashMap<String, FleetRecord>,
    fleet_instances: HashMap<String, Vec<String>>,
    instances: HashMap<String, InstanceRecord>,
    addresses: HashMap<String, AddressRecord>,
    /// Id handed out by the next `create_fleet`; `None` simulates a
    /// response without an id.
    create_returns: Option<String>,
    describe_fleet_error: Option<ProviderError>,
    job_script: VecDeque<JobStatus>,
    job_stdout: String,
    calls: Calls,
}

pub struct FakeCloud {
    state: Mutex<CloudState>,
}

impl Default for FakeCloud {
    fn default() -> Self {
        Self::empty()
    }
}

impl FakeCloud {
    /// Nothing persisted, no fleets.
    pub fn empty() -> Self {
        Self {
            state: Mutex::new(CloudState {
                create_returns: Some(NEW_FLEET_ID.to_string()),
                ..CloudState::default()
            }),
        }
    }

    /// A persisted fleet id whose fleet has `state` and `capacity`.
    pub fn with_fleet(state: FleetState, capacity: i32) -> Self {
        let cloud = Self::empty().with_parameter(&config().fleet_id_param(), FLEET_ID);
        cloud.edit(|s| {
            s.fleets.insert(
                FLEET_ID.to_string(),
                FleetRecord {
                    fleet_id: FLEET_ID.to_string(),
                    state,
                    target_capacity: capacity,
                },
            );
            s.fleet_instances.insert(FLEET_ID.to_string(), Vec::new());
        });
        cloud
    }

    /// A persisted fleet id the provider has never heard of.
    pub fn with_stale_fleet_id() -> Self {
        Self::empty().with_parameter(&config().fleet_id_param(), FLEET_ID)
    }

    pub fn with_parameter(self, name: &str, value: &str) -> Self {
        self.edit(|s| {
            s.parameters.insert(name.to_string(), value.to_string());
        });
        self
    }

    /// Attach one instance to the persisted fleet.
    pub fn with_instance(self, state: InstanceState, public_ip: Option<&str>) -> Self {
        self.with_named_instance(INSTANCE_ID, state, public_ip)
    }

    pub fn with_named_instance(
        self,
        instance_id: &str,
        state: InstanceState,
        public_ip: Option<&str>,
    ) -> Self {
        self.edit(|s| {
            s.fleet_instances
                .entry(FLEET_ID.to_string())
                .or_default()
                .push(instance_id.to_string());
            s.instances.insert(
                instance_id.to_string(),
                InstanceRecord {
                    instance_id: instance_id.to_string(),
                    state: Some(state),
                    public_ip: public_ip.map(str::to_string),
                    instance_type: Some("t3.medium".to_string()),
                    launch_time: None,
                    lifecycle: Some("spot".to_string()),
                },
            );
        });
        self
    }

    /// Configure the reserved address and its allocation.
    pub fn with_elastic_ip(self, public_ip: &str) -> Self {
        let allocation_id = "eipalloc-0abc";
        let cloud = self.with_parameter(&config().address_param(), allocation_id);
        cloud.edit(|s| {
            s.addresses.insert(
                allocation_id.to_string(),
                AddressRecord {
                    allocation_id: allocation_id.to_string(),
                    public_ip: Some(public_ip.to_string()),
                },
            );
        });
        cloud
    }

    pub fn with_console_password(self) -> Self {
        self.with_parameter(&config().console_secret_param(), RCON_PASSWORD)
    }

    /// Statuses returned by successive polls; the last one repeats.
    pub fn with_job(self, statuses: impl IntoIterator<Item = JobStatus>, stdout: &str) -> Self {
        self.edit(|s| {
            s.job_script = statuses.into_iter().collect();
            s.job_stdout = stdout.to_string();
        });
        self
    }

    pub fn with_create_returning(self, fleet_id: Option<&str>) -> Self {
        self.edit(|s| s.create_returns = fleet_id.map(str::to_string));
        self
    }

    pub fn with_describe_fleet_error(self, error: ProviderError) -> Self {
        self.edit(|s| s.describe_fleet_error = Some(error));
        self
    }

    pub fn calls(&self) -> Calls {
        self.state.lock().expect("lock").calls.clone()
    }

    pub fn parameter(&self, name: &str) -> Option<String> {
        self.state.lock().expect("lock").parameters.get(name).cloned()
    }

    pub fn fleet(&self, fleet_id: &str) -> Option<FleetRecord> {
        self.state.lock().expect("lock").fleets.get(fleet_id).cloned()
    }

    fn edit<R>(&self, f: impl FnOnce(&mut CloudState) -> R) -> R {
        f(&mut self.state.lock().expect("lock"))
    }
}

fn not_found(resource: &'static str, id: &str) -> ProviderError {
    ProviderError::NotFound {
        resource,
        id: id.to_string(),
    }
}

impl FleetControl for FakeCloud {
    async fn describe_fleet(&self, fleet_id: &str) -> Result<FleetRecord, ProviderError> {
        self.edit(|s| {
            s.calls.describe_fleet += 1;
            if let Some(error) = &s.describe_fleet_error {
                return Err(error.clone());
            }
            s.fleets
                .get(fleet_id)
                .cloned()
                .ok_or_else(|| not_found("fleet", fleet_id))
        })
    }

    async fn fleet_instance_ids(&self, fleet_id: &str) -> Result<Vec<String>, ProviderError> {
        self.edit(|s| {
            s.fleet_instances
                .get(fleet_id)
                .cloned()
                .ok_or_else(|| not_found("fleet", fleet_id))
        })
    }

    async fn describe_instance(
        &self,
        instance_id: &str,
    ) -> Result<Option<InstanceRecord>, ProviderError> {
        self.edit(|s| {
            s.calls.describe_instance += 1;
            Ok(s.instances.get(instance_id).cloned())
        })
    }

    async fn create_fleet(&self, _spec: &FleetSpec) -> Result<Option<String>, ProviderError> {
        self.edit(|s| {
            s.calls.creates += 1;
            let created = s.create_returns.clone();
            if let Some(id) = &created {
                s.fleets.insert(
                    id.clone(),
                    FleetRecord {
                        fleet_id: id.clone(),
                        state: FleetState::Submitted,
                        target_capacity: 0,
                    },
                );
                s.fleet_instances.insert(id.clone(), Vec::new());
            }
            Ok(created)
        })
    }

    async fn delete_fleet(
        &self,
        fleet_id: &str,
        terminate_instances: bool,
    ) -> Result<(), ProviderError> {
        self.edit(|s| {
            s.calls
                .deletes
                .push((fleet_id.to_string(), terminate_instances));
            let fleet = s
                .fleets
                .get_mut(fleet_id)
                .ok_or_else(|| not_found("fleet", fleet_id))?;
            fleet.state = FleetState::DeletedTerminating;
            Ok(())
        })
    }

    async fn modify_target_capacity(&self, fleet_id: &str, target: i32) -> Result<(), ProviderError> {
        self.edit(|s| {
            s.calls.modifies.push((fleet_id.to_string(), target));
            let fleet = s
                .fleets
                .get_mut(fleet_id)
                .ok_or_else(|| not_found("fleet", fleet_id))?;
            fleet.target_capacity = target;
            fleet.state = FleetState::Modifying;
            Ok(())
        })
    }
}

impl AddressLookup for FakeCloud {
    async fn describe_address(
        &self,
        allocation_id: &str,
    ) -> Result<Option<AddressRecord>, ProviderError> {
        self.edit(|s| Ok(s.addresses.get(allocation_id).cloned()))
    }
}

impl ParameterStore for FakeCloud {
    async fn get_parameter(&self, name: &str, decrypt: bool) -> Result<Option<String>, ProviderError> {
        self.edit(|s| {
            if decrypt {
                s.calls.secret_reads += 1;
            }
            Ok(s.parameters.get(name).cloned())
        })
    }

    async fn put_parameter(&self, name: &str, value: &str) -> Result<(), ProviderError> {
        self.edit(|s| {
            s.calls.puts.push((name.to_string(), value.to_string()));
            s.parameters.insert(name.to_string(), value.to_string());
            Ok(())
        })
    }
}

impl RemoteJobs for FakeCloud {
    async fn submit(
        &self,
        instance_id: &str,
        invocation: &ConsoleInvocation,
    ) -> Result<String, ProviderError> {
        self.edit(|s| {
            s.calls.submits.push(SubmittedJob {
                instance_id: instance_id.to_string(),
                binary: invocation.binary.clone(),
                host: invocation.host.clone(),
                password: invocation.password.expose_secret().to_string(),
                argument: invocation.argument.clone(),
            });
            Ok(format!("job-{}", s.calls.submits.len()))
        })
    }

    async fn poll(&self, _job_id: &str, _instance_id: &str) -> Result<JobReport, ProviderError> {
        self.edit(|s| {
            s.calls.polls += 1;
            let next = if s.job_script.len() > 1 {
                s.job_script.pop_front()
            } else {
                s.job_script.front().cloned()
            };
            let status = next.unwrap_or(JobStatus::Pending);
            let stdout = if status.is_terminal() {
                s.job_stdout.clone()
            } else {
                String::new()
            };
            Ok(JobReport { status, stdout })
        })
    }
}

// ── Probe ─────────────────────────────────────────────────────────────────────

/// Always answers `result`, counting calls and remembering the last target.
pub struct FixedProbe {
    result: Liveness,
    calls: AtomicUsize,
    last_target: Mutex<Option<(String, u16)>>,
}

impl FixedProbe {
    pub fn new(result: Liveness) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            last_target: Mutex::new(None),
        }
    }

    pub fn online() -> Self {
        Self::new(Liveness::Online)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_target(&self) -> Option<(String, u16)> {
        self.last_target.lock().expect("lock").clone()
    }
}

impl LivenessProbe for FixedProbe {
    async fn probe(&self, address: &str, port: u16, _timeout: Duration) -> Liveness {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_target.lock().expect("lock") = Some((address.to_string(), port));
        self.result
    }
}
