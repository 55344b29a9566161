//! AWS implementation of the capability ports: EC2 fleets, instances and
//! addresses, SSM Parameter Store and SSM Run Command.

use std::fmt::Debug;

use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ec2::types::{
    DefaultTargetCapacityType, FleetData, FleetLaunchTemplateConfigRequest,
    FleetLaunchTemplateOverridesRequest, FleetLaunchTemplateSpecificationRequest, FleetType,
    Instance, InstanceType, ResourceType, SpotAllocationStrategy, SpotInstanceInterruptionBehavior,
    SpotOptionsRequest, Tag, TagSpecification, TargetCapacitySpecificationRequest,
};
use aws_sdk_ssm::types::{CloudWatchOutputConfig, ParameterType};
use chrono::{DateTime, Utc};
use spotcraft_common::{FleetState, InstanceState, JobStatus};
use tracing::{debug, info, warn};

use crate::application::ports::{AddressLookup, FleetControl, ParameterStore, RemoteJobs};
use crate::domain::{
    AddressRecord, BotConfig, ConsoleInvocation, FleetRecord, FleetSpec, InstanceRecord,
    JobReport, ProviderError,
};
use crate::infra::shell::render_invocation;

const FLEET_NOT_FOUND: &str = "InvalidFleetId.NotFound";
const INSTANCE_NOT_FOUND: &str = "InvalidInstanceID.NotFound";
const ALLOCATION_NOT_FOUND: &str = "InvalidAllocationID.NotFound";
const RUN_SHELL_DOCUMENT: &str = "AWS-RunShellScript";

/// EC2 + SSM clients built from one shared SDK configuration.
#[derive(Debug, Clone)]
pub struct AwsProvider {
    ec2: aws_sdk_ec2::Client,
    ssm: aws_sdk_ssm::Client,
}

impl AwsProvider {
    /// Resolve credentials and region through the default provider chain,
    /// overriding the region when one is configured.
    pub async fn from_config(config: &BotConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        let shared = loader.load().await;
        debug!(region = ?shared.region(), "aws configuration loaded");
        Self::new(&shared)
    }

    #[must_use]
    pub fn new(shared: &aws_config::SdkConfig) -> Self {
        Self {
            ec2: aws_sdk_ec2::Client::new(shared),
            ssm: aws_sdk_ssm::Client::new(shared),
        }
    }
}

// ── Error mapping ─────────────────────────────────────────────────────────────

/// Service errors carry a code; anything else never reached the service.
fn provider_error<E, R>(operation: &'static str, err: &SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: Debug,
{
    match err.code() {
        Some(code) => ProviderError::Api {
            operation,
            code: code.to_string(),
            message: err.message().unwrap_or_default().to_string(),
        },
        None => ProviderError::Transport {
            operation,
            message: DisplayErrorContext(err).to_string(),
        },
    }
}

fn has_code<E, R>(err: &SdkError<E, R>, code: &str) -> bool
where
    E: ProvideErrorMetadata,
{
    err.code() == Some(code)
}

fn not_found(resource: &'static str, id: &str) -> ProviderError {
    ProviderError::NotFound {
        resource,
        id: id.to_string(),
    }
}

// ── Record mapping ────────────────────────────────────────────────────────────

fn fleet_record(fleet_id: &str, data: &FleetData) -> Result<FleetRecord, ProviderError> {
    let state = data
        .fleet_state()
        .map(|s| FleetState::from(s.as_str()))
        .ok_or_else(|| ProviderError::Contract {
            operation: "DescribeFleets",
            message: format!("fleet `{fleet_id}` has no state"),
        })?;
    let target_capacity = data
        .target_capacity_specification()
        .and_then(|t| t.total_target_capacity())
        .unwrap_or(0);
    Ok(FleetRecord {
        fleet_id: fleet_id.to_string(),
        state,
        target_capacity,
    })
}

fn instance_record(instance: &Instance) -> Option<InstanceRecord> {
    Some(InstanceRecord {
        instance_id: instance.instance_id()?.to_string(),
        state: instance
            .state()
            .and_then(|s| s.name())
            .map(|n| InstanceState::from(n.as_str())),
        public_ip: instance.public_ip_address().map(str::to_string),
        instance_type: instance.instance_type().map(|t| t.as_str().to_string()),
        launch_time: instance.launch_time().and_then(|t| {
            DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos())
        }),
        lifecycle: instance
            .instance_lifecycle()
            .map(|l| l.as_str().to_string()),
    })
}

fn launch_template_config(spec: &FleetSpec) -> FleetLaunchTemplateConfigRequest {
    let template = FleetLaunchTemplateSpecificationRequest::builder()
        .set_launch_template_id(spec.launch_template.id.clone())
        .set_launch_template_name(spec.launch_template.name.clone())
        .version(&spec.launch_template.version)
        .build();

    let overrides = spec
        .overrides
        .iter()
        .map(|o| {
            FleetLaunchTemplateOverridesRequest::builder()
                .set_instance_type(o.instance_type.as_deref().map(InstanceType::from))
                .set_subnet_id(o.subnet_id.clone())
                .set_availability_zone(o.availability_zone.clone())
                .set_max_price(o.max_price.clone())
                .build()
        })
        .collect::<Vec<_>>();

    FleetLaunchTemplateConfigRequest::builder()
        .launch_template_specification(template)
        .set_overrides((!overrides.is_empty()).then_some(overrides))
        .build()
}

fn tag_specification(spec: &FleetSpec) -> Option<TagSpecification> {
    if spec.tags.is_empty() {
        return None;
    }
    let tags = spec
        .tags
        .iter()
        .map(|(k, v)| Tag::builder().key(k).value(v).build())
        .collect();
    Some(
        TagSpecification::builder()
            .resource_type(ResourceType::Fleet)
            .set_tags(Some(tags))
            .build(),
    )
}

// ── Fleet ─────────────────────────────────────────────────────────────────────

impl FleetControl for AwsProvider {
    async fn describe_fleet(&self, fleet_id: &str) -> Result<FleetRecord, ProviderError> {
        let out = self
            .ec2
            .describe_fleets()
            .fleet_ids(fleet_id)
            .send()
            .await
            .map_err(|e| {
                if has_code(&e, FLEET_NOT_FOUND) {
                    not_found("fleet", fleet_id)
                } else {
                    provider_error("DescribeFleets", &e)
                }
            })?;

        let data = out
            .fleets()
            .first()
            .ok_or_else(|| not_found("fleet", fleet_id))?;
        let record = fleet_record(fleet_id, data)?;
        debug!(fleet_id, state = %record.state, capacity = record.target_capacity, "fleet described");
        Ok(record)
    }

    async fn fleet_instance_ids(&self, fleet_id: &str) -> Result<Vec<String>, ProviderError> {
        let out = self
            .ec2
            .describe_fleet_instances()
            .fleet_id(fleet_id)
            .send()
            .await
            .map_err(|e| {
                if has_code(&e, FLEET_NOT_FOUND) {
                    not_found("fleet", fleet_id)
                } else {
                    provider_error("DescribeFleetInstances", &e)
                }
            })?;
        Ok(out
            .active_instances()
            .iter()
            .filter_map(|i| i.instance_id().map(str::to_string))
            .collect())
    }

    async fn describe_instance(
        &self,
        instance_id: &str,
    ) -> Result<Option<InstanceRecord>, ProviderError> {
        let out = match self
            .ec2
            .describe_instances()
            .instance_ids(instance_id)
            .send()
            .await
        {
            Ok(out) => out,
            Err(e) if has_code(&e, INSTANCE_NOT_FOUND) => {
                warn!(instance_id, "instance not found");
                return Ok(None);
            }
            Err(e) => return Err(provider_error("DescribeInstances", &e)),
        };
        Ok(out
            .reservations()
            .iter()
            .flat_map(|r| r.instances())
            .find_map(instance_record))
    }

    async fn create_fleet(&self, spec: &FleetSpec) -> Result<Option<String>, ProviderError> {
        let capacity = TargetCapacitySpecificationRequest::builder()
            .total_target_capacity(0)
            .default_target_capacity_type(DefaultTargetCapacityType::from(
                spec.capacity_type.as_str(),
            ))
            .build();

        let spot_options = (spec.allocation_strategy.is_some()
            || spec.interruption_behavior.is_some())
        .then(|| {
            SpotOptionsRequest::builder()
                .set_allocation_strategy(
                    spec.allocation_strategy
                        .as_deref()
                        .map(SpotAllocationStrategy::from),
                )
                .set_instance_interruption_behavior(
                    spec.interruption_behavior
                        .as_deref()
                        .map(SpotInstanceInterruptionBehavior::from),
                )
                .build()
        });

        let out = self
            .ec2
            .create_fleet()
            .launch_template_configs(launch_template_config(spec))
            .target_capacity_specification(capacity)
            .r#type(FleetType::from(spec.fleet_type.as_str()))
            .set_spot_options(spot_options)
            .set_tag_specifications(tag_specification(spec).map(|t| vec![t]))
            .send()
            .await
            .map_err(|e| provider_error("CreateFleet", &e))?;

        for err in out.errors() {
            warn!(
                code = err.error_code().unwrap_or_default(),
                message = err.error_message().unwrap_or_default(),
                "fleet creation reported an error"
            );
        }
        Ok(out.fleet_id().map(str::to_string))
    }

    async fn delete_fleet(
        &self,
        fleet_id: &str,
        terminate_instances: bool,
    ) -> Result<(), ProviderError> {
        let out = self
            .ec2
            .delete_fleets()
            .fleet_ids(fleet_id)
            .terminate_instances(terminate_instances)
            .send()
            .await
            .map_err(|e| provider_error("DeleteFleets", &e))?;

        if let Some(failure) = out.unsuccessful_fleet_deletions().first() {
            let error = failure.error();
            return Err(ProviderError::Api {
                operation: "DeleteFleets",
                code: error
                    .and_then(|e| e.code())
                    .map_or_else(|| "Unknown".to_string(), |c| c.as_str().to_string()),
                message: error
                    .and_then(|e| e.message())
                    .unwrap_or_default()
                    .to_string(),
            });
        }
        info!(fleet_id, terminate_instances, "fleet deletion accepted");
        Ok(())
    }

    async fn modify_target_capacity(&self, fleet_id: &str, target: i32) -> Result<(), ProviderError> {
        let out = self
            .ec2
            .modify_fleet()
            .fleet_id(fleet_id)
            .target_capacity_specification(
                TargetCapacitySpecificationRequest::builder()
                    .total_target_capacity(target)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| {
                if has_code(&e, FLEET_NOT_FOUND) {
                    not_found("fleet", fleet_id)
                } else {
                    provider_error("ModifyFleet", &e)
                }
            })?;

        if out.r#return() == Some(false) {
            return Err(ProviderError::Api {
                operation: "ModifyFleet",
                code: "Rejected".to_string(),
                message: format!("capacity change to {target} was not accepted"),
            });
        }
        Ok(())
    }
}

// ── Address ───────────────────────────────────────────────────────────────────

impl AddressLookup for AwsProvider {
    async fn describe_address(
        &self,
        allocation_id: &str,
    ) -> Result<Option<AddressRecord>, ProviderError> {
        let out = self
            .ec2
            .describe_addresses()
            .allocation_ids(allocation_id)
            .send()
            .await
            .map_err(|e| {
                if has_code(&e, ALLOCATION_NOT_FOUND) {
                    not_found("address allocation", allocation_id)
                } else {
                    provider_error("DescribeAddresses", &e)
                }
            })?;
        Ok(out.addresses().first().map(|a| AddressRecord {
            allocation_id: allocation_id.to_string(),
            public_ip: a.public_ip().map(str::to_string),
        }))
    }
}

// ── Parameters ────────────────────────────────────────────────────────────────

impl ParameterStore for AwsProvider {
    async fn get_parameter(
        &self,
        name: &str,
        decrypt: bool,
    ) -> Result<Option<String>, ProviderError> {
        match self
            .ssm
            .get_parameter()
            .name(name)
            .with_decryption(decrypt)
            .send()
            .await
        {
            Ok(out) => Ok(out
                .parameter()
                .and_then(|p| p.value())
                .map(str::to_string)),
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_parameter_not_found()) =>
            {
                debug!(name, "parameter not found");
                Ok(None)
            }
            Err(e) => Err(provider_error("GetParameter", &e)),
        }
    }

    async fn put_parameter(&self, name: &str, value: &str) -> Result<(), ProviderError> {
        self.ssm
            .put_parameter()
            .name(name)
            .value(value)
            .r#type(ParameterType::String)
            .overwrite(true)
            .send()
            .await
            .map_err(|e| provider_error("PutParameter", &e))?;
        debug!(name, "parameter written");
        Ok(())
    }
}

// ── Remote jobs ───────────────────────────────────────────────────────────────

impl RemoteJobs for AwsProvider {
    async fn submit(
        &self,
        instance_id: &str,
        invocation: &ConsoleInvocation,
    ) -> Result<String, ProviderError> {
        let out = self
            .ssm
            .send_command()
            .instance_ids(instance_id)
            .document_name(RUN_SHELL_DOCUMENT)
            .parameters("commands", vec![render_invocation(invocation)])
            .cloud_watch_output_config(
                CloudWatchOutputConfig::builder()
                    .cloud_watch_output_enabled(true)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| provider_error("SendCommand", &e))?;

        let job_id = out
            .command()
            .and_then(|c| c.command_id())
            .ok_or_else(|| ProviderError::Contract {
                operation: "SendCommand",
                message: "response carried no command id".to_string(),
            })?;
        debug!(instance_id, job_id, "console command submitted");
        Ok(job_id.to_string())
    }

    async fn poll(&self, job_id: &str, instance_id: &str) -> Result<JobReport, ProviderError> {
        match self
            .ssm
            .get_command_invocation()
            .command_id(job_id)
            .instance_id(instance_id)
            .send()
            .await
        {
            Ok(out) => Ok(JobReport {
                status: out
                    .status()
                    .map_or(JobStatus::Pending, |s| JobStatus::from(s.as_str())),
                stdout: out.standard_output_content().unwrap_or_default().to_string(),
            }),
            // The invocation is not visible until the agent picks the job up.
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_invocation_does_not_exist()) =>
            {
                Ok(JobReport {
                    status: JobStatus::Pending,
                    stdout: String::new(),
                })
            }
            Err(e) => Err(provider_error("GetCommandInvocation", &e)),
        }
    }
}
