use std::fmt;

use serde::{Deserialize, Serialize};

/// Declares a provider state enum that keeps unrecognised values verbatim.
///
/// Serialises as the provider's own string so reports stay faithful to what
/// the provider returned.
macro_rules! provider_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)*
            /// A value this build does not recognise, kept as reported.
            Unknown(String),
        }

        impl $name {
            /// The provider's spelling of this value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $text,)*
                    Self::Unknown(raw) => raw,
                }
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                match raw {
                    $($text => Self::$variant,)*
                    other => Self::Unknown(other.to_string()),
                }
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self::from(raw.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

provider_enum! {
    /// State of a provider-side fleet request.
    pub enum FleetState {
        Submitted => "submitted",
        Active => "active",
        Modifying => "modifying",
        Cancelled => "cancelled",
        CancelledRunning => "cancelled_running",
        CancelledTerminating => "cancelled_terminating",
        Deleted => "deleted",
        DeletedRunning => "deleted_running",
        DeletedTerminating => "deleted_terminating",
        Failed => "failed",
    }
}

impl FleetState {
    /// `submitted`, `active` or `modifying`: the fleet may still own capacity.
    #[must_use]
    pub fn is_active_like(&self) -> bool {
        matches!(self, Self::Submitted | Self::Active | Self::Modifying)
    }

    /// The fleet can no longer be scaled and must be recreated.
    #[must_use]
    pub fn is_gone(&self) -> bool {
        matches!(
            self,
            Self::Cancelled
                | Self::CancelledRunning
                | Self::CancelledTerminating
                | Self::Deleted
                | Self::DeletedRunning
                | Self::DeletedTerminating
                | Self::Failed
        )
    }
}

provider_enum! {
    /// State of the compute instance owned by the fleet.
    pub enum InstanceState {
        Pending => "pending",
        Running => "running",
        ShuttingDown => "shutting-down",
        Terminated => "terminated",
        Stopping => "stopping",
        Stopped => "stopped",
    }
}

provider_enum! {
    /// Status of a submitted remote job.
    pub enum JobStatus {
        Pending => "Pending",
        InProgress => "InProgress",
        Delayed => "Delayed",
        Success => "Success",
        Cancelled => "Cancelled",
        Cancelling => "Cancelling",
        TimedOut => "TimedOut",
        Failed => "Failed",
    }
}

impl JobStatus {
    /// Whether polling can stop. Unrecognised statuses end the poll so an
    /// unexpected provider value never spins the loop to its budget.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            Self::Pending | Self::InProgress | Self::Delayed | Self::Cancelling
        )
    }
}

/// Application-level reachability of the game port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Liveness {
    /// A connection was accepted.
    Online,
    /// The connection was refused or timed out.
    Offline,
    /// The probe failed for another reason.
    Unknown,
}

impl fmt::Display for Liveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Online => "ONLINE",
            Self::Offline => "OFFLINE",
            Self::Unknown => "UNKNOWN",
        })
    }
}

/// Composite lifecycle classification derived on every status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    /// No fleet id is persisted.
    OfflineNoFleet,
    /// The fleet was cancelled, deleted or failed; recreate it.
    FleetGone,
    /// The instance runs but the game port does not answer.
    InstanceUpServiceDown,
    /// The server accepts connections.
    Ready,
    /// The fleet is active but no instance is running.
    FleetActiveNoInstance,
    /// The fleet is being submitted or modified.
    FleetTransitioning,
    /// None of the known combinations matched.
    StatusUnclear,
    /// A provider call failed while gathering the report.
    Error,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OfflineNoFleet => "OFFLINE_NO_FLEET",
            Self::FleetGone => "FLEET_GONE",
            Self::InstanceUpServiceDown => "INSTANCE_UP_SERVICE_DOWN",
            Self::Ready => "READY",
            Self::FleetActiveNoInstance => "FLEET_ACTIVE_NO_INSTANCE",
            Self::FleetTransitioning => "FLEET_TRANSITIONING",
            Self::StatusUnclear => "STATUS_UNCLEAR",
            Self::Error => "ERROR",
        })
    }
}
