//! Resolved runtime configuration.
//!
//! Built once at process start by `infra::config` and passed by reference to
//! every service. Pure data; no environment lookups happen here.

use std::collections::BTreeSet;
use std::time::Duration;

use spotcraft_common::{DEFAULT_PREFIX, keys, parameter_name};

use crate::domain::error::ConfigError;
use crate::domain::fleet_spec::FleetSpec;

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_GAME_PORT: u16 = 25565;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_CONSOLE_BINARY: &str = "/usr/local/bin/mcrcon";
pub const DEFAULT_CONSOLE_HOST: &str = "127.0.0.1";

// ── Poll policy ──────────────────────────────────────────────────────────────

/// Remote job poll budget: wait `initial_delay`, then poll up to
/// `max_attempts` times, `interval` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub initial_delay: Duration,
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            interval: Duration::from_millis(500),
            max_attempts: 4,
        }
    }
}

impl PollPolicy {
    /// Upper bound on how long one remote command blocks its request.
    #[must_use]
    pub fn worst_case(&self) -> Duration {
        self.initial_delay + self.interval * self.max_attempts.saturating_sub(1)
    }
}

// ── Console settings ─────────────────────────────────────────────────────────

/// Where the remote console client lives on the instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleSettings {
    pub binary: String,
    pub host: String,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            binary: DEFAULT_CONSOLE_BINARY.to_string(),
            host: DEFAULT_CONSOLE_HOST.to_string(),
        }
    }
}

// ── Access policy ────────────────────────────────────────────────────────────

/// Static allow-list for restricted commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    allowed: BTreeSet<String>,
}

impl AccessPolicy {
    pub fn new<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: users.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a comma separated id list, ignoring blanks.
    #[must_use]
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(',').map(str::trim).filter(|s| !s.is_empty()))
    }

    #[must_use]
    pub fn is_allowed(&self, user_id: &str) -> bool {
        self.allowed.contains(user_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}

// ── Bot configuration ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Provider region; `None` defers to the provider's default chain.
    pub region: Option<String>,
    pub listen_addr: String,
    pub parameter_prefix: String,
    pub access: AccessPolicy,
    pub game_port: u16,
    pub probe_timeout: Duration,
    pub poll: PollPolicy,
    pub console: ConsoleSettings,
    pub fleet_spec: Option<FleetSpec>,
    /// Hex ed25519 verification key; `None` means read it from the store.
    pub public_key: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            region: None,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            parameter_prefix: DEFAULT_PREFIX.to_string(),
            access: AccessPolicy::default(),
            game_port: DEFAULT_GAME_PORT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            poll: PollPolicy::default(),
            console: ConsoleSettings::default(),
            fleet_spec: None,
            public_key: None,
        }
    }
}

impl BotConfig {
    /// Full parameter name for one of the well-known `keys`.
    #[must_use]
    pub fn param(&self, key: &str) -> String {
        parameter_name(&self.parameter_prefix, key)
    }

    #[must_use]
    pub fn fleet_id_param(&self) -> String {
        self.param(keys::FLEET_ID)
    }

    #[must_use]
    pub fn address_param(&self) -> String {
        self.param(keys::EIP_ALLOCATION_ID)
    }

    #[must_use]
    pub fn console_secret_param(&self) -> String {
        self.param(keys::RCON_PASSWORD)
    }

    #[must_use]
    pub fn public_key_param(&self) -> String {
        self.param(keys::PUBLIC_KEY)
    }

    /// Rejects values that would make a service misbehave at request time.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        spotcraft_common::validate_prefix(&self.parameter_prefix).map_err(|reason| {
            ConfigError::InvalidValue {
                key: "parameter_prefix",
                reason: reason.to_string(),
            }
        })?;
        if self.poll.max_attempts == 0 {
            return Err(invalid("poll_max_attempts", "must be at least 1"));
        }
        if self.probe_timeout.is_zero() {
            return Err(invalid("probe_timeout_ms", "must be greater than zero"));
        }
        if self.game_port == 0 {
            return Err(invalid("game_port", "must be greater than zero"));
        }
        if self.console.binary.trim().is_empty() {
            return Err(invalid("console_binary", "must not be empty"));
        }
        if self.console.host.trim().is_empty() {
            return Err(invalid("console_host", "must not be empty"));
        }
        if let Some(spec) = &self.fleet_spec {
            spec.validate()?;
        }
        Ok(())
    }
}

fn invalid(key: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        reason: reason.to_string(),
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
