//! Configuration loading: `SPOTCRAFT_*` environment variables via `envy`,
//! plus the fleet specification file they may point at.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::config::{
    DEFAULT_CONSOLE_BINARY, DEFAULT_CONSOLE_HOST, DEFAULT_GAME_PORT, DEFAULT_LISTEN_ADDR,
};
use crate::domain::{AccessPolicy, BotConfig, ConsoleSettings, FleetSpec, PollPolicy};

pub const ENV_PREFIX: &str = "SPOTCRAFT_";

/// Raw environment view. Each field maps to `SPOTCRAFT_<FIELD>`.
#[derive(Debug, Deserialize)]
struct EnvConfig {
    region: Option<String>,

    #[serde(default = "default_listen_addr")]
    listen_addr: String,

    #[serde(default = "default_parameter_prefix")]
    parameter_prefix: String,

    /// Comma separated user ids allowed to run restricted commands.
    #[serde(default)]
    allowed_users: String,

    #[serde(default = "default_game_port")]
    game_port: u16,

    #[serde(default = "default_probe_timeout_ms")]
    probe_timeout_ms: u64,

    #[serde(default = "default_poll_delay_ms")]
    poll_initial_delay_ms: u64,

    #[serde(default = "default_poll_delay_ms")]
    poll_interval_ms: u64,

    #[serde(default = "default_poll_max_attempts")]
    poll_max_attempts: u32,

    #[serde(default = "default_console_binary")]
    console_binary: String,

    #[serde(default = "default_console_host")]
    console_host: String,

    /// Path to a JSON or YAML fleet specification.
    fleet_spec: Option<PathBuf>,

    /// Hex ed25519 verification key for webhook requests.
    public_key: Option<String>,
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

fn default_parameter_prefix() -> String {
    spotcraft_common::DEFAULT_PREFIX.to_string()
}

fn default_game_port() -> u16 {
    DEFAULT_GAME_PORT
}

fn default_probe_timeout_ms() -> u64 {
    3000
}

fn default_poll_delay_ms() -> u64 {
    500
}

fn default_poll_max_attempts() -> u32 {
    PollPolicy::default().max_attempts
}

fn default_console_binary() -> String {
    DEFAULT_CONSOLE_BINARY.to_string()
}

fn default_console_host() -> String {
    DEFAULT_CONSOLE_HOST.to_string()
}

/// Load and validate configuration from the process environment.
///
/// # Errors
///
/// Returns an error if a variable cannot be parsed, the fleet spec file
/// cannot be read, or validation fails.
pub fn load() -> Result<BotConfig> {
    from_vars(std::env::vars())
}

/// Same as [`load`], reading variables from `vars` instead of the process
/// environment.
///
/// # Errors
///
/// See [`load`].
pub fn from_vars<I>(vars: I) -> Result<BotConfig>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env: EnvConfig = envy::prefixed(ENV_PREFIX)
        .from_iter(vars)
        .with_context(|| format!("failed to load config from {ENV_PREFIX}* env vars"))?;

    let fleet_spec = env
        .fleet_spec
        .as_deref()
        .map(load_fleet_spec)
        .transpose()?;

    let config = BotConfig {
        region: env.region.filter(|r| !r.trim().is_empty()),
        listen_addr: env.listen_addr,
        parameter_prefix: env.parameter_prefix,
        access: AccessPolicy::from_csv(&env.allowed_users),
        game_port: env.game_port,
        probe_timeout: Duration::from_millis(env.probe_timeout_ms),
        poll: PollPolicy {
            initial_delay: Duration::from_millis(env.poll_initial_delay_ms),
            interval: Duration::from_millis(env.poll_interval_ms),
            max_attempts: env.poll_max_attempts,
        },
        console: ConsoleSettings {
            binary: env.console_binary,
            host: env.console_host,
        },
        fleet_spec,
        public_key: env.public_key.filter(|k| !k.trim().is_empty()),
    };

    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Parse a fleet specification; `.yaml`/`.yml` files are YAML, anything
/// else JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub fn load_fleet_spec(path: &Path) -> Result<FleetSpec> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;

    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    let spec: FleetSpec = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("cannot parse {}", path.display()))?
    };
    spec.validate()
        .with_context(|| format!("invalid fleet specification in {}", path.display()))?;
    Ok(spec)
}
