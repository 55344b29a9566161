//! Serve command implementation.
//!
//! Resolves the interaction public key, then hands off to the webhook
//! server until shutdown.

use anyhow::{Context, Result};
use tracing::info;

use crate::application::ports::{CapabilityProvider, LivenessProbe, ParameterStore};
use crate::domain::BotConfig;
use crate::server::verify::RequestVerifier;
use crate::server::{self, AppState};

/// Run the webhook server.
///
/// # Errors
///
/// Returns an error if no valid public key is available or the server
/// fails to bind.
pub async fn run<P, L>(config: BotConfig, provider: P, probe: L) -> Result<()>
where
    P: CapabilityProvider + Send + Sync + 'static,
    L: LivenessProbe + Send + Sync + 'static,
{
    let public_key = public_key(&provider, &config).await?;
    let verifier =
        RequestVerifier::from_hex(&public_key).context("invalid interaction public key")?;

    info!(
        region = config.region.as_deref().unwrap_or("default"),
        parameter_prefix = %config.parameter_prefix,
        allowed_users = config.access.len(),
        fleet_spec = config.fleet_spec.is_some(),
        console_timeout_ms = config.poll.worst_case().as_millis(),
        "configuration loaded",
    );

    server::serve(AppState {
        provider,
        probe,
        config,
        verifier,
    })
    .await
}

/// The configured key, else the one stored under the public-key parameter.
///
/// # Errors
///
/// Returns an error when neither source holds a non-empty key.
pub async fn public_key(store: &impl ParameterStore, config: &BotConfig) -> Result<String> {
    if let Some(key) = config.public_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    let name = config.public_key_param();
    store
        .get_parameter(&name, false)
        .await
        .with_context(|| format!("failed to read parameter {name}"))?
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .with_context(|| {
            format!("no interaction public key: set SPOTCRAFT_PUBLIC_KEY or the {name} parameter")
        })
}
