/// Parameter-store keys under the configured prefix.
pub mod keys {
    /// Identifier of the current fleet request.
    /// Format: {prefix}/fleet_id
    /// Written by start_fleet, overwritten on every successful create.
    pub const FLEET_ID: &str = "fleet_id";

    /// Allocation id of the elastic address reserved for the server.
    /// Format: {prefix}/eip_allocation_id
    /// Managed out-of-band; read-only for spotcraft.
    pub const EIP_ALLOCATION_ID: &str = "eip_allocation_id";

    /// Remote console password (SecureString, read with decryption).
    /// Format: {prefix}/rcon_password
    pub const RCON_PASSWORD: &str = "rcon_password";

    /// Hex-encoded ed25519 key used to verify webhook signatures.
    /// Format: {prefix}/discord_public_key
    pub const PUBLIC_KEY: &str = "discord_public_key";
}

/// Default prefix shared by every spotcraft parameter.
pub const DEFAULT_PREFIX: &str = "/minecraft";

/// Build the full parameter name for `key` under `prefix`.
pub fn parameter_name(prefix: &str, key: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), key)
}

/// Validate a parameter prefix: must start with '/', contain no whitespace,
/// and use only the characters the parameter store accepts in hierarchies.
pub fn validate_prefix(prefix: &str) -> Result<(), &'static str> {
    if !prefix.starts_with('/') {
        return Err("parameter prefix must start with '/'");
    }
    if prefix.trim_end_matches('/').is_empty() {
        return Err("parameter prefix must name at least one path segment");
    }
    if !prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '.' | '-'))
    {
        return Err("parameter prefix may only contain [a-zA-Z0-9/_.-]");
    }
    Ok(())
}
