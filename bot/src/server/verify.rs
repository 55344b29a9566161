//! Ed25519 request signature verification.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use thiserror::Error;

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("missing header {0}")]
    MissingHeader(&'static str),

    #[error("signature is not 64 hex-encoded bytes")]
    MalformedSignature,

    #[error("signature does not match")]
    BadSignature,

    #[error("invalid public key: {0}")]
    InvalidKey(String),
}

/// Checks `signature` over `timestamp || body` with the application's
/// public key.
#[derive(Debug, Clone)]
pub struct RequestVerifier {
    key: VerifyingKey,
}

impl RequestVerifier {
    #[must_use]
    pub fn new(key: VerifyingKey) -> Self {
        Self { key }
    }

    /// Build from the hex public key shown in the application settings.
    ///
    /// # Errors
    ///
    /// `InvalidKey` when the text is not 32 hex-encoded bytes or not a
    /// valid curve point.
    pub fn from_hex(hex_key: &str) -> Result<Self, VerifyError> {
        let bytes: [u8; 32] = hex::decode(hex_key.trim())
            .map_err(|e| VerifyError::InvalidKey(e.to_string()))?
            .try_into()
            .map_err(|_| VerifyError::InvalidKey("expected 32 bytes".to_string()))?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| VerifyError::InvalidKey(e.to_string()))?;
        Ok(Self::new(key))
    }

    /// # Errors
    ///
    /// `MalformedSignature` or `BadSignature`.
    pub fn verify(&self, timestamp: &str, body: &[u8], signature_hex: &str) -> Result<(), VerifyError> {
        let bytes: [u8; 64] = hex::decode(signature_hex)
            .ok()
            .and_then(|b| b.try_into().ok())
            .ok_or(VerifyError::MalformedSignature)?;
        let signature = Signature::from_bytes(&bytes);

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key
            .verify(&message, &signature)
            .map_err(|_| VerifyError::BadSignature)
    }
}
