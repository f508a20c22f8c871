//! Signing capability used to produce and re-check token signatures.
//!
//! The gate only depends on [`Signer`]. [`HmacSigner`] is the shared-secret
//! implementation; a delegated key service plugs in by implementing the trait.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("signing failed: {0}")]
pub struct SignerError(String);

impl SignerError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Deterministic signature over an opaque payload.
///
/// Implementations must return the same bytes for the same payload and key
/// material, and must be safe to call concurrently.
pub trait Signer: Send + Sync {
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, SignerError>;
}

impl<S> Signer for Arc<S>
where
    S: Signer + ?Sized,
{
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, SignerError> {
        (**self).sign(payload)
    }
}

/// HMAC-SHA256 over a shared secret.
pub struct HmacSigner {
    key: Vec<u8>,
}

impl HmacSigner {
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, SignerError> {
        let key = secret.into();
        if key.is_empty() {
            return Err(SignerError::new("signing secret must not be empty"));
        }
        Ok(Self { key })
    }
}

impl core::fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HmacSigner").field("key", &"<redacted>").finish()
    }
}

impl Signer for HmacSigner {
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, SignerError> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| SignerError::new(e.to_string()))?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmac_is_deterministic_per_key() {
        let a = HmacSigner::new("secret-a").unwrap();
        let b = HmacSigner::new("secret-b").unwrap();

        let sig1 = a.sign(b"payload").unwrap();
        let sig2 = a.sign(b"payload").unwrap();
        assert_eq!(sig1, sig2);
        assert_eq!(sig1.len(), 32);

        assert_ne!(sig1, b.sign(b"payload").unwrap());
        assert_ne!(sig1, a.sign(b"payload!").unwrap());
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(HmacSigner::new(Vec::<u8>::new()).is_err());
    }

    #[test]
    fn debug_does_not_leak_key() {
        let signer = HmacSigner::new("super-secret").unwrap();
        let rendered = format!("{signer:?}");
        assert!(!rendered.contains("super-secret"));
    }
}
