//! Authentication / authorization failure taxonomy.

use thiserror::Error;

use crate::signer::SignerError;

/// Why a bearer token was not accepted.
///
/// The first five variants are terminal for the current request: presenting the
/// same token again cannot succeed, so callers must obtain a fresh token. They
/// are distinguished for logs only; transports surface them uniformly as
/// "unauthorized". `Signer` and `Store` are transient infrastructure failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("no credential presented")]
    NoCredential,

    #[error("token is malformed")]
    MalformedToken,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    TokenExpired,

    #[error("token subject does not resolve to a user")]
    UnknownSubject,

    #[error("signer unavailable: {0}")]
    Signer(String),

    #[error("subject lookup failed: {0}")]
    Store(String),
}

impl AuthError {
    /// Stable code for logs and diagnostics. Never sent to unauthenticated callers.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::NoCredential => "no_credential",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::UnknownSubject => "unknown_subject",
            AuthError::Signer(_) => "signer_unavailable",
            AuthError::Store(_) => "store_unavailable",
        }
    }

    /// Retrying with the same token cannot succeed.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AuthError::NoCredential
                | AuthError::MalformedToken
                | AuthError::InvalidSignature
                | AuthError::TokenExpired
                | AuthError::UnknownSubject
        )
    }

    /// Eligible for a caller-level retry.
    pub fn is_transient(&self) -> bool {
        !self.is_terminal()
    }
}

impl From<SignerError> for AuthError {
    fn from(value: SignerError) -> Self {
        AuthError::Signer(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authn_failures_are_terminal() {
        for err in [
            AuthError::NoCredential,
            AuthError::MalformedToken,
            AuthError::InvalidSignature,
            AuthError::TokenExpired,
            AuthError::UnknownSubject,
        ] {
            assert!(err.is_terminal(), "{err:?}");
            assert!(!err.is_transient(), "{err:?}");
        }
    }

    #[test]
    fn infrastructure_failures_are_transient() {
        assert!(AuthError::Store("timeout".into()).is_transient());
        assert!(AuthError::Signer("kms down".into()).is_transient());
    }

    #[test]
    fn signer_error_converts() {
        let err: AuthError = SignerError::new("hsm offline").into();
        assert_eq!(err.error_code(), "signer_unavailable");
        assert!(err.to_string().contains("hsm offline"));
    }
}
