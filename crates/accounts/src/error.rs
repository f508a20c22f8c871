use thiserror::Error;

use satellite_auth::AuthError;
use satellite_core::DomainError;

use crate::store::StoreError;

/// Failure of an account operation.
#[derive(Debug, Error)]
pub enum AccountError {
    /// The gate rejected the caller. Transports must not reveal the inner kind.
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    /// Business rule on project creation; not an authentication failure.
    #[error("terms of use must be accepted")]
    TermsNotAccepted,

    /// Email/password exchange failed. Unknown email and wrong password are
    /// deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Authenticated, but the access policy does not allow touching this record.
    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for AccountError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => AccountError::NotFound,
            other => AccountError::Store(other),
        }
    }
}

impl AccountError {
    /// Eligible for a caller-level retry.
    pub fn is_transient(&self) -> bool {
        match self {
            AccountError::Unauthorized(e) => e.is_transient(),
            AccountError::Store(e) => e.is_transient(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_maps_to_not_found() {
        assert!(matches!(AccountError::from(StoreError::NotFound), AccountError::NotFound));
        assert!(matches!(
            AccountError::from(StoreError::Conflict("dup".into())),
            AccountError::Store(StoreError::Conflict(_))
        ));
    }

    #[test]
    fn transient_classification() {
        assert!(AccountError::from(StoreError::Unavailable("down".into())).is_transient());
        assert!(AccountError::from(AuthError::Store("down".into())).is_transient());
        assert!(!AccountError::from(AuthError::TokenExpired).is_transient());
        assert!(!AccountError::TermsNotAccepted.is_transient());
    }
}
