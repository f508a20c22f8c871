use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use satellite_core::UserId;

use crate::{AuthError, Claims, Clock, Signer, SystemClock, Token, authenticate, sign_claims};

/// Lifetime of tokens issued by the credential exchange unless configured
/// otherwise.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 15 * 60;

pub fn default_token_ttl() -> Duration {
    Duration::seconds(DEFAULT_TOKEN_TTL_SECS)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ResolveError(String);

impl ResolveError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Looks up the account record a token subject refers to.
///
/// `Ok(None)` means "no such user"; `Err` is reserved for lookup failures
/// (store unreachable, timeouts) that a caller may retry.
pub trait SubjectResolver: Send + Sync {
    type Principal;

    fn resolve(&self, subject: &UserId) -> Result<Option<Self::Principal>, ResolveError>;
}

impl<R> SubjectResolver for Arc<R>
where
    R: SubjectResolver + ?Sized,
{
    type Principal = R::Principal;

    fn resolve(&self, subject: &UserId) -> Result<Option<Self::Principal>, ResolveError> {
        (**self).resolve(subject)
    }
}

/// Result of a successful gate check. Built per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization<U> {
    pub user: U,
    pub claims: Claims,
}

/// Turns a raw bearer token into an [`Authorization`].
///
/// Stateless: every call re-verifies the signature and re-resolves the
/// subject, so key rotation and user deletion take effect immediately.
/// Issuance uses the same signer as verification.
pub struct AuthorizationGate<R> {
    signer: Arc<dyn Signer>,
    resolver: R,
    clock: Arc<dyn Clock>,
}

impl<R> AuthorizationGate<R>
where
    R: SubjectResolver,
{
    pub fn new(signer: Arc<dyn Signer>, resolver: R) -> Self {
        Self {
            signer,
            resolver,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Issue a token for `subject` valid for `ttl` from now.
    pub fn issue(&self, subject: UserId, ttl: Duration) -> Result<String, AuthError> {
        let claims = Claims::expiring_after(subject, self.clock.now(), ttl);
        self.issue_claims(&claims)
    }

    /// Sign arbitrary claims (e.g. never-expiring service credentials).
    pub fn issue_claims(&self, claims: &Claims) -> Result<String, AuthError> {
        let token = sign_claims(claims, self.signer.as_ref())?;
        tracing::debug!(subject = %claims.subject(), expires_at = ?claims.expiration(), "token issued");
        Ok(token.to_string())
    }

    /// Authorize an optional credential as handed over by a transport.
    pub fn authorize_credential(
        &self,
        api_key: Option<&str>,
    ) -> Result<Authorization<R::Principal>, AuthError> {
        match api_key.map(str::trim) {
            Some(key) if !key.is_empty() => self.authorize(key),
            _ => {
                tracing::debug!(error_code = AuthError::NoCredential.error_code(), "authorization failed");
                Err(AuthError::NoCredential)
            }
        }
    }

    /// Parse, authenticate, check expiration, resolve the subject.
    pub fn authorize(&self, token: &str) -> Result<Authorization<R::Principal>, AuthError> {
        let result = self.authorize_inner(token);
        if let Err(err) = &result {
            if err.is_transient() {
                tracing::warn!(error_code = err.error_code(), error = %err, "authorization unavailable");
            } else {
                tracing::debug!(error_code = err.error_code(), "authorization failed");
            }
        }
        result
    }

    fn authorize_inner(&self, token: &str) -> Result<Authorization<R::Principal>, AuthError> {
        let token = Token::parse(token)?;
        let claims = authenticate(&token, self.signer.as_ref())?;
        claims.check_expiration(self.clock.now())?;

        let user = self
            .resolver
            .resolve(&claims.subject())
            .map_err(|e| AuthError::Store(e.to_string()))?
            .ok_or(AuthError::UnknownSubject)?;

        Ok(Authorization { user, claims })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::RwLock;

    use super::*;
    use crate::{HmacSigner, ManualClock};

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct TestUser {
        id: UserId,
        name: &'static str,
    }

    #[derive(Default)]
    struct Directory {
        users: RwLock<HashMap<UserId, TestUser>>,
        offline: RwLock<bool>,
    }

    impl Directory {
        fn add(&self, name: &'static str) -> UserId {
            let id = UserId::new();
            self.users.write().unwrap().insert(id, TestUser { id, name });
            id
        }
    }

    impl SubjectResolver for Directory {
        type Principal = TestUser;

        fn resolve(&self, subject: &UserId) -> Result<Option<TestUser>, ResolveError> {
            if *self.offline.read().unwrap() {
                return Err(ResolveError::new("connection refused"));
            }
            Ok(self.users.read().unwrap().get(subject).cloned())
        }
    }

    fn fixture() -> (AuthorizationGate<Arc<Directory>>, Arc<Directory>, Arc<ManualClock>) {
        let directory = Arc::new(Directory::default());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let signer = Arc::new(HmacSigner::new("gate-test-secret").unwrap());
        let gate = AuthorizationGate::new(signer, directory.clone()).with_clock(clock.clone());
        (gate, directory, clock)
    }

    #[test]
    fn issued_token_resolves_user_until_expiry() {
        let (gate, directory, clock) = fixture();
        let alice = directory.add("alice");

        let token = gate.issue(alice, default_token_ttl()).unwrap();
        let auth = gate.authorize(&token).unwrap();
        assert_eq!(auth.user.name, "alice");
        assert_eq!(auth.claims.subject(), alice);

        clock.advance(Duration::minutes(15) + Duration::seconds(1));
        assert_eq!(gate.authorize(&token).unwrap_err(), AuthError::TokenExpired);
    }

    #[test]
    fn expiration_boundary() {
        let (gate, directory, clock) = fixture();
        let alice = directory.add("alice");
        let now = clock.now();

        let past = Claims::new(alice, Some(now - Duration::seconds(1)));
        let future = Claims::new(alice, Some(now + Duration::seconds(1)));

        let past = gate.issue_claims(&past).unwrap();
        let future = gate.issue_claims(&future).unwrap();

        assert_eq!(gate.authorize(&past).unwrap_err(), AuthError::TokenExpired);
        assert!(gate.authorize(&future).is_ok());
    }

    #[test]
    fn subsecond_ttl_token_lasts_its_whole_ttl() {
        let (gate, directory, clock) = fixture();
        let alice = directory.add("alice");

        let token = gate.issue(alice, Duration::milliseconds(300)).unwrap();
        assert!(gate.authorize(&token).is_ok());

        clock.advance(Duration::milliseconds(300));
        assert!(gate.authorize(&token).is_ok());

        clock.advance(Duration::seconds(1));
        assert_eq!(gate.authorize(&token).unwrap_err(), AuthError::TokenExpired);
    }

    #[test]
    fn never_expiring_token_survives_any_clock() {
        let (gate, directory, clock) = fixture();
        let alice = directory.add("alice");

        let token = gate.issue_claims(&Claims::never_expiring(alice)).unwrap();
        clock.advance(Duration::days(365 * 50));
        assert!(gate.authorize(&token).is_ok());
    }

    #[test]
    fn unknown_subject_is_rejected() {
        let (gate, _directory, _clock) = fixture();
        let token = gate.issue(UserId::new(), default_token_ttl()).unwrap();
        assert_eq!(gate.authorize(&token).unwrap_err(), AuthError::UnknownSubject);
    }

    #[test]
    fn deleted_user_loses_access_immediately() {
        let (gate, directory, _clock) = fixture();
        let alice = directory.add("alice");
        let token = gate.issue(alice, default_token_ttl()).unwrap();
        assert!(gate.authorize(&token).is_ok());

        directory.users.write().unwrap().remove(&alice);
        assert_eq!(gate.authorize(&token).unwrap_err(), AuthError::UnknownSubject);
    }

    #[test]
    fn store_failure_is_transient() {
        let (gate, directory, _clock) = fixture();
        let alice = directory.add("alice");
        let token = gate.issue(alice, default_token_ttl()).unwrap();

        *directory.offline.write().unwrap() = true;
        let err = gate.authorize(&token).unwrap_err();
        assert!(matches!(err, AuthError::Store(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn missing_or_blank_credential() {
        let (gate, _directory, _clock) = fixture();
        assert_eq!(gate.authorize_credential(None).unwrap_err(), AuthError::NoCredential);
        assert_eq!(gate.authorize_credential(Some("  ")).unwrap_err(), AuthError::NoCredential);
        assert_eq!(
            gate.authorize_credential(Some("garbage")).unwrap_err(),
            AuthError::MalformedToken
        );
    }

    #[test]
    fn token_from_another_key_is_rejected() {
        let (gate, directory, clock) = fixture();
        let alice = directory.add("alice");

        let foreign = AuthorizationGate::new(
            Arc::new(HmacSigner::new("someone-else").unwrap()),
            directory.clone(),
        )
        .with_clock(clock);
        let token = foreign.issue(alice, default_token_ttl()).unwrap();

        assert_eq!(gate.authorize(&token).unwrap_err(), AuthError::InvalidSignature);
    }

    #[test]
    fn gate_is_shareable_across_threads() {
        let (gate, directory, _clock) = fixture();
        let alice = directory.add("alice");
        let token = gate.issue(alice, default_token_ttl()).unwrap();
        let gate = Arc::new(gate);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = gate.clone();
                let token = token.clone();
                std::thread::spawn(move || gate.authorize(&token).map(|a| a.user.id))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), alice);
        }
    }
}
