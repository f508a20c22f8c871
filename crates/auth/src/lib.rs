//! `satellite-auth` — bearer-token authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: transports hand
//! in the raw token string, and the account store is reached through
//! [`SubjectResolver`].

pub mod authenticate;
pub mod authorize;
pub mod claims;
pub mod clock;
pub mod error;
pub mod signer;
pub mod token;

pub use authenticate::{authenticate, sign_claims};
pub use authorize::{
    Authorization, AuthorizationGate, DEFAULT_TOKEN_TTL_SECS, ResolveError, SubjectResolver,
    default_token_ttl,
};
pub use claims::Claims;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::AuthError;
pub use signer::{HmacSigner, Signer, SignerError};
pub use token::Token;
