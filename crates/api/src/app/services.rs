//! Account service wiring for the HTTP layer.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;

use satellite_accounts::{AccountError, AccountService};
use satellite_auth::{HmacSigner, SignerError};
use satellite_infra::InMemoryAccountStore;

use crate::app::errors;
use crate::config::AppConfig;

pub type Accounts = AccountService<Arc<InMemoryAccountStore>>;

pub struct AppServices {
    pub accounts: Accounts,
}

pub fn build_services(config: &AppConfig) -> Result<AppServices, SignerError> {
    let signer = Arc::new(HmacSigner::new(config.signing_secret.as_bytes())?);
    let store = Arc::new(InMemoryAccountStore::new());

    let accounts = AccountService::new(signer, store)
        .with_token_ttl(config.token_ttl)
        .with_access_policy(config.access_policy);

    Ok(AppServices { accounts })
}

/// Run an account operation off the async runtime.
///
/// Password hashing makes some operations CPU-bound, so every call goes
/// through the blocking pool. Failures come back as ready-made responses.
pub async fn run<T, F>(services: Arc<AppServices>, op: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce(&Accounts) -> Result<T, AccountError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || op(&services.accounts)).await {
        Ok(result) => result.map_err(errors::account_error_to_response),
        Err(e) => {
            tracing::error!(error = %e, "account operation panicked");
            Err(errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error",
            ))
        }
    }
}
