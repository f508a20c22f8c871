use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use satellite_accounts::{AccountError, StoreError};

/// Every rejected credential gets this exact response, whatever the reason.
pub fn unauthorized() -> axum::response::Response {
    json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized")
}

fn unavailable() -> axum::response::Response {
    json_error(
        StatusCode::SERVICE_UNAVAILABLE,
        "unavailable",
        "service temporarily unavailable",
    )
}

pub fn account_error_to_response(err: AccountError) -> axum::response::Response {
    match err {
        AccountError::Unauthorized(e) if e.is_transient() => {
            tracing::warn!(error_code = e.error_code(), error = %e, "authorization unavailable");
            unavailable()
        }
        AccountError::Unauthorized(e) => {
            tracing::info!(error_code = e.error_code(), "request rejected");
            unauthorized()
        }
        AccountError::InvalidCredentials => {
            tracing::info!(error_code = "invalid_credentials", "request rejected");
            unauthorized()
        }
        AccountError::TermsNotAccepted => json_error(
            StatusCode::BAD_REQUEST,
            "terms_not_accepted",
            "terms of use must be accepted",
        ),
        AccountError::Domain(e) => json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
        AccountError::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
        AccountError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        AccountError::Store(StoreError::Conflict(msg)) => {
            json_error(StatusCode::CONFLICT, "conflict", msg)
        }
        AccountError::Store(StoreError::NotFound) => {
            json_error(StatusCode::NOT_FOUND, "not_found", "not found")
        }
        AccountError::Store(e @ StoreError::Unavailable(_)) => {
            tracing::warn!(error = %e, "store unavailable");
            unavailable()
        }
        AccountError::PasswordHash(msg) => {
            tracing::error!(error = %msg, "password hashing failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error",
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use satellite_auth::AuthError;
    use satellite_core::DomainError;

    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (AccountError::Unauthorized(AuthError::TokenExpired), StatusCode::UNAUTHORIZED),
            (AccountError::Unauthorized(AuthError::NoCredential), StatusCode::UNAUTHORIZED),
            (AccountError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (
                AccountError::Unauthorized(AuthError::Store("down".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AccountError::Store(StoreError::Unavailable("down".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (AccountError::TermsNotAccepted, StatusCode::BAD_REQUEST),
            (
                AccountError::Domain(DomainError::validation("bad email")),
                StatusCode::BAD_REQUEST,
            ),
            (AccountError::Forbidden, StatusCode::FORBIDDEN),
            (AccountError::NotFound, StatusCode::NOT_FOUND),
            (
                AccountError::Store(StoreError::Conflict("dup".into())),
                StatusCode::CONFLICT,
            ),
            (
                AccountError::PasswordHash("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(account_error_to_response(err).status(), status);
        }
    }
}
