use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::Response;

use crate::app::errors;
use crate::app::services::{self, AppServices};

/// Parse a path id. An unparsable id is reported as 400 only to callers that
/// authorize; everyone else gets the usual 401.
pub async fn parse_id<I>(
    services: &Arc<AppServices>,
    api_key: Option<&str>,
    raw: &str,
) -> Result<I, Response>
where
    I: FromStr,
{
    if let Ok(id) = raw.parse::<I>() {
        return Ok(id);
    }

    authorize(services, api_key).await?;
    Err(errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid id"))
}

/// Unwrap a JSON body on a gated route. Same rule as [`parse_id`]: a body
/// that fails to extract is a 400 only for callers that authorize.
pub async fn parse_body<T>(
    services: &Arc<AppServices>,
    api_key: Option<&str>,
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, Response> {
    match body {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            authorize(services, api_key).await?;
            Err(invalid_body(&rejection))
        }
    }
}

/// Unwrap a JSON body on a public route.
pub fn parse_public_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|Json(body)| body)
        .map_err(|rejection| invalid_body(&rejection))
}

fn invalid_body(rejection: &JsonRejection) -> Response {
    tracing::debug!(status = %rejection.status(), "request body rejected");
    errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

async fn authorize(services: &Arc<AppServices>, api_key: Option<&str>) -> Result<(), Response> {
    let api_key = api_key.map(str::to_owned);
    services::run(services.clone(), move |accounts| {
        accounts.authorize(api_key.as_deref()).map(|_| ())
    })
    .await
}
