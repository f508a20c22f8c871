use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};

use satellite_accounts::UserInfo;
use satellite_core::UserId;

use crate::app::dto;
use crate::app::routes::common::{parse_body, parse_id, parse_public_body};
use crate::app::services::{self, AppServices};
use crate::middleware::extract_api_key;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_user))
        .route("/:id", get(get_user).patch(update_user).delete(delete_user))
}

/// Registration is public.
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateUserRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match parse_public_body(body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    match services::run(services, move |accounts| accounts.create_user(body.user, body.company)).await {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(resp) => resp,
    }
}

/// Email/password exchange for a bearer token.
pub async fn issue_token(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::TokenRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match parse_public_body(body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    match services::run(services, move |accounts| accounts.token(&body.email, &body.password)).await {
        Ok(token) => (StatusCode::OK, Json(dto::TokenResponse { token })).into_response(),
        Err(resp) => resp,
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> axum::response::Response {
    let api_key = extract_api_key(&headers).map(str::to_owned);
    let id: UserId = match parse_id(&services, api_key.as_deref(), &id).await {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services::run(services, move |accounts| accounts.get_user(api_key.as_deref(), id)).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Json<UserInfo>, JsonRejection>,
) -> axum::response::Response {
    let api_key = extract_api_key(&headers).map(str::to_owned);
    let id: UserId = match parse_id(&services, api_key.as_deref(), &id).await {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = match parse_body(&services, api_key.as_deref(), body).await {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    match services::run(services, move |accounts| {
        accounts.update_user(api_key.as_deref(), id, body)
    })
    .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(resp) => resp,
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> axum::response::Response {
    let api_key = extract_api_key(&headers).map(str::to_owned);
    let id: UserId = match parse_id(&services, api_key.as_deref(), &id).await {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services::run(services, move |accounts| accounts.delete_user(api_key.as_deref(), id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(resp) => resp,
    }
}
