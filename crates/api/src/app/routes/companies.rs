use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};

use satellite_accounts::CompanyInfo;
use satellite_core::UserId;

use crate::app::routes::common::{parse_body, parse_id};
use crate::app::services::{self, AppServices};
use crate::middleware::extract_api_key;

/// Companies are addressed by the id of the user that owns them.
pub fn router() -> Router {
    Router::new()
        .route("/", post(create_company))
        .route(
            "/:user_id",
            get(get_company).patch(update_company).delete(delete_company),
        )
}

pub async fn create_company(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    body: Result<Json<CompanyInfo>, JsonRejection>,
) -> axum::response::Response {
    let api_key = extract_api_key(&headers).map(str::to_owned);
    let body = match parse_body(&services, api_key.as_deref(), body).await {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    match services::run(services, move |accounts| {
        accounts.create_company(api_key.as_deref(), body)
    })
    .await
    {
        Ok(company) => (StatusCode::CREATED, Json(company)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn get_company(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> axum::response::Response {
    let api_key = extract_api_key(&headers).map(str::to_owned);
    let user_id: UserId = match parse_id(&services, api_key.as_deref(), &user_id).await {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services::run(services, move |accounts| {
        accounts.get_company(api_key.as_deref(), user_id)
    })
    .await
    {
        Ok(company) => (StatusCode::OK, Json(company)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn update_company(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    body: Result<Json<CompanyInfo>, JsonRejection>,
) -> axum::response::Response {
    let api_key = extract_api_key(&headers).map(str::to_owned);
    let user_id: UserId = match parse_id(&services, api_key.as_deref(), &user_id).await {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = match parse_body(&services, api_key.as_deref(), body).await {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    match services::run(services, move |accounts| {
        accounts.update_company(api_key.as_deref(), user_id, body)
    })
    .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(resp) => resp,
    }
}

pub async fn delete_company(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> axum::response::Response {
    let api_key = extract_api_key(&headers).map(str::to_owned);
    let user_id: UserId = match parse_id(&services, api_key.as_deref(), &user_id).await {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services::run(services, move |accounts| {
        accounts.delete_company(api_key.as_deref(), user_id)
    })
    .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(resp) => resp,
    }
}
