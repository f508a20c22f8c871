use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};

use satellite_accounts::ProjectInfo;
use satellite_core::ProjectId;

use crate::app::dto;
use crate::app::routes::common::{parse_body, parse_id};
use crate::app::services::{self, AppServices};
use crate::middleware::extract_api_key;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route(
            "/:id",
            get(get_project).patch(update_project).delete(delete_project),
        )
}

pub async fn list_projects(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> axum::response::Response {
    let api_key = extract_api_key(&headers).map(str::to_owned);
    match services::run(services, move |accounts| accounts.list_projects(api_key.as_deref())).await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(resp) => resp,
    }
}

/// The owner is always the caller; an `owner_id` in the body is ignored.
pub async fn create_project(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    body: Result<Json<ProjectInfo>, JsonRejection>,
) -> axum::response::Response {
    let api_key = extract_api_key(&headers).map(str::to_owned);
    let body = match parse_body(&services, api_key.as_deref(), body).await {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    match services::run(services, move |accounts| {
        accounts.create_project(api_key.as_deref(), body)
    })
    .await
    {
        Ok(project) => (StatusCode::CREATED, Json(project)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn get_project(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> axum::response::Response {
    let api_key = extract_api_key(&headers).map(str::to_owned);
    let id: ProjectId = match parse_id(&services, api_key.as_deref(), &id).await {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services::run(services, move |accounts| accounts.get_project(api_key.as_deref(), id)).await {
        Ok(project) => (StatusCode::OK, Json(project)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn update_project(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateProjectRequest>, JsonRejection>,
) -> axum::response::Response {
    let api_key = extract_api_key(&headers).map(str::to_owned);
    let id: ProjectId = match parse_id(&services, api_key.as_deref(), &id).await {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = match parse_body(&services, api_key.as_deref(), body).await {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    match services::run(services, move |accounts| {
        accounts.update_project(api_key.as_deref(), id, body.description)
    })
    .await
    {
        Ok(project) => (StatusCode::OK, Json(project)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn delete_project(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> axum::response::Response {
    let api_key = extract_api_key(&headers).map(str::to_owned);
    let id: ProjectId = match parse_id(&services, api_key.as_deref(), &id).await {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services::run(services, move |accounts| {
        accounts.delete_project(api_key.as_deref(), id)
    })
    .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(resp) => resp,
    }
}
