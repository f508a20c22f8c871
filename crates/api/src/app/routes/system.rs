use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};

use crate::app::dto;
use crate::app::services::{self, AppServices};
use crate::middleware::extract_api_key;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> axum::response::Response {
    let api_key = extract_api_key(&headers).map(str::to_owned);
    match services::run(services, move |accounts| accounts.authorize(api_key.as_deref())).await {
        Ok(auth) => {
            let body = dto::WhoAmIResponse::new(&auth.user, auth.claims.expiration());
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(resp) => resp,
    }
}
