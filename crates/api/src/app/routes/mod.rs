use axum::{
    Router,
    routing::{get, post},
};

pub mod common;
pub mod companies;
pub mod projects;
pub mod system;
pub mod users;

/// Router for all account endpoints. Public and gated routes share one tree:
/// the account service authorizes each call itself.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/token", post(users::issue_token))
        .nest("/users", users::router())
        .nest("/company", companies::router())
        .nest("/projects", projects::router())
}
